use serde::Serialize;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Image uploaded successfully";

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub filename: String,
}

impl UploadResponse {
    pub fn new(filename: String) -> Self {
        Self {
            message: UPLOAD_SUCCESS_MESSAGE,
            filename,
        }
    }
}
