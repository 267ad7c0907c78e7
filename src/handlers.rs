use crate::{error::Error, response::UploadResponse};
use axum::{
    extract::{multipart::MultipartRejection, Multipart},
    Extension, Json,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

pub const FILE_FIELD: &str = "file";
const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";

/// Creates the upload directory and any missing parents. Returns whether
/// anything was created.
pub async fn ensure_upload_dir(upload_dir: &Path) -> std::io::Result<bool> {
    if upload_dir.is_dir() {
        return Ok(false);
    }

    tokio::fs::create_dir_all(upload_dir).await?;
    Ok(true)
}

/// Stores the `file` field of a multipart form under the upload directory.
///
/// The client-supplied filename is joined onto the upload directory as is, and
/// an existing file with the same name is overwritten.
pub async fn upload_image(
    Extension(upload_dir): Extension<PathBuf>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, Error> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            trace!("Skipping form field {:?}", field.name());
            continue;
        }

        let file_name = field
            .file_name()
            .ok_or(Error::MissingField(FILE_FIELD))?
            .to_owned();

        let is_image = field
            .content_type()
            .is_some_and(|content_type| content_type.starts_with(IMAGE_CONTENT_TYPE_PREFIX));
        if !is_image {
            debug!(
                "Rejecting {file_name}, content type {:?}",
                field.content_type()
            );
            return Err(Error::NotAnImage);
        }

        let data = field.bytes().await?;
        let path = upload_dir.join(&file_name);
        tokio::fs::write(&path, &data).await?;

        debug!("Stored {} bytes at {}", data.len(), path.display());

        return Ok(Json(UploadResponse::new(file_name)));
    }

    Err(Error::MissingField(FILE_FIELD))
}
