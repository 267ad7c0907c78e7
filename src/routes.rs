use crate::{config::Config, handlers};
use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit, http::HeaderValue, routing::post, Extension, Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub const UPLOAD_IMAGE_PATH: &str = "/image/upload-image/";

pub fn router(config: &Config) -> anyhow::Result<Router> {
    let images = Router::new()
        .route(UPLOAD_IMAGE_PATH, post(handlers::upload_image))
        .layer(DefaultBodyLimit::disable());

    let app = match normalize_prefix(&config.api_prefix) {
        Some(prefix) => Router::new().nest(&prefix, images),
        None => images,
    };

    Ok(app
        .layer(Extension(config.upload_dir()))
        .layer(cors_layer(config)?)
        .layer(TraceLayer::new_for_http()))
}

/// `""` and `"/"` mean no prefix, otherwise the prefix gets exactly one
/// leading slash and no trailing one.
fn normalize_prefix(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{trimmed}"))
    }
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let origins = config.all_cors_origins();

    // A wildcard can't be combined with credentials, so echo the request origin instead.
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::mirror_request()
    } else {
        let values = origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .with_context(|| format!("Invalid CORS origin {origin:?}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}
