use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::{
    error::{Error, Result},
    service::{PredictionResult, PredictionService},
};

/// Multipart file field carrying the uploaded image. A plain form field with
/// the same name does not count.
pub const IMAGE_FIELD: &str = "image";

pub fn router(service: PredictionService, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .with_state(service)
        .route("/health", get(health_check))
}

#[tracing::instrument(skip_all)]
async fn predict_handler(
    State(service): State<PredictionService>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResult>> {
    let image = match multipart {
        Ok(multipart) => read_image_field(multipart).await?,
        Err(rejection) => {
            tracing::debug!(%rejection, "request is not multipart");
            None
        }
    };

    let result = tokio::task::spawn_blocking(move || service.handle(image))
        .await
        .map_err(|e| Error::inference(e.to_string()))??;

    Ok(Json(result))
}

async fn read_image_field(mut multipart: Multipart) -> Result<Option<Bytes>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Multipart(e.to_string()))?
    {
        if field.name() == Some(IMAGE_FIELD) && field.file_name().is_some() {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| Error::Multipart(e.to_string()))?;
            tracing::debug!(len = bytes.len(), "received image");
            return Ok(Some(bytes));
        }
    }
    Ok(None)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
