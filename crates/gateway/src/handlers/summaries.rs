//! Summary management handlers

use axum::{
    extract::{FromRequest, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::AppState;
use textsum_common::{
    errors::{AppError, Result},
    validate_article_url, CreatedSummary, SummaryRecord,
};

/// JSON body whose rejections (bad syntax, missing or mistyped fields) come
/// back as validation errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Request to create a new summary
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSummaryRequest {
    #[validate(custom(function = "validate_url_field"))]
    pub url: String,
}

/// Request to overwrite a summary
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSummaryRequest {
    #[validate(custom(function = "validate_url_field"))]
    pub url: String,

    /// Any text, including empty
    pub summary: String,
}

fn validate_url_field(url: &str) -> std::result::Result<(), ValidationError> {
    validate_article_url(url).map(|_| ()).map_err(|e| {
        let mut error = ValidationError::new("url");
        error.message = Some(e.to_string().into());
        error
    })
}

fn check<T: Validate>(request: &T) -> Result<()> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("url".to_string()),
    })
}

/// Create a summary stub and start enriching it in the background
pub async fn create_summary(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateSummaryRequest>,
) -> Result<(StatusCode, Json<CreatedSummary>)> {
    check(&request)?;

    let created = state.service.create(request.url).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// List every summary
pub async fn list_summaries(State(state): State<AppState>) -> Result<Json<Vec<SummaryRecord>>> {
    Ok(Json(state.service.read_all().await?))
}

/// Get a summary by id
pub async fn get_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SummaryRecord>> {
    Ok(Json(state.service.read(&id).await?))
}

/// Overwrite a summary's url and text
pub async fn update_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateSummaryRequest>,
) -> Result<Json<SummaryRecord>> {
    check(&request)?;

    let record = state
        .service
        .update(&id, request.url, request.summary)
        .await?;

    Ok(Json(record))
}

/// Delete a summary, returning it as it was before deletion
pub async fn delete_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SummaryRecord>> {
    Ok(Json(state.service.delete(&id).await?))
}
