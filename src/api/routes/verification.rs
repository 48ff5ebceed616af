//! Waste photo verification and location autocomplete.

use crate::{
    api::SharedState,
    core::verification::WasteAnalysis,
    errors::{Error, Result},
    services::{ImageInput, Place},
};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

/// Body of `POST /verify`
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// Base64 image, optionally as a full data URL
    pub image: String,
    /// MIME type when `image` is bare base64
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Query of `GET /locations`
#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    /// Partial address typed by the user
    #[serde(default)]
    pub q: String,
}

/// Classifies a waste photo.
pub async fn verify(
    State(state): State<SharedState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<WasteAnalysis>> {
    let verifier = state.verifier.as_ref().ok_or(Error::MissingApiKey)?;
    let image = ImageInput::from_base64(&request.image, request.mime_type.as_deref())?;
    Ok(Json(verifier.verify(&image).await?))
}

/// Address suggestions.
pub async fn search_locations(
    State(state): State<SharedState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<Vec<Place>>> {
    Ok(Json(state.geocoder.search(&query.q).await?))
}
