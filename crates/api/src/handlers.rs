use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use georisk_models::{
    ErrorBody, GeoDataResponse, GeoRiskError, HealthResponse, PredictRequest, PredictResponse,
};
use std::collections::HashMap;
use tracing::{error, info, instrument};

fn rejection(e: &GeoRiskError) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(e.to_error_body()),
    )
}

/// Coordinates arrive as query-string text; anything missing or
/// unparsable gets the same 400 the service has always returned.
#[instrument(skip(state))]
pub async fn get_geo_data(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<GeoDataResponse>, (StatusCode, Json<ErrorBody>)> {
    let lat = params.get("lat").and_then(|v| v.parse::<f64>().ok());
    let lon = params.get("lon").and_then(|v| v.parse::<f64>().ok());

    let (Some(lat), Some(lon)) = (lat, lon) else {
        return Err(rejection(&GeoRiskError::InvalidCoordinates));
    };

    Ok(Json(state.engine.geo_data(lon, lat)))
}

#[instrument(skip(state, payload))]
pub async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorBody>)> {
    match state.engine.predict(&payload) {
        Ok(prediction) => {
            info!(label = prediction.label, "prediction served");
            Ok(Json(PredictResponse {
                prediction: prediction.label.to_string(),
                confidence: prediction.confidence(),
            }))
        }
        Err(e) => {
            error!("prediction failed: {}", e);
            Err(rejection(&e))
        }
    }
}

#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.engine.health())
}
