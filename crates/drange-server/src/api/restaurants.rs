use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use drange_engine::PreprocessReport;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_engine_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Raw query string; parsed by hand so malformed values get the JSON error
/// envelope instead of the extractor's plain-text rejection.
#[derive(Debug, Deserialize)]
pub(super) struct InRangeQuery {
    pub lat: Option<String>,
    pub long: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct InRangeData {
    restaurant_ids: Vec<String>,
}

fn parse_coordinate(
    request_id: &str,
    name: &str,
    raw: Option<&str>,
    limit: f64,
) -> Result<f64, ApiError> {
    let Some(raw) = raw else {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            format!("missing query parameter `{name}`"),
        ));
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() <= limit => Ok(value),
        _ => Err(ApiError::new(
            request_id,
            "validation_error",
            format!("`{name}` must be a number between -{limit} and {limit}"),
        )),
    }
}

pub(super) async fn in_range(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<InRangeQuery>,
) -> Result<Json<ApiResponse<InRangeData>>, ApiError> {
    let lat = parse_coordinate(&req_id.0, "lat", query.lat.as_deref(), 90.0)?;
    let long = parse_coordinate(&req_id.0, "long", query.long.as_deref(), 180.0)?;

    let restaurant_ids = state
        .service
        .calculate_delivery_range(lat, long, Utc::now())
        .await
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: InRangeData { restaurant_ids },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn preprocess(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<PreprocessReport>>, ApiError> {
    let report = state
        .service
        .preprocess_restaurants()
        .await
        .map_err(|e| map_engine_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_coordinate_accepts_bounds_and_trims() {
        let lat = parse_coordinate("r", "lat", Some(" 90 "), 90.0).unwrap();
        assert!((lat - 90.0).abs() < f64::EPSILON);
        let long = parse_coordinate("r", "long", Some("-180"), 180.0).unwrap();
        assert!((long + 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_coordinate_rejects_missing_and_out_of_range() {
        assert!(parse_coordinate("r", "lat", None, 90.0).is_err());
        assert!(parse_coordinate("r", "lat", Some(""), 90.0).is_err());
        assert!(parse_coordinate("r", "lat", Some("90.0001"), 90.0).is_err());
        assert!(parse_coordinate("r", "lat", Some("inf"), 90.0).is_err());
    }
}
