//! HTTP API for the presentation layer
//!
//! Thin layer over the search service: the map frontend calls these
//! endpoints and renders the returned markers, suggestions and heatmap
//! points. No decision logic lives here.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::warn;

use crate::error::VayuError;
use crate::models::{HeatPoint, ResultMarker, SearchOutcome};
use crate::service::{DEFAULT_SUGGESTION_LIMIT, SearchService};

/// One marker as serialized to the frontend
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiMarker {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
    pub area: Option<String>,
    pub pm25_avg: f64,
    pub pm10_avg: Option<f64>,
    pub pm25_min: Option<f64>,
    pub pm25_max: Option<f64>,
    pub aqi: u16,
    pub category: String,
    pub color: String,
    pub reading_count: usize,
    pub was_geocoded: bool,
}

impl From<&ResultMarker> for ApiMarker {
    fn from(marker: &ResultMarker) -> Self {
        Self {
            lat: marker.lat,
            lon: marker.lon,
            label: marker.label.clone(),
            area: marker.area.clone(),
            pm25_avg: marker.pm25_avg,
            pm10_avg: marker.pm10_avg,
            pm25_min: marker.pm25_min,
            pm25_max: marker.pm25_max,
            aqi: marker.aqi,
            category: marker.category.label().to_string(),
            color: marker.category.color().to_string(),
            reading_count: marker.reading_count,
            was_geocoded: marker.was_geocoded,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub markers: Vec<ApiMarker>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: String,
}

#[derive(Debug, Deserialize)]
struct SuggestParams {
    q: String,
    limit: Option<usize>,
}

fn status_for(error: &VayuError) -> StatusCode {
    match error {
        VayuError::NotFound { .. } => StatusCode::NOT_FOUND,
        VayuError::Network { .. } | VayuError::Parse { .. } => StatusCode::BAD_GATEWAY,
        VayuError::Superseded => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// API routes over the shared search service
pub fn router(service: Arc<SearchService>) -> Router {
    Router::new()
        .route("/api/search", get(search))
        .route("/api/suggest", get(suggest))
        .route("/api/heatmap", get(heatmap))
        .with_state(service)
}

/// Full application: API routes, CORS, and the static frontend
pub fn app(service: Arc<SearchService>, static_dir: &str) -> Router {
    router(service)
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
}

async fn search(
    State(service): State<Arc<SearchService>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    if params.q.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Search term cannot be empty".to_string(),
            }),
        ));
    }

    match service.search(&params.q).await {
        Ok(outcome) => {
            let markers = match &outcome {
                SearchOutcome::Single(marker) => vec![ApiMarker::from(marker)],
                SearchOutcome::Multi(markers) => markers.iter().map(ApiMarker::from).collect(),
                SearchOutcome::NoMatch => Vec::new(),
            };
            Ok(Json(SearchResponse { markers }))
        }
        Err(error) => {
            warn!("Search for '{}' failed: {error}", params.q);
            Err((
                status_for(&error),
                Json(ErrorResponse {
                    error: error.user_message(),
                }),
            ))
        }
    }
}

async fn suggest(
    State(service): State<Arc<SearchService>>,
    Query(params): Query<SuggestParams>,
) -> Json<Vec<String>> {
    let limit = params.limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT);
    let suggestions = service
        .suggest(&params.q, limit)
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(suggestions)
}

async fn heatmap(State(service): State<Arc<SearchService>>) -> Json<Vec<HeatPoint>> {
    Json(service.heat_points())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AggregationEngine;
    use crate::geocode::{GeocodeProvider, GeocodingGateway};
    use crate::index::StationIndex;
    use crate::models::{Coordinates, StationReading};
    use crate::predict::{FallbackPredictor, PredictionProvider};
    use crate::Result;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    struct EmptyGeocoder;

    #[async_trait]
    impl GeocodeProvider for EmptyGeocoder {
        async fn lookup(&self, _query: &str, _limit: u32) -> Result<Vec<Coordinates>> {
            Ok(Vec::new())
        }
    }

    struct NoPrediction;

    #[async_trait]
    impl PredictionProvider for NoPrediction {
        async fn predict_pm25(&self, _coordinates: Coordinates) -> Result<f64> {
            Ok(0.0)
        }
    }

    fn test_router() -> Router {
        let readings = vec![
            StationReading::new("Anand Vihar - Delhi", 28.65, 77.31, 80.0, Some(160.0)),
            StationReading::new("Rohini - Delhi", 28.72, 77.11, 40.0, Some(90.0)),
        ];
        let index = Arc::new(StationIndex::build(readings, 0));
        let gateway = Arc::new(GeocodingGateway::new(Arc::new(EmptyGeocoder)));
        let engine = AggregationEngine::new(index, gateway.clone());
        let predictor = FallbackPredictor::new(gateway, Arc::new(NoPrediction));
        router(Arc::new(SearchService::new(engine, predictor)))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_search_endpoint_returns_markers() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/search?q=delhi")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let markers = json["markers"].as_array().unwrap();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0]["area"], "Anand Vihar");
        assert_eq!(markers[0]["category"], "Moderate");
        assert_eq!(markers[0]["color"], "orange");
    }

    #[tokio::test]
    async fn test_search_endpoint_rejects_empty_term() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/search?q=%20")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_endpoint_maps_not_found() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/search?q=atlantis")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("atlantis"));
    }

    #[tokio::test]
    async fn test_suggest_endpoint_caps_results() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/suggest?q=delhi&limit=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_heatmap_endpoint() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/heatmap")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let points = json.as_array().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0]["intensity"], 80.0);
    }
}
