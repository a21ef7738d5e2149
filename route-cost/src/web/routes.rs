//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{info, warn};

use crate::cost::CostError;
use crate::domain::{GeoPoint, ValidationError};
use crate::pricing::PriceSourceError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/cost", post(price_route))
        .route("/api/trip", post(price_trip))
        .route("/api/classify", get(classify_point))
        .route("/api/cache/invalidate", post(invalidate_cache))
        .route("/api/prices/reload", post(reload_prices))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Price an explicit route.
async fn price_route(
    State(state): State<AppState>,
    Json(req): Json<CostRequest>,
) -> Result<Json<CostResponse>, AppError> {
    let (route, vehicle) = req.to_domain()?;

    let breakdown = state
        .engine
        .price_route_within(&route, &vehicle, state.request_deadline)
        .await?;

    Ok(Json(CostResponse::from_breakdown(&breakdown)))
}

/// Route a trip through the provider, then price it.
async fn price_trip(
    State(state): State<AppState>,
    Json(req): Json<TripCostRequest>,
) -> Result<Json<TripCostResponse>, AppError> {
    let (trip, vehicle) = req.to_domain()?;
    let deadline = state.request_deadline;

    let priced = tokio::time::timeout(
        deadline,
        state.engine.price_trip(state.routes.as_ref(), &trip, &vehicle),
    )
    .await
    .map_err(|_| CostError::DeadlineElapsed(deadline))??;

    Ok(Json(TripCostResponse::from_trip(&priced)))
}

/// Classify a single point.
async fn classify_point(
    State(state): State<AppState>,
    Query(req): Query<ClassifyQuery>,
) -> Result<Json<ClassifyResponse>, AppError> {
    let point = GeoPoint::new(req.lat, req.lng)?;
    let country = state.engine.classifier().classify(&point);

    Ok(Json(ClassifyResponse {
        lat: point.latitude(),
        lng: point.longitude(),
        country: country.map(|c| c.as_str().to_string()),
    }))
}

/// Drop every cached route, detection and price.
async fn invalidate_cache(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let cache = state.engine.cache();
    cache.sync().await;
    let invalidated_entries = cache.entry_count();
    cache.invalidate_all();

    info!(entries = invalidated_entries, "cache invalidated");
    Json(InvalidateResponse {
        invalidated_entries,
    })
}

/// Reload the price store from its file and drop cached results.
async fn reload_prices(State(state): State<AppState>) -> Result<Json<ReloadResponse>, AppError> {
    let Some(path) = state.price_data.as_deref() else {
        return Err(AppError::NotFound {
            message: "no price data file configured".to_string(),
        });
    };

    let source = state.engine.source();
    source.reload(path).await?;
    state.engine.cache().invalidate_all();

    let (fuel_prices, toll_segments) = source.counts().await;
    info!(path = %path.display(), fuel_prices, toll_segments, "price data reloaded");
    Ok(Json(ReloadResponse {
        fuel_prices,
        toll_segments,
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    UpstreamUnavailable { message: String },
    DeadlineElapsed { message: String },
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            AppError::DeadlineElapsed { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest { .. } => "invalid_input",
            AppError::NotFound { .. } => "not_found",
            AppError::UpstreamUnavailable { .. } => "upstream_unavailable",
            AppError::DeadlineElapsed { .. } => "deadline_elapsed",
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<CostError> for AppError {
    fn from(e: CostError) -> Self {
        match e {
            CostError::InvalidInput(inner) => inner.into(),
            CostError::RouteProvider(_) => AppError::UpstreamUnavailable {
                message: e.to_string(),
            },
            CostError::DeadlineElapsed(_) => AppError::DeadlineElapsed {
                message: e.to_string(),
            },
        }
    }
}

impl From<PriceSourceError> for AppError {
    fn from(e: PriceSourceError) -> Self {
        AppError::UpstreamUnavailable {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let kind = self.kind();
        let message = match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::UpstreamUnavailable { message }
            | AppError::DeadlineElapsed { message } => message,
        };

        warn!(status = %status, kind, error = %message, "request failed");

        let body = Json(ErrorResponse {
            kind,
            error: message,
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::cache::{CacheConfig, ResultCache};
    use crate::cost::{CostEngine, EngineConfig};
    use crate::pricing::{InMemoryPriceSource, PricingTables};
    use crate::route_provider::{RouteProviderError, StraightLineProvider};

    fn app_state() -> AppState {
        let engine = CostEngine::new(
            InMemoryPriceSource::new(),
            PricingTables::european(),
            Arc::new(ResultCache::new(&CacheConfig::default())),
            EngineConfig::default(),
        );
        AppState::new(engine, StraightLineProvider::default())
    }

    fn vehicle(kind: &str) -> VehicleInput {
        VehicleInput {
            vehicle_type: kind.into(),
            fuel_type: None,
            consumption: None,
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn prices_lithuanian_route() {
        let req = CostRequest {
            route: vec![
                PointInput {
                    lat: 54.6872,
                    lng: 25.2797,
                },
                PointInput {
                    lat: 54.8978,
                    lng: 23.9094,
                },
            ],
            vehicle: vehicle("car"),
        };

        let Json(response) = price_route(State(app_state()), Json(req)).await.unwrap();

        assert_eq!(response.currency, "EUR");
        assert_eq!(response.per_country.len(), 1);
        assert_eq!(response.per_country[0].country, "LT");
        assert!(response.is_estimated);
        assert!(response.fuel_cost > 0.0);
        assert_eq!(
            response.total_cost,
            ((response.fuel_cost + response.toll_cost) * 100.0).round() / 100.0
        );
    }

    #[tokio::test]
    async fn invalid_route_is_bad_request() {
        let req = CostRequest {
            route: vec![PointInput {
                lat: 54.6872,
                lng: 25.2797,
            }],
            vehicle: vehicle("car"),
        };

        let err = price_route(State(app_state()), Json(req)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["kind"], "invalid_input");
        assert_eq!(body["error"], "route must have at least 2 points, found 1");
    }

    #[tokio::test]
    async fn unknown_vehicle_is_bad_request() {
        let req = CostRequest {
            route: vec![
                PointInput { lat: 48.0, lng: 2.0 },
                PointInput { lat: 47.0, lng: 3.0 },
            ],
            vehicle: vehicle("tractor"),
        };

        let err = price_route(State(app_state()), Json(req)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn prices_trip_through_provider() {
        let req = TripCostRequest {
            origin: PointInput {
                lat: 48.8566,
                lng: 2.3522,
            },
            destination: PointInput {
                lat: 45.7640,
                lng: 4.8357,
            },
            waypoints: Vec::new(),
            vehicle: vehicle("van"),
        };

        let Json(response) = price_trip(State(app_state()), Json(req)).await.unwrap();

        assert!(response.distance_km > 350.0 && response.distance_km < 450.0);
        assert!(response.duration_mins > 0.0);
        assert_eq!(response.cost.per_country[0].country, "FR");
        assert!(response.cost.toll_cost > 0.0);
    }

    #[tokio::test]
    async fn classifies_points() {
        let state = app_state();

        let Json(vilnius) = classify_point(
            State(state.clone()),
            Query(ClassifyQuery {
                lat: 54.6872,
                lng: 25.2797,
            }),
        )
        .await
        .unwrap();
        assert_eq!(vilnius.country.as_deref(), Some("LT"));

        let Json(atlantic) = classify_point(
            State(state.clone()),
            Query(ClassifyQuery {
                lat: 40.0,
                lng: -40.0,
            }),
        )
        .await
        .unwrap();
        assert_eq!(atlantic.country, None);

        let err = classify_point(
            State(state),
            Query(ClassifyQuery {
                lat: 100.0,
                lng: 0.0,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn invalidation_empties_cache() {
        let state = app_state();
        let req = CostRequest {
            route: vec![
                PointInput {
                    lat: 54.6872,
                    lng: 25.2797,
                },
                PointInput {
                    lat: 54.8978,
                    lng: 23.9094,
                },
            ],
            vehicle: vehicle("car"),
        };
        let Json(priced) = price_route(State(state.clone()), Json(req)).await.unwrap();
        assert_eq!(priced.per_country[0].country, "LT");

        let Json(response) = invalidate_cache(State(state.clone())).await;
        assert!(response.invalidated_entries >= 1);

        state.engine.cache().sync().await;
        assert_eq!(state.engine.cache().entry_count(), 0);
    }

    #[tokio::test]
    async fn reload_requires_configured_file() {
        let err = reload_prices(State(app_state())).await.unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["kind"], "not_found");
    }

    #[tokio::test]
    async fn reload_picks_up_new_prices() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"fuelPrices": []}"#).unwrap();
        let state = app_state().with_price_data(file.path());

        let lithuania = || CostRequest {
            route: vec![
                PointInput {
                    lat: 54.6872,
                    lng: 25.2797,
                },
                PointInput {
                    lat: 54.8978,
                    lng: 23.9094,
                },
            ],
            vehicle: vehicle("car"),
        };
        let Json(before) = price_route(State(state.clone()), Json(lithuania()))
            .await
            .unwrap();
        assert_eq!(before.per_country[0].fuel.source, crate::domain::QuoteSource::Estimated);

        std::fs::write(
            file.path(),
            r#"{"fuelPrices": [{"country": "LT", "fuelType": "petrol_95", "price": 1.5}]}"#,
        )
        .unwrap();
        let Json(reloaded) = reload_prices(State(state.clone())).await.unwrap();
        assert_eq!(reloaded.fuel_prices, 1);
        assert_eq!(reloaded.toll_segments, 0);

        // Cached estimate was dropped, so the stored price is used
        let Json(after) = price_route(State(state), Json(lithuania())).await.unwrap();
        assert_eq!(after.per_country[0].fuel.source, crate::domain::QuoteSource::Database);
        assert_eq!(after.per_country[0].fuel.price_per_unit, 1.5);
    }

    #[tokio::test]
    async fn unreadable_price_file_is_upstream_failure() {
        let state = app_state().with_price_data("/nonexistent/prices.json");
        let err = reload_prices(State(state)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn cost_errors_map_to_statuses() {
        let upstream = AppError::from(CostError::from(RouteProviderError::NoRoute));
        let response = upstream.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["kind"], "upstream_unavailable");

        let deadline = AppError::from(CostError::DeadlineElapsed(Duration::from_secs(1)));
        let response = deadline.into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body_json(response).await["kind"], "deadline_elapsed");

        let invalid = AppError::from(CostError::from(ValidationError::TooFewPoints { found: 0 }));
        assert!(matches!(invalid, AppError::BadRequest { .. }));
    }
}
