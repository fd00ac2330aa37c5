//! HTTP routes over the store connection cache.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use lib_store::connections::DatabaseHealth;
use lib_store::{ConfigSource, StoreDriver, StoreError};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error};

use super::state::AppState;

/// # Application Error
///
/// Wraps store failures so handlers can return them with `?`.
#[derive(Debug)]
pub enum AppError {
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Store(e) = self;
        let (status, error_type, message) = match &e {
            StoreError::ConfigurationError(_) => {
                error!("Store configuration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ConfigurationError",
                    "The store address or database name is not configured.",
                )
            }
            StoreError::ConnectionError(_) => {
                error!("Store connection error: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "ConnectionError",
                    "Failed to connect to the store. It might be unavailable.",
                )
            }
            StoreError::QueryError(_) => {
                error!("Store health check failed: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "QueryError",
                    "The store did not answer the health check.",
                )
            }
        };
        let body = json!({
            "error_type": error_type,
            "message": message,
            "detail": e.to_string()
        });
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Store(e) => write!(f, "Store error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Store(e) => Some(e),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoreStatus {
    pub database: String,
    pub connected: bool,
}

#[derive(Debug, Serialize)]
pub struct StoreState {
    pub connected: bool,
}

pub fn router<D, S>(state: AppState<D, S>) -> Router
where
    D: StoreDriver,
    D::Database: DatabaseHealth,
    S: ConfigSource,
{
    Router::new()
        .route("/health", get(health))
        .route("/api/store", get(store_status::<D, S>))
        .route("/api/store/state", get(store_state::<D, S>))
        .with_state(state)
}

pub async fn health() -> &'static str {
    "Backend is running"
}

/// Connects on first use, then pings the cached database handle.
pub async fn store_status<D, S>(
    State(state): State<AppState<D, S>>,
) -> Result<Json<StoreStatus>, AppError>
where
    D: StoreDriver,
    D::Database: DatabaseHealth,
    S: ConfigSource,
{
    let handles = state.cache.acquire().await?;
    let database = handles.database();
    database.ping().await?;
    debug!("Store ping succeeded for {}", database.database_name());

    Ok(Json(StoreStatus {
        database: database.database_name().to_string(),
        connected: true,
    }))
}

/// Reports whether the cache is populated. Never connects.
pub async fn store_state<D, S>(State(state): State<AppState<D, S>>) -> Json<StoreState>
where
    D: StoreDriver,
    S: ConfigSource,
{
    Json(StoreState {
        connected: state.cache.is_connected(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use lib_store::connections::memory::MemoryDriver;
    use lib_store::{ConnectionCache, StoreConfig};
    use std::sync::Arc;
    use tower::ServiceExt;

    const ADDRESS: &str = "store://localhost:1234";

    fn state(config: StoreConfig) -> AppState<MemoryDriver, StoreConfig> {
        AppState::new(Arc::new(ConnectionCache::new(MemoryDriver::new(), config)))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_does_not_touch_the_store() {
        let state = state(StoreConfig::new(ADDRESS, "budget"));
        let response = router(state.clone())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.cache.driver().connect_attempts(), 0);
    }

    #[tokio::test]
    async fn store_status_connects_once() {
        let state = state(StoreConfig::new(ADDRESS, "budget"));

        let (status, body) = get_json(router(state.clone()), "/api/store").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "budget");
        assert_eq!(body["connected"], true);

        let (status, _) = get_json(router(state.clone()), "/api/store").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.cache.driver().connect_count(), 1);
    }

    #[tokio::test]
    async fn missing_address_maps_to_500() {
        let state = state(StoreConfig::new("", "budget"));
        let (status, body) = get_json(router(state.clone()), "/api/store").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error_type"], "ConfigurationError");
        assert_eq!(state.cache.driver().connect_attempts(), 0);
    }

    #[tokio::test]
    async fn unreachable_store_maps_to_503_and_recovers() {
        let state = state(StoreConfig::new(ADDRESS, "budget"));
        state.cache.driver().mark_unreachable(ADDRESS);

        let (status, body) = get_json(router(state.clone()), "/api/store").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error_type"], "ConnectionError");

        state.cache.driver().mark_reachable(ADDRESS);
        let (status, _) = get_json(router(state.clone()), "/api/store").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn state_endpoint_reflects_the_slot() {
        let state = state(StoreConfig::new(ADDRESS, "budget"));

        let (_, body) = get_json(router(state.clone()), "/api/store/state").await;
        assert_eq!(body["connected"], false);

        state.cache.acquire().await.unwrap();
        let (_, body) = get_json(router(state.clone()), "/api/store/state").await;
        assert_eq!(body["connected"], true);
    }

    #[test]
    fn query_error_maps_to_502() {
        let response = AppError::from(StoreError::QueryError("timeout".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
