// 🛣️  Route Table - One endpoint per serialization strategy
// All eight routes return the same document; only the pipeline differs

use crate::encoding::{Encoder, RecordJson, SerdeJson, SonicJson};
use crate::error::ApiError;
use crate::fixtures::{FixtureSize, FixtureStore};
use crate::model::BusinessRecord;
use crate::schema;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::request::Parts,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// CONTEXT
// ============================================================================

/// Immutable state shared by every handler, built once at startup
#[derive(Debug)]
pub struct AppContext {
    pub store: FixtureStore,
}

impl AppContext {
    pub fn new(store: FixtureStore) -> Arc<Self> {
        Arc::new(AppContext { store })
    }

    fn raw(&self, size: FixtureSize) -> Result<&Arc<Value>, ApiError> {
        self.store.raw(size).ok_or_else(|| missing(size))
    }

    fn typed(&self, size: FixtureSize) -> Result<&Arc<BusinessRecord>, ApiError> {
        self.store.typed(size).ok_or_else(|| missing(size))
    }
}

fn missing(size: FixtureSize) -> ApiError {
    ApiError::Internal(format!("no fixture loaded for size '{}'", size))
}

// ============================================================================
// ROUTES
// ============================================================================

/// Where a route reads its data from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Raw,
    Typed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Route {
    RawNone,
    RawSchema,
    TypedSchema,
    RawSchemaExplicitJson,
    RawFastEncoder,
    RawSchemaFastEncoder,
    TypedSchemaFastEncoder,
    TypedCustomEncoder,
}

impl Route {
    pub const ALL: [Route; 8] = [
        Route::RawNone,
        Route::RawSchema,
        Route::TypedSchema,
        Route::RawSchemaExplicitJson,
        Route::RawFastEncoder,
        Route::RawSchemaFastEncoder,
        Route::TypedSchemaFastEncoder,
        Route::TypedCustomEncoder,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Route::RawNone => "raw-none",
            Route::RawSchema => "raw-schema",
            Route::TypedSchema => "typed-schema",
            Route::RawSchemaExplicitJson => "raw-schema-explicit-json",
            Route::RawFastEncoder => "raw-fast-encoder",
            Route::RawSchemaFastEncoder => "raw-schema-fast-encoder",
            Route::TypedSchemaFastEncoder => "typed-schema-fast-encoder",
            Route::TypedCustomEncoder => "typed-custom-encoder",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::RawNone => "/raw-none",
            Route::RawSchema => "/raw-schema",
            Route::TypedSchema => "/typed-schema",
            Route::RawSchemaExplicitJson => "/raw-schema-explicit-json",
            Route::RawFastEncoder => "/raw-fast-encoder",
            Route::RawSchemaFastEncoder => "/raw-schema-fast-encoder",
            Route::TypedSchemaFastEncoder => "/typed-schema-fast-encoder",
            Route::TypedCustomEncoder => "/typed-custom-encoder",
        }
    }

    pub fn source(&self) -> Source {
        match self {
            Route::TypedSchema | Route::TypedSchemaFastEncoder | Route::TypedCustomEncoder => {
                Source::Typed
            }
            _ => Source::Raw,
        }
    }

    /// Whether the raw document is validated per request
    pub fn validates_per_request(&self) -> bool {
        matches!(
            self,
            Route::RawSchema | Route::RawSchemaExplicitJson | Route::RawSchemaFastEncoder
        )
    }

    pub fn encoder(&self) -> Encoder {
        match self {
            Route::RawNone | Route::RawSchema | Route::TypedSchema => Encoder::Framework,
            Route::RawSchemaExplicitJson => Encoder::SerdeJson,
            Route::RawFastEncoder | Route::RawSchemaFastEncoder | Route::TypedSchemaFastEncoder => {
                Encoder::Sonic
            }
            Route::TypedCustomEncoder => Encoder::Record,
        }
    }

    pub fn from_name(name: &str) -> Option<Route> {
        let name = name.trim_start_matches('/');
        Route::ALL.into_iter().find(|r| r.name() == name)
    }

    /// Path plus the size query, as requested by the driver
    pub fn uri(&self, size: FixtureSize) -> String {
        format!("{}?size={}", self.path(), size)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// SIZE SELECTOR
// ============================================================================

#[derive(Deserialize)]
struct SizeQuery {
    size: String,
}

/// `?size=<tag>` restricted to the fixed set of fixture sizes
#[derive(Debug, Clone, Copy)]
pub struct SizeParam(pub FixtureSize);

#[async_trait]
impl<S> FromRequestParts<S> for SizeParam
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<SizeQuery>::try_from_uri(&parts.uri)
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let size = query
            .size
            .parse::<FixtureSize>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        Ok(SizeParam(size))
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

type Ctx = State<Arc<AppContext>>;

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    sizes: Vec<&'static str>,
}

/// GET /health - Health check
async fn health_check(State(ctx): Ctx) -> impl IntoResponse {
    let sizes = ctx.store.sizes().iter().map(FixtureSize::as_str).collect();
    Json(ApiResponse::ok(HealthStatus { status: "OK", sizes }))
}

/// GET /raw-none - raw value, framework encoder
async fn raw_none(
    State(ctx): Ctx,
    SizeParam(size): SizeParam,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(Arc::clone(ctx.raw(size)?)))
}

/// GET /raw-schema - raw value validated per request, framework encoder
async fn raw_schema(
    State(ctx): Ctx,
    SizeParam(size): SizeParam,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(schema::validate(ctx.raw(size)?)?))
}

/// GET /typed-schema - record validated at load, framework encoder
async fn typed_schema(
    State(ctx): Ctx,
    SizeParam(size): SizeParam,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(Arc::clone(ctx.typed(size)?)))
}

/// GET /raw-schema-explicit-json - raw value validated per request, explicit serde_json body
async fn raw_schema_explicit_json(
    State(ctx): Ctx,
    SizeParam(size): SizeParam,
) -> Result<impl IntoResponse, ApiError> {
    Ok(SerdeJson(schema::validate(ctx.raw(size)?)?))
}

/// GET /raw-fast-encoder - raw value, sonic-rs
async fn raw_fast_encoder(
    State(ctx): Ctx,
    SizeParam(size): SizeParam,
) -> Result<impl IntoResponse, ApiError> {
    Ok(SonicJson(Arc::clone(ctx.raw(size)?)))
}

/// GET /raw-schema-fast-encoder - raw value validated per request, sonic-rs
async fn raw_schema_fast_encoder(
    State(ctx): Ctx,
    SizeParam(size): SizeParam,
) -> Result<impl IntoResponse, ApiError> {
    Ok(SonicJson(schema::validate(ctx.raw(size)?)?))
}

/// GET /typed-schema-fast-encoder - record validated at load, sonic-rs
async fn typed_schema_fast_encoder(
    State(ctx): Ctx,
    SizeParam(size): SizeParam,
) -> Result<impl IntoResponse, ApiError> {
    Ok(SonicJson(Arc::clone(ctx.typed(size)?)))
}

/// GET /typed-custom-encoder - record validated at load, its own encoder
async fn typed_custom_encoder(
    State(ctx): Ctx,
    SizeParam(size): SizeParam,
) -> Result<impl IntoResponse, ApiError> {
    Ok(RecordJson(Arc::clone(ctx.typed(size)?)))
}

/// Build the route table over a loaded context
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(Route::RawNone.path(), get(raw_none))
        .route(Route::RawSchema.path(), get(raw_schema))
        .route(Route::TypedSchema.path(), get(typed_schema))
        .route(Route::RawSchemaExplicitJson.path(), get(raw_schema_explicit_json))
        .route(Route::RawFastEncoder.path(), get(raw_fast_encoder))
        .route(Route::RawSchemaFastEncoder.path(), get(raw_schema_fast_encoder))
        .route(Route::TypedSchemaFastEncoder.path(), get(typed_schema_fast_encoder))
        .route(Route::TypedCustomEncoder.path(), get(typed_custom_encoder))
        .with_state(ctx)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    fn full_router() -> Router {
        let docs = FixtureSize::ALL
            .into_iter()
            .map(|size| (size, generator::generate(size, 11).unwrap()));
        router(AppContext::new(FixtureStore::from_documents(docs).unwrap()))
    }

    fn router_for(size: FixtureSize, doc: Value) -> Router {
        router(AppContext::new(FixtureStore::from_documents([(size, doc)]).unwrap()))
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_route_table_is_consistent() {
        assert_eq!(Route::ALL.len(), 8);
        for route in Route::ALL {
            assert_eq!(route.path(), format!("/{}", route.name()));
            assert_eq!(Route::from_name(route.path()), Some(route));
            if route.validates_per_request() {
                assert_eq!(route.source(), Source::Raw);
            }
        }
        assert_eq!(Route::from_name("raw-everything"), None);
        assert_eq!(
            Route::TypedCustomEncoder.uri(FixtureSize::Tiny),
            "/typed-custom-encoder?size=tiny"
        );
    }

    #[tokio::test]
    async fn test_all_routes_agree_for_tiny() {
        let app = full_router();
        let (status, expected) = get(&app, &Route::RawNone.uri(FixtureSize::Tiny)).await;
        assert_eq!(status, StatusCode::OK);

        for route in Route::ALL {
            let (status, body) = get(&app, &route.uri(FixtureSize::Tiny)).await;
            assert_eq!(status, StatusCode::OK, "route {}", route);
            assert_eq!(body, expected, "route {}", route);
        }
    }

    /// Every route must serve exactly the raw document of every loaded size
    async fn assert_routes_serve_raw(store: FixtureStore) {
        let expected: Vec<(FixtureSize, Value)> = store
            .sizes()
            .into_iter()
            .filter_map(|size| store.raw(size).map(|raw| (size, (**raw).clone())))
            .collect();
        let app = router(AppContext::new(store));

        for (size, raw) in &expected {
            for route in Route::ALL {
                let (status, body) = get(&app, &route.uri(*size)).await;
                assert_eq!(status, StatusCode::OK, "route {} size {}", route, size);
                assert!(body == *raw, "route {} size {} differs from raw", route, size);
            }
        }
    }

    #[tokio::test]
    async fn test_all_routes_agree_for_every_size() {
        let docs = FixtureSize::ALL
            .into_iter()
            .map(|size| (size, generator::generate(size, 11).unwrap()));
        assert_routes_serve_raw(FixtureStore::from_documents(docs).unwrap()).await;
    }

    #[tokio::test]
    async fn test_all_routes_agree_on_committed_fixtures() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let store = FixtureStore::load(dir).unwrap();
        assert_eq!(store.sizes(), FixtureSize::ALL.to_vec());
        assert_routes_serve_raw(store).await;
    }

    #[tokio::test]
    async fn test_all_routes_agree_when_optional_keys_are_omitted() {
        let doc = json!({
            "_id": "b",
            "business_name": null,
            "bookings": [{
                "booking_id": "1", "date": "d", "start_time": "s",
                "readable_booking": "r", "status": "ok"
            }],
            "customers": [{"customer_id": "c", "mobile": "m", "name": "n", "email": null}]
        });
        let store = FixtureStore::from_documents([(FixtureSize::Tiny, doc)]).unwrap();
        assert_routes_serve_raw(store).await;
    }

    #[tokio::test]
    async fn test_legacy_size_tag_is_accepted() {
        let app = full_router();
        let (status, _) = get(&app, "/raw-none?size=1kb").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_size_is_a_client_error() {
        let app = full_router();
        for route in Route::ALL {
            let (status, body) = get(&app, &format!("{}?size=huge", route.path())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "route {}", route);
            assert!(body["detail"].as_str().unwrap().contains("huge"));
        }
    }

    #[tokio::test]
    async fn test_missing_size_is_a_client_error() {
        let app = full_router();
        for route in Route::ALL {
            let (status, _) = get(&app, route.path()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "route {}", route);
        }
    }

    #[tokio::test]
    async fn test_unloaded_size_is_an_internal_error() {
        let app = router_for(FixtureSize::Tiny, json!({"_id": "only-tiny"}));
        for route in Route::ALL {
            let (status, body) = get(&app, &route.uri(FixtureSize::Large)).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "route {}", route);
            assert!(body["detail"].as_str().unwrap().contains("large"));
        }
    }

    #[tokio::test]
    async fn test_schema_routes_drop_unknown_fields() {
        // The store refuses such keys at load, so add them to the raw side afterwards
        let mut store = FixtureStore::from_documents([(FixtureSize::Tiny, json!({"_id": "b"}))])
            .unwrap();
        store.replace_raw(FixtureSize::Tiny, json!({"_id": "b", "legacy_flag": true}));
        let app = router(AppContext::new(store));

        let (_, raw) = get(&app, &Route::RawNone.uri(FixtureSize::Tiny)).await;
        assert_eq!(raw["legacy_flag"], true);

        let (_, validated) = get(&app, &Route::RawSchema.uri(FixtureSize::Tiny)).await;
        assert_eq!(validated, json!({"_id": "b"}));
    }

    #[tokio::test]
    async fn test_non_conforming_raw_fails_validating_routes_only() {
        // The store validates at load, so corrupt the raw side afterwards
        let record = json!({"_id": "b"});
        let mut store = FixtureStore::from_documents([(FixtureSize::Tiny, record)]).unwrap();
        store.replace_raw(FixtureSize::Tiny, json!({"_id": 5, "bookings": [{}]}));
        let app = router(AppContext::new(store));

        for route in Route::ALL {
            let (status, body) = get(&app, &route.uri(FixtureSize::Tiny)).await;
            if route.validates_per_request() {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "route {}", route);
                let locs: Vec<&str> = body["detail"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|e| e["loc"].as_str().unwrap())
                    .collect();
                assert!(locs.contains(&"_id"));
                assert!(locs.contains(&"bookings.0.booking_id"));
            } else {
                assert_eq!(status, StatusCode::OK, "route {}", route);
            }
        }
    }

    #[tokio::test]
    async fn test_health_lists_loaded_sizes() {
        let app = full_router();
        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["sizes"], json!(["tiny", "small", "medium", "large"]));
    }
}
