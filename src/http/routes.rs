//! HTTP route definitions

use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::app::AppState;
use crate::config::Config;
use crate::game::{catalog, CharacterPreset, MatchSetup, RobotId};
use crate::rooms::normalize_room_id;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .route("/characters", get(characters_handler))
        .route("/characters/:id", get(character_handler))
        .route("/rooms/:id", get(room_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS from CLIENT_ORIGIN; `*` opens it to any origin
fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let allowed_origins: Vec<header::HeaderValue> = config
        .client_origins
        .iter()
        .filter_map(|s| s.parse::<header::HeaderValue>().ok())
        .collect();
    cors.allow_origin(allowed_origins)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    active_rooms: usize,
    connected_players: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        active_rooms: state.rooms.room_count(),
        connected_players: state.rooms.player_count(),
    })
}

// ============================================================================
// Character catalog
// ============================================================================

async fn characters_handler() -> Json<&'static [CharacterPreset]> {
    Json(catalog::all())
}

async fn character_handler(
    Path(id): Path<String>,
) -> Result<Json<&'static CharacterPreset>, AppError> {
    let id: RobotId = id
        .parse()
        .map_err(|e: catalog::UnknownRobot| AppError::NotFound(e.to_string()))?;
    Ok(Json(catalog::preset(id)))
}

// ============================================================================
// Room status
// ============================================================================

#[derive(Serialize)]
struct RoomResponse {
    room_id: String,
    players: usize,
    full: bool,
    setup: MatchSetup,
}

async fn room_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    let id = normalize_room_id(&id).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let room = state
        .rooms
        .room(id)
        .ok_or_else(|| AppError::NotFound(format!("Room {id}")))?;

    Ok(Json(RoomResponse {
        players: room.len(),
        full: room.is_full(),
        room_id: room.id,
        setup: room.setup,
    }))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(AppState::new(Config::default()))
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        request(app(), uri).await
    }

    async fn request(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["active_rooms"], 0);
    }

    #[tokio::test]
    async fn test_characters_in_catalog_order() {
        let (status, body) = get_json("/characters").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["atlas", "bolt", "nova", "titan"]);
    }

    #[tokio::test]
    async fn test_single_character() {
        let (status, body) = get_json("/characters/Nova").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["special"]["kind"], "uppercut");
        assert_eq!(body["special"]["cost"], 35);
    }

    #[tokio::test]
    async fn test_unknown_character_is_404() {
        let (status, body) = get_json("/characters/gundam").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("gundam"));
    }

    #[tokio::test]
    async fn test_room_status() {
        let state = AppState::new(Config::default());
        let conn = uuid::Uuid::new_v4();
        let _rx = state.rooms.register(conn);
        state.rooms.join_room(conn, "lobby", Some("titan")).unwrap();

        let (status, body) = request(build_router(state.clone()), "/rooms/lobby").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["players"], 1);
        assert_eq!(body["full"], false);
        assert_eq!(body["setup"]["p1"], "titan");

        // Padding is trimmed the same way joins trim it
        let (status, body) = request(build_router(state.clone()), "/rooms/%20lobby%20").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["room_id"], "lobby");

        let (status, _) = request(build_router(state.clone()), "/rooms/%20%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = request(build_router(state), "/rooms/elsewhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
