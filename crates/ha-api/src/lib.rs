//! Advanced Relations HTTP API
//!
//! Exposes relation queries over HTTP using axum. Every request reads a fresh
//! [`Snapshot`] from the configuration directory on a blocking thread, so
//! edits to the YAML files are visible without a restart.
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/api/advancedrelations/related?type=&id=&depth=&direction=` | `{"relations": node}` |
//! | GET | `/api/advancedrelations/data` | entities, automations and scripts |
//! | POST | `/api/advancedrelations/trigger` | `{"status": "triggered"}` |
//! | GET | `/api/health` | `ok` |

mod error;
pub mod loader;
pub mod panel;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use ha_config::RelationsConfig;
use ha_core::ItemKind;
use ha_relations::{find_relations_with, Direction, GraphNode, Snapshot, TraversalOptions};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub use error::{ApiError, ErrorResponse};
pub use loader::{LoadError, LoadResult, SnapshotLoader};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<SnapshotLoader>,
    pub config: Arc<RelationsConfig>,
}

impl AppState {
    pub fn new(config_dir: impl Into<PathBuf>, config: RelationsConfig) -> Self {
        Self {
            loader: Arc::new(SnapshotLoader::new(config_dir)),
            config: Arc::new(config),
        }
    }
}

/// Query parameters of the related endpoint
///
/// All fields are optional at this level so missing and malformed values can
/// be reported with specific messages.
#[derive(Debug, Default, Deserialize)]
pub struct RelatedQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub id: Option<String>,
    pub depth: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RelatedResponse {
    pub relations: GraphNode,
}

#[derive(Debug, Serialize)]
pub struct EntitySummary {
    pub entity_id: String,
    pub friendly_name: String,
    /// Integration providing the entity, when registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RuleSummary {
    pub id: String,
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Everything a client can pick as a query root
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub entities: Vec<EntitySummary>,
    pub automations: Vec<RuleSummary>,
    pub scripts: Vec<RuleSummary>,
}

impl DataResponse {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            entities: snapshot
                .entities()
                .map(|entity| EntitySummary {
                    entity_id: entity.entity_id.clone(),
                    friendly_name: entity.display_name().to_string(),
                    platform: entity.platform.clone(),
                })
                .collect(),
            automations: snapshot
                .automations()
                .map(|automation| RuleSummary {
                    id: automation.id.clone(),
                    alias: automation.display_name().to_string(),
                    description: automation.description.clone(),
                })
                .collect(),
            scripts: snapshot
                .scripts()
                .map(|script| RuleSummary {
                    id: script.id.clone(),
                    alias: script.display_name().to_string(),
                    description: script.description.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TriggerResponse {
    status: &'static str,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/api/advancedrelations/related", get(get_related))
        .route("/api/advancedrelations/data", get(get_data))
        .route("/api/advancedrelations/trigger", post(trigger_refresh))
        .route("/api/health", get(health_check));

    if let Some(panel_dir) = &state.config.panel_dir {
        router = router.nest_service(panel::PANEL_PATH, panel::panel_service(panel_dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server
pub async fn start_server(state: AppState, addr: &str) -> std::io::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Advanced Relations API listening on {}", addr);
    axum::serve(listener, router).await
}

/// Load a snapshot on a blocking thread and run `f` over it
async fn with_snapshot<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Snapshot) -> T + Send + 'static,
    T: Send + 'static,
{
    let loader = state.loader.clone();
    let result = tokio::task::spawn_blocking(move || loader.load().map(|snapshot| f(&snapshot))).await??;
    Ok(result)
}

/// Validate the related query into a root and traversal options
fn parse_related_query(
    query: RelatedQuery,
    default_depth: u32,
) -> Result<(ItemKind, String, TraversalOptions), ApiError> {
    let (Some(kind), Some(id)) = (
        query.kind.filter(|kind| !kind.is_empty()),
        query.id.filter(|id| !id.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("Missing type or id".to_string()));
    };

    let kind: ItemKind = kind
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid type parameter: {kind}")))?;

    let depth = match query.depth {
        Some(depth) => depth
            .trim()
            .parse::<i64>()
            .map_err(|_| ApiError::BadRequest("Invalid depth parameter".to_string()))?,
        None => i64::from(default_depth),
    };

    let direction = match query.direction {
        Some(direction) => direction.parse::<Direction>()?,
        None => Direction::default(),
    };

    Ok((kind, id, TraversalOptions::new(depth)?.with_direction(direction)))
}

// ==================== Handlers ====================

/// GET /api/advancedrelations/related - Relation tree for one item
async fn get_related(
    State(state): State<AppState>,
    Query(query): Query<RelatedQuery>,
) -> Result<Json<RelatedResponse>, ApiError> {
    let (kind, id, options) = parse_related_query(query, state.config.default_depth)?;
    debug!(%kind, %id, depth = options.max_depth(), "Related query");

    let relations =
        with_snapshot(&state, move |snapshot| find_relations_with(snapshot, kind, &id, &options)).await?;
    Ok(Json(RelatedResponse { relations }))
}

/// GET /api/advancedrelations/data - All selectable items
async fn get_data(State(state): State<AppState>) -> Result<Json<DataResponse>, ApiError> {
    let data = with_snapshot(&state, DataResponse::from_snapshot).await?;
    Ok(Json(data))
}

/// POST /api/advancedrelations/trigger - Re-read the configuration
async fn trigger_refresh(State(state): State<AppState>) -> Result<Json<TriggerResponse>, ApiError> {
    let (automations, scripts, entities) = with_snapshot(&state, |snapshot| {
        (
            snapshot.automation_count(),
            snapshot.script_count(),
            snapshot.entity_count(),
        )
    })
    .await?;
    info!(automations, scripts, entities, "Refresh triggered");
    Ok(Json(TriggerResponse { status: "triggered" }))
}

/// GET /api/health - Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
