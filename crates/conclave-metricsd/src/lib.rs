use std::path::{Path, PathBuf};

use axum::{Json, Router, extract::State, routing::get};
use tower_http::cors::CorsLayer;

use conclave_types::MetricsSnapshot;

/// Build the read-only metrics router. Every request re-reads the snapshot
/// file, so the endpoint carries no state of its own and always reflects
/// the coordinator's latest write.
pub fn router(metrics_path: PathBuf) -> Router {
    Router::new()
        .route("/metrics", get(serve_metrics))
        .route_layer(CorsLayer::permissive())
        .with_state(metrics_path)
}

async fn serve_metrics(State(path): State<PathBuf>) -> Json<serde_json::Value> {
    Json(load_value(&path))
}

/// Read the snapshot file as raw JSON so hand-added keys pass through
/// untouched. A missing or unparseable file serves the empty baseline.
fn load_value(path: &Path) -> serde_json::Value {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return baseline(),
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!(
            "Metrics snapshot at {} unparseable, serving empty baseline: {e}",
            path.display()
        );
        baseline()
    })
}

fn baseline() -> serde_json::Value {
    serde_json::to_value(MetricsSnapshot::default()).unwrap_or_default()
}
