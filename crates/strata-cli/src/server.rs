use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use strata_core::{CancelToken, StrataError};
use strata_encode::{export_filename, PngExporter};
use strata_model::{
    compute_guides, snap_position, validate_design, Design, DesignDraft, LayerRef,
    DEFAULT_SNAP_TOLERANCE,
};
use strata_render::{FsAssetSource, RenderPipeline};

#[derive(Clone)]
struct AppState {
    designs_dir: PathBuf,
    source: Arc<FsAssetSource>,
    /// Shared across requests so the decoded-image cache is too.
    pipeline: Arc<RenderPipeline>,
}

pub async fn run_export_server(designs: PathBuf, assets: PathBuf, port: u16) -> Result<()> {
    let state = AppState {
        designs_dir: designs,
        source: Arc::new(FsAssetSource::new(assets.clone())),
        pipeline: Arc::new(RenderPipeline::new()),
    };

    let app = Router::new()
        .route("/api/designs/{id}", get(get_design))
        .route("/api/designs/{id}/export", get(export_design))
        .route("/api/designs/{id}/snap", post(snap_layer))
        .nest_service("/assets", tower_http::services::ServeDir::new(assets))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("📡 Export server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Load a design by id from the designs directory, going through the
/// same validation boundary the CLI uses. Every request reads a fresh
/// snapshot; a render in flight is never affected by a later edit.
fn load_design(state: &AppState, id: &str) -> Result<Design, StrataError> {
    let path = state.designs_dir.join(format!("{}.json", id));
    let raw = std::fs::read_to_string(&path)
        .map_err(|_| StrataError::DesignNotFound(id.to_string()))?;
    let draft: DesignDraft = serde_json::from_str(&raw)?;
    validate_design(&draft).map_err(|errors| {
        let joined: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        StrataError::Validation(joined.join("; "))
    })
}

fn error_response(e: StrataError) -> Response {
    let status = match &e {
        StrataError::DesignNotFound(_) => StatusCode::NOT_FOUND,
        StrataError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
}

async fn get_design(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match load_design(&state, &id) {
        Ok(design) => (StatusCode::OK, Json(design)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Render and encode run on the blocking pool; the async worker is only
/// tied up for the file read and the response write.
async fn export_design(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let design = match load_design(&state, &id) {
        Ok(design) => design,
        Err(e) => return error_response(e),
    };
    let filename = export_filename(&design.id);

    let pipeline = state.pipeline.clone();
    let source = state.source.clone();
    let result = tokio::task::spawn_blocking(move || {
        let canvas = pipeline.render(&design, source.as_ref(), &CancelToken::new())?;
        PngExporter::encode(&canvas)
    })
    .await;

    match result {
        Ok(Ok(bytes)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "image/png".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(Err(e)) => {
            tracing::error!(design = %id, "export failed: {}", e);
            error_response(e)
        }
        Err(e) => {
            tracing::error!(design = %id, "export task panicked: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "export task failed" })),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapRequest {
    layer_id: String,
    /// Candidate top-left position being dragged to.
    x: f64,
    y: f64,
    tolerance: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapResponse {
    x: f64,
    y: f64,
    vertical: Vec<f64>,
    horizontal: Vec<f64>,
}

async fn snap_layer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SnapRequest>,
) -> Response {
    let design = match load_design(&state, &id) {
        Ok(design) => design,
        Err(e) => return error_response(e),
    };

    let layer_id = LayerRef::from_raw(req.layer_id);
    let Some(layer) = design.get_layer(&layer_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("layer not found: {}", layer_id) })),
        )
            .into_response();
    };

    let guides = compute_guides(
        design.width as f64,
        design.height as f64,
        &design.layers,
        Some(&layer_id),
    );
    let tolerance = req.tolerance.unwrap_or(DEFAULT_SNAP_TOLERANCE);
    let snapped = snap_position(layer, req.x, req.y, &guides, tolerance);

    (
        StatusCode::OK,
        Json(SnapResponse {
            x: snapped.x,
            y: snapped.y,
            vertical: guides.vertical,
            horizontal: guides.horizontal,
        }),
    )
        .into_response()
}
