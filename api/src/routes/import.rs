//! CSV import endpoints

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::post,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

use super::auth::AuthUser;
use crate::AppState;
use crate::constants::{IMPORT_BATCH_SIZE, MAX_IMPORT_BODY_SIZE};
use crate::domain::videos;
use crate::import::{
    self, ColumnMapping, ImportError, ImportField, ImportReport, coerce_date_string,
};
use crate::services::error::LogErr;

const PREVIEW_ROWS: usize = 5;

pub fn routes() -> Router<Arc<AppState>> {
    // Rate limit: imports are heavy, allow a burst of 5 then 1 every 2 seconds per IP
    let rate_limit_config = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(5)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("Failed to build rate limit config");

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config.into(),
    };

    Router::new()
        .route("/videos/import/preview", post(preview_import))
        .route("/videos/import", post(run_import))
        .layer(rate_limit_layer)
        .layer(DefaultBodyLimit::max(MAX_IMPORT_BODY_SIZE))
}

#[derive(Debug, Deserialize)]
struct PreviewRequest {
    csv: String,
}

#[derive(Debug, Serialize)]
struct PreviewResponse {
    headers: Vec<String>,
    row_count: usize,
    sample_rows: Vec<Vec<String>>,
    suggested_mapping: ColumnMapping,
    fields: Vec<ImportField>,
    /// What an unparseable date cell will be stored as
    default_date: String,
}

fn parse_table(csv: &str) -> Result<import::CsvTable, StatusCode> {
    import::parse_csv(csv).log_status("CSV parse error", StatusCode::UNPROCESSABLE_ENTITY)
}

/// POST /videos/import/preview - Headers, sample rows and a suggested mapping
async fn preview_import(
    AuthUser(_user_id): AuthUser,
    Json(body): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, StatusCode> {
    let table = parse_table(&body.csv)?;
    let today = Utc::now().date_naive();

    Ok(Json(PreviewResponse {
        suggested_mapping: import::suggest_mapping(&table.headers),
        row_count: table.rows.len(),
        sample_rows: table.rows.iter().take(PREVIEW_ROWS).cloned().collect(),
        headers: table.headers,
        fields: ImportField::ALL.to_vec(),
        default_date: coerce_date_string("", today),
    }))
}

#[derive(Debug, Deserialize)]
struct ImportRequest {
    csv: String,
    mapping: ColumnMapping,
}

/// POST /videos/import - Map, coerce and insert every row
/// Rows are inserted in batches; a failing row is reported, never fatal
async fn run_import(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ImportRequest>,
) -> Result<Json<ImportReport>, StatusCode> {
    let table = parse_table(&body.csv)?;
    let today = Utc::now().date_naive();

    let mapped = import::map_rows(&table, &body.mapping, today).map_err(|e| {
        tracing::warn!(%user_id, error = %e, "CSV mapping rejected");
        match e {
            ImportError::EmptyMapping | ImportError::UnknownHeader(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ImportError::Csv(_) | ImportError::MissingHeaders => StatusCode::BAD_REQUEST,
        }
    })?;

    let db = state.db.clone();
    let mut report = import::insert_in_batches(mapped.rows, IMPORT_BATCH_SIZE, |video| {
        let db = db.clone();
        async move { videos::insert(&db, user_id, &video).await.map(|_| ()) }
    })
    .await;
    report.skipped = mapped.skipped;

    tracing::info!(
        %user_id,
        inserted = report.inserted,
        failed = report.failed,
        skipped = report.skipped,
        "CSV import finished"
    );
    Ok(Json(report))
}
