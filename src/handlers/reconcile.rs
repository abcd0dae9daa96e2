//! Reconciliation endpoint handlers.

use crate::{
    models::{
        EndpointReconcileResponse, EndpointRecord, OpenReconcileRequest, OpenReconcileResponse,
        SkippedRecord,
    },
    services::{
        AnalyzerState, AppMetrics, BatchOutcome, KIND_ENDPOINTS, KIND_OPENS, ReconcileError,
    },
};
use actix_web::{Error, HttpRequest, Result, web};
use chrono::Utc;
use paperclip::actix::api_v2_operation;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

fn analyzer_state(req: &HttpRequest) -> Result<&web::Data<AnalyzerState>, Error> {
    req.app_data::<web::Data<AnalyzerState>>().ok_or_else(|| {
        error!("Analyzer state not registered with the application");
        actix_web::error::ErrorServiceUnavailable("Analyzer not available")
    })
}

fn reconcile_failed(batch_id: &Uuid, e: ReconcileError) -> Error {
    error!(batch_id = %batch_id, error = %e, "Reconciliation failed");
    actix_web::error::ErrorInternalServerError("Reconciliation failed")
}

fn log_skipped(batch_id: &Uuid, kind: &str, skipped: &[SkippedRecord]) {
    for record in skipped {
        warn!(
            batch_id = %batch_id,
            kind = kind,
            value = %record.value,
            reason = %record.reason,
            "Skipped unparseable record"
        );
    }
}

fn record_metrics(req: &HttpRequest, kind: &str, outcome: BatchOutcome) {
    if let Some(metrics) = req.app_data::<web::Data<AppMetrics>>() {
        metrics.record_batch(kind, outcome);
        metrics.update_uptime();
    }
}

/// Endpoint reconciliation
///
/// Generalizes a batch of observed HTTP endpoints against the long-lived
/// endpoint analyzer and merges the methods and headers of endpoints that
/// collapse onto the same generalized form.
#[api_v2_operation(
    summary = "Reconcile HTTP Endpoints",
    description = "Generalizes dynamic path segments of observed endpoints and merges records sharing a generalized endpoint.",
    tags("Reconcile"),
    responses(
        (status = 200, description = "Batch reconciled", body = EndpointReconcileResponse),
        (status = 500, description = "Analyzer state unusable")
    )
)]
pub async fn reconcile_endpoints(
    req: HttpRequest,
    body: web::Json<Vec<EndpointRecord>>,
) -> Result<web::Json<EndpointReconcileResponse>, Error> {
    let state = analyzer_state(&req)?;
    let batch_id = Uuid::new_v4();
    let records = body.into_inner();
    let start_time = Instant::now();

    let (analysis, identifiers) = state
        .reconcile_endpoints(&records)
        .map_err(|e| reconcile_failed(&batch_id, e))?;

    log_skipped(&batch_id, KIND_ENDPOINTS, &analysis.skipped);
    info!(
        batch_id = %batch_id,
        received = records.len(),
        emitted = analysis.endpoints.len(),
        skipped = analysis.skipped.len(),
        "Endpoint batch reconciled"
    );

    record_metrics(
        &req,
        KIND_ENDPOINTS,
        BatchOutcome {
            received: records.len(),
            emitted: analysis.endpoints.len(),
            skipped: analysis.skipped.len(),
            identifiers,
            duration: start_time.elapsed(),
        },
    );

    Ok(web::Json(EndpointReconcileResponse {
        batch_id: batch_id.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        endpoints: analysis.endpoints,
        skipped: analysis.skipped,
    }))
}

/// Open-call reconciliation
///
/// Generalizes a batch of opened paths against the long-lived open-call
/// analyzer. Paths in the exclusion set are returned verbatim.
#[api_v2_operation(
    summary = "Reconcile Open Calls",
    description = "Generalizes dynamic segments of opened paths, unions the flags of collapsed paths and keeps excluded paths verbatim.",
    tags("Reconcile"),
    responses(
        (status = 200, description = "Batch reconciled", body = OpenReconcileResponse),
        (status = 500, description = "Analyzer state unusable")
    )
)]
pub async fn reconcile_opens(
    req: HttpRequest,
    body: web::Json<OpenReconcileRequest>,
) -> Result<web::Json<OpenReconcileResponse>, Error> {
    let state = analyzer_state(&req)?;
    let batch_id = Uuid::new_v4();
    let request = body.into_inner();
    let start_time = Instant::now();

    let (analysis, identifiers) = state
        .reconcile_opens(&request.opens, &request.exclusions)
        .map_err(|e| reconcile_failed(&batch_id, e))?;

    log_skipped(&batch_id, KIND_OPENS, &analysis.skipped);
    info!(
        batch_id = %batch_id,
        received = request.opens.len(),
        emitted = analysis.opens.len(),
        skipped = analysis.skipped.len(),
        exclusions = request.exclusions.len(),
        "Open-call batch reconciled"
    );

    record_metrics(
        &req,
        KIND_OPENS,
        BatchOutcome {
            received: request.opens.len(),
            emitted: analysis.opens.len(),
            skipped: analysis.skipped.len(),
            identifiers,
            duration: start_time.elapsed(),
        },
    );

    Ok(web::Json(OpenReconcileResponse {
        batch_id: batch_id.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        opens: analysis.opens,
        skipped: analysis.skipped,
    }))
}
