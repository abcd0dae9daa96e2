//! Health check endpoint handler.

use crate::{models::HealthResponse, services::AnalyzerState};
use actix_web::{Error, HttpRequest, Result, web};
use paperclip::actix::api_v2_operation;

/// Health check endpoint
///
/// Reports `healthy` once the analyzer state is registered with the app.
#[api_v2_operation(
    summary = "Health Check Endpoint",
    description = "Returns the current health status of the service in JSON format.",
    tags("Health"),
    responses(
        (status = 200, description = "Successful response", body = HealthResponse),
        (status = 503, description = "Analyzer state missing")
    )
)]
pub async fn health(req: HttpRequest) -> Result<web::Json<HealthResponse>, Error> {
    if req.app_data::<web::Data<AnalyzerState>>().is_none() {
        return Err(actix_web::error::ErrorServiceUnavailable(
            "Analyzer not available",
        ));
    }

    Ok(web::Json(HealthResponse {
        status: "healthy".to_string(),
    }))
}
