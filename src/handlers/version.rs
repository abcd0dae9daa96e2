//! Version information endpoint handler.

use crate::{config::AnalyzerConfig, models::VersionResponse};
use actix_web::{Error, HttpRequest, Result, web};
use paperclip::actix::api_v2_operation;

/// Version information endpoint
///
/// Returns the build metadata and the thresholds the analyzers run with.
#[api_v2_operation(
    summary = "Version Information Endpoint",
    description = "Returns the service version, commit hash, build time and analyzer thresholds.",
    tags("Version"),
    responses(
        (status = 200, description = "Successful response", body = VersionResponse)
    )
)]
pub async fn version(req: HttpRequest) -> Result<web::Json<VersionResponse>, Error> {
    let config = req
        .app_data::<web::Data<AnalyzerConfig>>()
        .map(|c| c.get_ref().clone())
        .unwrap_or_default();

    Ok(web::Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: option_env!("VERGEN_GIT_SHA").unwrap_or("unknown").to_string(),
        build_time: option_env!("VERGEN_BUILD_TIMESTAMP")
            .unwrap_or("unknown")
            .to_string(),
        endpoint_threshold: config.endpoint_threshold,
        open_threshold: config.open_threshold,
    }))
}
