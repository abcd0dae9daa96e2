//! API request and response models.

use crate::models::records::{EndpointRecord, OpenRecord, SkippedRecord};
use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Response model for the health check endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response model for the version information endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct VersionResponse {
    pub version: String,
    pub commit: String,
    pub build_time: String,
    /// Threshold of the endpoint analyzer
    pub endpoint_threshold: usize,
    /// Threshold of the open-call analyzer
    pub open_threshold: usize,
}

/// Response model for an endpoint reconciliation batch
#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct EndpointReconcileResponse {
    /// Identifier of this batch, also present in the server logs
    pub batch_id: String,
    /// When the batch was processed (RFC 3339)
    pub generated_at: String,
    /// Generalized, deduplicated endpoints
    pub endpoints: Vec<EndpointRecord>,
    /// Endpoints dropped because they could not be parsed
    pub skipped: Vec<SkippedRecord>,
}

/// Request body for an open-call reconciliation batch
#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct OpenReconcileRequest {
    pub opens: Vec<OpenRecord>,
    /// Extra paths never to generalize, on top of the configured set
    #[serde(default)]
    pub exclusions: Vec<String>,
}

/// Response model for an open-call reconciliation batch
#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct OpenReconcileResponse {
    pub batch_id: String,
    pub generated_at: String,
    /// Generalized open calls sorted by path
    pub opens: Vec<OpenRecord>,
    pub skipped: Vec<SkippedRecord>,
}
