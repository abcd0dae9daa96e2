//! Process-wide analyzer state shared by the HTTP workers.

use crate::config::AnalyzerConfig;
use crate::models::{EndpointRecord, OpenRecord};
use crate::services::endpoints::{EndpointAnalysis, analyze_endpoints};
use crate::services::opens::{OpenAnalysis, analyze_opens};
use crate::services::path_analyzer::PathAnalyzer;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

/// Errors raised around the analyzers, never by them
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("{0} analyzer lock poisoned by a panicked batch")]
    Poisoned(&'static str),
}

/// Long-lived analyzers, one per record kind
///
/// Each analyzer sits behind its own lock which is held for a whole batch,
/// so endpoint and open-call batches can run in parallel while batches of
/// the same kind are serialized.
pub struct AnalyzerState {
    endpoints: Mutex<PathAnalyzer>,
    opens: Mutex<PathAnalyzer>,
    excluded_opens: BTreeSet<String>,
}

impl AnalyzerState {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            endpoints: Mutex::new(PathAnalyzer::new(config.endpoint_threshold)),
            opens: Mutex::new(PathAnalyzer::new(config.open_threshold)),
            excluded_opens: config.excluded_opens.clone(),
        }
    }

    /// Reconcile one batch of endpoints
    ///
    /// Returns the analysis together with the number of identifiers the
    /// endpoint analyzer tracks afterwards.
    pub fn reconcile_endpoints(
        &self,
        records: &[EndpointRecord],
    ) -> Result<(EndpointAnalysis, usize), ReconcileError> {
        let mut analyzer = lock(&self.endpoints, "endpoint")?;
        let analysis = analyze_endpoints(records, &mut analyzer);
        Ok((analysis, analyzer.identifier_count()))
    }

    /// Reconcile one batch of open calls
    ///
    /// `extra_exclusions` are honored for this batch only, on top of the
    /// configured exclusion set.
    pub fn reconcile_opens(
        &self,
        records: &[OpenRecord],
        extra_exclusions: &[String],
    ) -> Result<(OpenAnalysis, usize), ReconcileError> {
        let exclusions = if extra_exclusions.is_empty() {
            self.excluded_opens.clone()
        } else {
            self.excluded_opens
                .iter()
                .chain(extra_exclusions)
                .cloned()
                .collect()
        };

        let mut analyzer = lock(&self.opens, "open-call")?;
        let analysis = analyze_opens(records, &mut analyzer, &exclusions);
        Ok((analysis, analyzer.identifier_count()))
    }

    pub fn excluded_opens(&self) -> &BTreeSet<String> {
        &self.excluded_opens
    }
}

impl Default for AnalyzerState {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}

fn lock<'a>(
    analyzer: &'a Mutex<PathAnalyzer>,
    kind: &'static str,
) -> Result<MutexGuard<'a, PathAnalyzer>, ReconcileError> {
    analyzer.lock().map_err(|_| ReconcileError::Poisoned(kind))
}
