//! Online path generalization over a forest of segment tries.

use crate::services::segment::SegmentNode;
use crate::utils::path::{join_segments, split_segments};
use std::collections::HashMap;

/// Deepest path the trie accepts; promotion folds subtrees recursively
pub const MAX_PATH_SEGMENTS: usize = 256;

/// Per-record analysis failures
///
/// None of these abort a batch; the offending record is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyzeError {
    #[error("path contains a NUL byte")]
    InvalidPath,

    #[error("path has {0} segments, more than {max}", max = MAX_PATH_SEGMENTS)]
    TooManySegments(usize),

    #[error("endpoint is empty")]
    EmptyEndpoint,

    #[error("invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("invalid host: {0}")]
    InvalidHost(#[from] url::ParseError),

    #[error("unexpected ':' in host {0}")]
    UnexpectedColon(String),

    #[error("invalid port: {0}")]
    InvalidPort(String),
}

/// Learns which path positions are dynamic, one trie per identifier
///
/// Every call to [`PathAnalyzer::analyze_path`] both classifies the path and
/// teaches the trie, so results depend on the whole history of the analyzer.
/// The analyzer is not synchronized; callers sharing one across threads must
/// hold a lock for the duration of a batch.
#[derive(Debug, Clone)]
pub struct PathAnalyzer {
    roots: HashMap<String, SegmentNode>,
    threshold: usize,
}

impl PathAnalyzer {
    /// Create an analyzer allowing `threshold` distinct literals per position
    pub fn new(threshold: usize) -> Self {
        Self {
            roots: HashMap::new(),
            threshold,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Generalize `path` within the trie of `identifier`
    ///
    /// Repeated separators collapse, a trailing separator is dropped and the
    /// result always starts with `/`. Segments already equal to the wildcard
    /// marker stay generalized.
    pub fn analyze_path(&mut self, path: &str, identifier: &str) -> Result<String, AnalyzeError> {
        if path.contains('\0') {
            return Err(AnalyzeError::InvalidPath);
        }
        let depth = split_segments(path).count();
        if depth > MAX_PATH_SEGMENTS {
            return Err(AnalyzeError::TooManySegments(depth));
        }

        let threshold = self.threshold;
        let mut node = self
            .roots
            .entry(identifier.to_string())
            .or_insert_with(|| SegmentNode::new(identifier));

        let mut generalized = Vec::new();
        for segment in split_segments(path) {
            node = node.route(segment, threshold);
            generalized.push(node.name().to_string());
        }

        Ok(join_segments(generalized))
    }

    /// Root node of an identifier, if anything was analyzed under it
    pub fn root(&self, identifier: &str) -> Option<&SegmentNode> {
        self.roots.get(identifier)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    pub fn identifier_count(&self) -> usize {
        self.roots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::segment::DYNAMIC_SEGMENT;

    #[test]
    fn test_static_path_is_returned_normalized() {
        let mut analyzer = PathAnalyzer::new(10);
        assert_eq!(analyzer.analyze_path("//etc//hosts/", "opens").unwrap(), "/etc/hosts");
        assert_eq!(analyzer.analyze_path("/", "opens").unwrap(), "/");
        assert_eq!(analyzer.analyze_path("", "opens").unwrap(), "/");
    }

    #[test]
    fn test_nul_byte_is_rejected() {
        let mut analyzer = PathAnalyzer::new(10);
        assert_eq!(
            analyzer.analyze_path("/tmp/a\0b", "opens"),
            Err(AnalyzeError::InvalidPath)
        );
    }

    #[test]
    fn test_path_depth_is_capped() {
        let mut analyzer = PathAnalyzer::new(10);
        let deepest = "/a".repeat(MAX_PATH_SEGMENTS);
        assert_eq!(analyzer.analyze_path(&deepest, "opens").unwrap(), deepest);

        let too_deep = "/a".repeat(1_000_000);
        assert_eq!(
            analyzer.analyze_path(&too_deep, "opens"),
            Err(AnalyzeError::TooManySegments(1_000_000))
        );
        // rejected paths leave no trace in the trie
        let root = analyzer.root("opens").unwrap();
        assert_eq!(root.child_count(), 1);
    }

    #[test]
    fn test_unusual_characters_are_accepted() {
        let mut analyzer = PathAnalyzer::new(10);
        let result = analyzer.analyze_path("/srv/data with spaces/ünïcode/%20", "opens");
        assert_eq!(result.unwrap(), "/srv/data with spaces/ünïcode/%20");
    }

    #[test]
    fn test_generalized_path_is_idempotent() {
        let mut analyzer = PathAnalyzer::new(10);
        let path = format!("/api/users/{DYNAMIC_SEGMENT}/orders");
        assert_eq!(analyzer.analyze_path(&path, "api.example.com").unwrap(), path);
        assert_eq!(analyzer.analyze_path(&path, "api.example.com").unwrap(), path);
    }

    #[test]
    fn test_roots_are_created_lazily() {
        let mut analyzer = PathAnalyzer::new(10);
        assert_eq!(analyzer.identifier_count(), 0);
        assert!(analyzer.root("opens").is_none());

        analyzer.analyze_path("/etc/hosts", "opens").unwrap();
        assert_eq!(analyzer.identifier_count(), 1);
        assert_eq!(analyzer.root("opens").unwrap().name(), "opens");
        assert_eq!(analyzer.identifiers().collect::<Vec<_>>(), vec!["opens"]);
    }

    #[test]
    fn test_threshold_boundary() {
        let mut analyzer = PathAnalyzer::new(3);
        for i in 0..3 {
            let path = format!("/api/users/{i}");
            assert_eq!(analyzer.analyze_path(&path, "svc").unwrap(), path);
        }
        // exactly at the threshold: still static
        assert_eq!(analyzer.analyze_path("/api/users/0", "svc").unwrap(), "/api/users/0");

        // one more distinct literal crosses it
        assert_eq!(analyzer.analyze_path("/api/users/3", "svc").unwrap(), "/api/users/3");
        let expected = format!("/api/users/{DYNAMIC_SEGMENT}");
        for i in 0..4 {
            assert_eq!(analyzer.analyze_path(&format!("/api/users/{i}"), "svc").unwrap(), expected);
        }
    }
}
