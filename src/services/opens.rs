//! Open-call reconciliation: generalize filesystem paths passed to `open()`
//! and merge the flags of paths that collapse onto the same bucket.

use crate::models::{OpenRecord, SkippedRecord};
use crate::services::path_analyzer::{AnalyzeError, PathAnalyzer};
use crate::utils::merge::{merge_sorted, merge_strings};
use std::collections::{BTreeMap, BTreeSet};

/// Trie identifier shared by every open call
pub const OPENS_IDENTIFIER: &str = "opens";

/// Result of one open-call reconciliation batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenAnalysis {
    /// Generalized open calls sorted by path
    pub opens: Vec<OpenRecord>,
    /// Paths that could not be analyzed
    pub skipped: Vec<SkippedRecord>,
}

/// Generalize one opened path
pub fn analyze_open(path: &str, analyzer: &mut PathAnalyzer) -> Result<String, AnalyzeError> {
    analyzer.analyze_path(path, OPENS_IDENTIFIER)
}

/// Generalize a batch of open calls
///
/// Paths in `exclusions` are reported verbatim and are kept out of the trie
/// entirely, so they never push a position over the threshold. All other
/// paths train the trie first and are then merged into the bucket of their
/// generalized form, with flags unioned and sorted.
pub fn analyze_opens(
    records: &[OpenRecord],
    analyzer: &mut PathAnalyzer,
    exclusions: &BTreeSet<String>,
) -> OpenAnalysis {
    let is_excluded = |record: &OpenRecord| exclusions.contains(&record.path);

    for record in records {
        if !is_excluded(record) {
            // training pass, failures are reported by the rewrite pass
            let _ = analyze_open(&record.path, analyzer);
        }
    }

    let mut buckets: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut verbatim: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut skipped = Vec::new();

    for record in records {
        if is_excluded(record) {
            merge_strings(verbatim.entry(record.path.clone()).or_default(), &record.flags);
            continue;
        }

        match analyze_open(&record.path, analyzer) {
            Ok(path) => {
                let flags = buckets.entry(path).or_default();
                *flags = merge_sorted(flags, &record.flags);
            }
            Err(e) => skipped.push(SkippedRecord {
                value: record.path.clone(),
                reason: e.to_string(),
            }),
        }
    }

    let mut opens: Vec<OpenRecord> = verbatim
        .into_iter()
        .chain(buckets)
        .map(|(path, flags)| OpenRecord { path, flags })
        .collect();
    opens.sort_by(|a, b| a.path.cmp(&b.path));

    OpenAnalysis { opens, skipped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::segment::DYNAMIC_SEGMENT;

    #[test]
    fn test_analyze_open_uses_opens_trie() {
        let mut analyzer = PathAnalyzer::new(10);
        assert_eq!(analyze_open("/etc/hosts", &mut analyzer).unwrap(), "/etc/hosts");
        assert!(analyzer.root(OPENS_IDENTIFIER).is_some());
    }

    #[test]
    fn test_collapsed_paths_union_sorted_flags() {
        let mut analyzer = PathAnalyzer::new(2);
        let records = vec![
            OpenRecord::new("/proc/1/status", &["O_RDONLY"]),
            OpenRecord::new("/proc/2/status", &["O_RDONLY", "O_CLOEXEC"]),
            OpenRecord::new("/proc/3/status", &["O_NONBLOCK"]),
        ];

        let analysis = analyze_opens(&records, &mut analyzer, &BTreeSet::new());

        assert_eq!(
            analysis.opens,
            vec![OpenRecord::new(
                format!("/proc/{DYNAMIC_SEGMENT}/status"),
                &["O_CLOEXEC", "O_NONBLOCK", "O_RDONLY"]
            )]
        );
    }

    #[test]
    fn test_below_threshold_paths_stay_separate() {
        let mut analyzer = PathAnalyzer::new(10);
        let records = vec![
            OpenRecord::new("/etc/passwd", &["O_RDONLY"]),
            OpenRecord::new("/etc/hosts", &["O_RDONLY"]),
            OpenRecord::new("/etc/hosts", &["O_CLOEXEC"]),
        ];

        let analysis = analyze_opens(&records, &mut analyzer, &BTreeSet::new());

        assert_eq!(
            analysis.opens,
            vec![
                OpenRecord::new("/etc/hosts", &["O_CLOEXEC", "O_RDONLY"]),
                OpenRecord::new("/etc/passwd", &["O_RDONLY"]),
            ]
        );
    }

    #[test]
    fn test_excluded_path_is_kept_verbatim() {
        let mut analyzer = PathAnalyzer::new(2);
        let exclusions: BTreeSet<String> = ["/usr/lib/libssl.so.3".to_string()].into();
        let records = vec![
            OpenRecord::new("/usr/lib/libc.so.6", &["O_RDONLY"]),
            OpenRecord::new("/usr/lib/libm.so.6", &["O_RDONLY"]),
            OpenRecord::new("/usr/lib/libz.so.1", &["O_RDONLY"]),
            OpenRecord::new("/usr/lib/libssl.so.3", &["O_RDONLY", "O_CLOEXEC", "O_RDONLY"]),
            OpenRecord::new("/usr/lib/libssl.so.3", &["O_RDONLY"]),
        ];

        let analysis = analyze_opens(&records, &mut analyzer, &exclusions);

        assert_eq!(
            analysis.opens,
            vec![
                OpenRecord::new("/usr/lib/libssl.so.3", &["O_RDONLY", "O_CLOEXEC"]),
                OpenRecord::new(format!("/usr/lib/{DYNAMIC_SEGMENT}"), &["O_RDONLY"]),
            ]
        );
    }

    #[test]
    fn test_excluded_paths_do_not_train_the_trie() {
        let mut analyzer = PathAnalyzer::new(2);
        let exclusions: BTreeSet<String> = ["/data/a".to_string(), "/data/b".to_string()].into();
        let records = vec![
            OpenRecord::new("/data/a", &["O_RDONLY"]),
            OpenRecord::new("/data/b", &["O_RDONLY"]),
            OpenRecord::new("/data/c", &["O_RDONLY"]),
            OpenRecord::new("/data/d", &["O_RDONLY"]),
        ];

        let analysis = analyze_opens(&records, &mut analyzer, &exclusions);

        let paths: Vec<_> = analysis.opens.iter().map(|o| o.path.as_str()).collect();
        assert_eq!(paths, vec!["/data/a", "/data/b", "/data/c", "/data/d"]);
    }

    #[test]
    fn test_invalid_path_is_skipped() {
        let mut analyzer = PathAnalyzer::new(10);
        let records = vec![
            OpenRecord::new("/tmp/bad\0path", &["O_RDONLY"]),
            OpenRecord::new("/tmp/good", &["O_RDONLY"]),
        ];

        let analysis = analyze_opens(&records, &mut analyzer, &BTreeSet::new());

        assert_eq!(analysis.opens, vec![OpenRecord::new("/tmp/good", &["O_RDONLY"])]);
        assert_eq!(analysis.skipped.len(), 1);
        assert_eq!(analysis.skipped[0].value, "/tmp/bad\0path");
    }
}
