//! Endpoint reconciliation: generalize observed HTTP endpoints and merge the
//! records that collapse onto the same generalized endpoint.

use crate::models::{EndpointRecord, SkippedRecord};
use crate::services::path_analyzer::{AnalyzeError, PathAnalyzer};
use crate::utils::merge::{dedup_strings, merge_headers, merge_strings};
use url::Host;

/// Result of one endpoint reconciliation batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointAnalysis {
    /// Generalized, deduplicated endpoints in first-seen order
    pub endpoints: Vec<EndpointRecord>,
    /// Records that could not be parsed
    pub skipped: Vec<SkippedRecord>,
}

/// An endpoint split into the pieces the analyzer needs
#[derive(Debug, PartialEq, Eq)]
struct ParsedEndpoint<'a> {
    hostname: String,
    port: Option<u16>,
    path: &'a str,
}

impl ParsedEndpoint<'_> {
    fn authority(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{port}", self.hostname),
            None => self.hostname.clone(),
        }
    }
}

/// Parse `[scheme://][userinfo@]host[:port][/path][?query][#fragment]`
///
/// A missing scheme means `http`. The host may be empty so that port-only
/// endpoints such as `:80/users` are accepted.
fn parse_endpoint(raw: &str) -> Result<ParsedEndpoint<'_>, AnalyzeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AnalyzeError::EmptyEndpoint);
    }

    // a scheme only counts when `://` precedes the first path, query or fragment delimiter
    let scheme_end = raw
        .find("://")
        .filter(|&end| !raw[..end].contains(['/', '?', '#']));
    let rest = match scheme_end.map(|end| (&raw[..end], &raw[end + 3..])) {
        Some((scheme, rest)) => {
            let valid = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
            if !valid {
                return Err(AnalyzeError::InvalidScheme(scheme.to_string()));
            }
            rest
        }
        None => raw,
    };

    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    let path_end = tail.find(['?', '#']).unwrap_or(tail.len());
    let path = &tail[..path_end];

    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let (host, port) = split_host_port(host_port)?;

    let hostname = if host.is_empty() {
        String::new()
    } else {
        Host::parse(host)?.to_string()
    };

    Ok(ParsedEndpoint {
        hostname,
        port,
        path,
    })
}

fn split_host_port(host_port: &str) -> Result<(&str, Option<u16>), AnalyzeError> {
    let (host, port) = if host_port.starts_with('[') {
        // bracketed IPv6 literal
        match host_port.find(']') {
            Some(end) => {
                let (host, after) = host_port.split_at(end + 1);
                match after.strip_prefix(':') {
                    Some(port) => (host, port),
                    None if after.is_empty() => (host, ""),
                    None => return Err(AnalyzeError::InvalidPort(after.to_string())),
                }
            }
            None => return Err(AnalyzeError::InvalidHost(url::ParseError::InvalidIpv6Address)),
        }
    } else {
        match host_port.rsplit_once(':') {
            Some((host, port)) => (host, port),
            None => (host_port, ""),
        }
    };

    if !host.starts_with('[') && host.contains(':') {
        return Err(AnalyzeError::UnexpectedColon(host.to_string()));
    }

    let port = if port.is_empty() {
        None
    } else {
        Some(
            port.parse::<u16>()
                .map_err(|_| AnalyzeError::InvalidPort(port.to_string()))?,
        )
    };

    Ok((host, port))
}

/// Generalize one endpoint string
///
/// The hostname selects the trie; the returned endpoint is the authority
/// (`host[:port]`) followed by the generalized path.
pub fn analyze_url(endpoint: &str, analyzer: &mut PathAnalyzer) -> Result<String, AnalyzeError> {
    let parsed = parse_endpoint(endpoint)?;
    let path = analyzer.analyze_path(parsed.path, &parsed.hostname)?;
    Ok(format!("{}{path}", parsed.authority()))
}

/// Generalize a batch of endpoints and merge the ones that collide
///
/// The whole batch trains the analyzer before any record is rewritten, so
/// the output does not depend on the order of records within the batch.
/// Records that fail to parse are reported in `skipped`.
pub fn analyze_endpoints(records: &[EndpointRecord], analyzer: &mut PathAnalyzer) -> EndpointAnalysis {
    for record in records {
        // training pass, failures are reported by the rewrite pass
        let _ = analyze_url(&record.endpoint, analyzer);
    }

    let mut analysis = EndpointAnalysis::default();
    for record in records {
        let endpoint = match analyze_url(&record.endpoint, analyzer) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                analysis.skipped.push(SkippedRecord {
                    value: record.endpoint.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        match analysis.endpoints.iter_mut().find(|e| e.endpoint == endpoint) {
            Some(existing) => {
                merge_strings(&mut existing.methods, &record.methods);
                merge_headers(&mut existing.headers, &record.headers);
            }
            None => {
                let mut headers = Default::default();
                merge_headers(&mut headers, &record.headers);
                analysis.endpoints.push(EndpointRecord {
                    endpoint,
                    methods: dedup_strings(&record.methods),
                    headers,
                });
            }
        }
    }

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::segment::DYNAMIC_SEGMENT;

    #[test]
    fn test_parse_port_only_endpoint() {
        let parsed = parse_endpoint(":80/users/42").unwrap();
        assert_eq!(parsed.hostname, "");
        assert_eq!(parsed.port, Some(80));
        assert_eq!(parsed.path, "/users/42");
        assert_eq!(parsed.authority(), ":80");
    }

    #[test]
    fn test_parse_full_url() {
        let parsed = parse_endpoint("https://user@API.Example.com:8443/v1/items?id=7#top").unwrap();
        assert_eq!(parsed.hostname, "api.example.com");
        assert_eq!(parsed.port, Some(8443));
        assert_eq!(parsed.path, "/v1/items");
    }

    #[test]
    fn test_parse_ipv6_host() {
        let parsed = parse_endpoint("[::1]:9090/metrics").unwrap();
        assert_eq!(parsed.hostname, "[::1]");
        assert_eq!(parsed.port, Some(9090));
        assert_eq!(parsed.authority(), "[::1]:9090");
    }

    #[test]
    fn test_parse_without_path() {
        let parsed = parse_endpoint("example.com").unwrap();
        assert_eq!(parsed.path, "");
        assert_eq!(parsed.port, None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_endpoint(":::invalid-url:::").is_err());
        assert!(parse_endpoint("   ").is_err());
        assert!(parse_endpoint("example.com:99999/x").is_err());
        assert!(parse_endpoint("1nvalid scheme://example.com").is_err());
        assert!(parse_endpoint("[::1/x").is_err());
    }

    #[test]
    fn test_embedded_url_in_path_or_query_is_not_a_scheme() {
        let parsed = parse_endpoint(":80/proxy/http://upstream/x").unwrap();
        assert_eq!(parsed.port, Some(80));
        assert_eq!(parsed.path, "/proxy/http://upstream/x");

        let parsed = parse_endpoint("example.com/login?next=http://a/b").unwrap();
        assert_eq!(parsed.hostname, "example.com");
        assert_eq!(parsed.path, "/login");

        let parsed = parse_endpoint("https://example.com/redirect?to=https://other").unwrap();
        assert_eq!(parsed.path, "/redirect");
    }

    #[test]
    fn test_batch_keeps_endpoints_with_embedded_urls() {
        let mut analyzer = PathAnalyzer::new(100);
        let records = vec![
            EndpointRecord::new("example.com/login?next=http://a/b", &["GET"]),
            EndpointRecord::new(":80/proxy/http://upstream/x", &["POST"]),
        ];

        let analysis = analyze_endpoints(&records, &mut analyzer);

        assert!(analysis.skipped.is_empty());
        let endpoints: Vec<_> = analysis.endpoints.iter().map(|e| e.endpoint.as_str()).collect();
        assert_eq!(endpoints, vec!["example.com/login", ":80/proxy/http:/upstream/x"]);
    }

    #[test]
    fn test_analyze_url_keeps_authority() {
        let mut analyzer = PathAnalyzer::new(100);
        assert_eq!(analyze_url(":80/users/", &mut analyzer).unwrap(), ":80/users");
        assert_eq!(analyze_url("http://localhost:8080", &mut analyzer).unwrap(), "localhost:8080/");
    }

    #[test]
    fn test_hostname_selects_trie() {
        let mut analyzer = PathAnalyzer::new(100);
        analyze_url(&format!("a.example.com/users/{DYNAMIC_SEGMENT}"), &mut analyzer).unwrap();

        assert_eq!(
            analyze_url("a.example.com:8080/users/7", &mut analyzer).unwrap(),
            format!("a.example.com:8080/users/{DYNAMIC_SEGMENT}")
        );
        assert_eq!(
            analyze_url("b.example.com/users/7", &mut analyzer).unwrap(),
            "b.example.com/users/7"
        );
    }

    #[test]
    fn test_colliding_endpoints_merge_metadata() {
        let mut analyzer = PathAnalyzer::new(100);
        let records = vec![
            EndpointRecord::new(format!(":80/users/{DYNAMIC_SEGMENT}"), &["GET"])
                .with_header("Host", "example.com"),
            EndpointRecord::new(":80/users/123", &["POST", "GET"])
                .with_header("Host", "example.com")
                .with_header("Content-Type", "application/json"),
        ];

        let analysis = analyze_endpoints(&records, &mut analyzer);

        assert!(analysis.skipped.is_empty());
        assert_eq!(analysis.endpoints.len(), 1);
        let merged = &analysis.endpoints[0];
        assert_eq!(merged.endpoint, format!(":80/users/{DYNAMIC_SEGMENT}"));
        assert_eq!(merged.methods, vec!["GET", "POST"]);
        assert_eq!(merged.headers["Host"], vec!["example.com"]);
        assert_eq!(merged.headers["Content-Type"], vec!["application/json"]);
    }

    #[test]
    fn test_invalid_endpoint_is_skipped() {
        let mut analyzer = PathAnalyzer::new(100);
        let records = vec![
            EndpointRecord::new(":::invalid-url:::", &["GET"]),
            EndpointRecord::new(":80/health", &["GET", "GET"]),
        ];

        let analysis = analyze_endpoints(&records, &mut analyzer);

        assert_eq!(analysis.endpoints.len(), 1);
        assert_eq!(analysis.endpoints[0].endpoint, ":80/health");
        assert_eq!(analysis.endpoints[0].methods, vec!["GET"]);
        assert_eq!(analysis.skipped.len(), 1);
        assert_eq!(analysis.skipped[0].value, ":::invalid-url:::");
    }

    #[test]
    fn test_identical_endpoints_are_deduplicated() {
        let mut analyzer = PathAnalyzer::new(100);
        let records = vec![
            EndpointRecord::new(":443/login", &["GET"]),
            EndpointRecord::new(":443/login", &["POST"]),
        ];

        let analysis = analyze_endpoints(&records, &mut analyzer);
        assert_eq!(analysis.endpoints.len(), 1);
        assert_eq!(analysis.endpoints[0].methods, vec!["GET", "POST"]);
    }
}
