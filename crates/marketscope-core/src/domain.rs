//! Registrable-domain extraction and known-buyer classification.
//!
//! Search results arrive as arbitrary URLs; everything downstream (ranking,
//! SEO lookups, caching) keys on the registrable domain, e.g.
//! `https://www.blog.example.co.uk:8443/a?b=c` becomes `example.co.uk`.
//! Suffixes come from the Public Suffix List, private section included, so
//! `alice.github.io` is its own domain.

use std::collections::HashSet;

use reqwest::Url;

/// Extracts the registrable domain from `url`.
///
/// Strips scheme, credentials, port, path, query, fragment, and any
/// subdomain in front of the registrable part. Inputs without a scheme
/// (`www.example.com/page`) fall back to best-effort host parsing. Returns
/// `None` when no plausible host can be recovered; never panics.
#[must_use]
pub fn extract_base_domain(url: &str) -> Option<String> {
    let raw = url.trim();
    if raw.is_empty() {
        return None;
    }

    let host = parse_host(raw).or_else(|| {
        tracing::debug!(url = raw, "URL did not parse cleanly; falling back to manual host split");
        fallback_host(raw)
    })?;

    registrable_domain(&host)
}

/// Parses the host with a real URL parser, adding `https://` when the input
/// carries no scheme.
fn parse_host(raw: &str) -> Option<String> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw.trim_start_matches("//"))
    };

    let parsed = Url::parse(&candidate).ok()?;
    parsed.host_str().map(normalize_host)
}

/// Manual host extraction for inputs the URL parser rejects.
fn fallback_host(raw: &str) -> Option<String> {
    let without_scheme = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    let host = host_port.split(':').next().unwrap_or_default();
    let host = normalize_host(host);

    let plausible = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    plausible.then_some(host)
}

fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn registrable_domain(host: &str) -> Option<String> {
    if host.is_empty() {
        return None;
    }
    // IP literals have no registrable part; keep them whole.
    if host.starts_with('[') || host.parse::<std::net::Ipv4Addr>().is_ok() {
        return Some(host.to_string());
    }

    let host = host
        .split('.')
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(".");
    if host.is_empty() {
        return None;
    }

    // A bare public suffix or single-label host has no registrable part; keep it whole.
    let registrable = psl::domain_str(&host).unwrap_or(&host);
    Some(registrable.to_string())
}

/// Removes duplicate domains while preserving first-seen order.
#[must_use]
pub fn deduplicate_domains<I, S>(domains: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    domains
        .into_iter()
        .filter_map(|d| {
            let d = d.as_ref();
            seen.insert(d.to_string()).then(|| d.to_string())
        })
        .collect()
}

/// Classifies domains against a configured set of known instant-offer buyers.
#[derive(Debug, Clone, Default)]
pub struct BuyerClassifier {
    domains: HashSet<String>,
}

impl BuyerClassifier {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive membership test.
    #[must_use]
    pub fn is_ibuyer(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

#[cfg(test)]
#[path = "domain_test.rs"]
mod tests;
