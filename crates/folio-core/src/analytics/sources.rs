//! Traffic source normalisation

use super::source::ReferrerCount;
use folio_types::TrafficSource;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Source name for visits without a referrer
pub const DIRECT_SOURCE: &str = "direct";

/// scheme://[userinfo@]host[:port][/...]
static URL_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://(?:[^@/?#]*@)?([^/:?#\s]+)")
        .expect("static regex is valid")
});

/// Map a raw referrer to the name shown on the dashboard
///
/// URLs collapse to their lowercase host without a leading `www.`. Anything
/// that does not parse as a URL is kept verbatim.
pub fn normalise_referrer(referrer: Option<&str>) -> String {
    let raw = match referrer.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return DIRECT_SOURCE.to_string(),
    };

    match URL_HOST.captures(raw).and_then(|c| c.get(1)) {
        Some(host) => {
            let host = host.as_str().to_ascii_lowercase();
            match host.strip_prefix("www.") {
                Some(rest) if !rest.is_empty() => rest.to_string(),
                _ => host,
            }
        }
        None => raw.to_string(),
    }
}

/// Merge raw referrer rows by normalised source and rank them
pub fn rank_traffic_sources(rows: &[ReferrerCount]) -> Vec<TrafficSource> {
    let mut merged: HashMap<String, u64> = HashMap::new();
    for row in rows {
        *merged
            .entry(normalise_referrer(row.referrer.as_deref()))
            .or_default() += row.visits;
    }

    let mut sources: Vec<TrafficSource> = merged
        .into_iter()
        .filter(|(_, visits)| *visits > 0)
        .map(|(source, visits)| TrafficSource { source, visits })
        .collect();
    sources.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.source.cmp(&b.source)));
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_referrer() {
        assert_eq!(normalise_referrer(None), "direct");
        assert_eq!(normalise_referrer(Some("  ")), "direct");
        assert_eq!(
            normalise_referrer(Some("https://WWW.Google.com/search?q=photos")),
            "google.com"
        );
        assert_eq!(
            normalise_referrer(Some("http://user@instagram.com:8080/p/x")),
            "instagram.com"
        );
        assert_eq!(normalise_referrer(Some("newsletter")), "newsletter");
        assert_eq!(normalise_referrer(Some("www.example.com")), "www.example.com");
    }

    #[test]
    fn test_rank_merges_hosts() {
        let rows = vec![
            ReferrerCount {
                referrer: Some("https://www.behance.net/gallery/1".into()),
                visits: 2,
            },
            ReferrerCount {
                referrer: Some("https://behance.net/".into()),
                visits: 1,
            },
            ReferrerCount {
                referrer: None,
                visits: 3,
            },
            ReferrerCount {
                referrer: Some("https://dribbble.com".into()),
                visits: 3,
            },
        ];

        let ranked = rank_traffic_sources(&rows);
        let names: Vec<_> = ranked.iter().map(|s| (s.source.as_str(), s.visits)).collect();
        assert_eq!(
            names,
            vec![("behance.net", 3), ("direct", 3), ("dribbble.com", 3)]
        );
    }
}
