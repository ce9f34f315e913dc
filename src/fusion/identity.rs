//! Sender Identity & Link Extraction
//!
//! The ledger key is always the normalized sender address. Link domains are
//! deliberately never used as the key - shared hosting would let one
//! party's infrastructure classify another party's mail.

use once_cell::sync::Lazy;
use regex::Regex;

static HTTP_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)https?://[^\s<>"{}|\\^`\[\]]+"#).unwrap());

static WWW_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)www\.[^\s<>"{}|\\^`\[\]]+"#).unwrap());

/// Normalize a raw From header into a ledger identifier.
///
/// Handles `Display Name <user@host>` and bare-address forms; returns an
/// empty string when no address can be recovered.
pub fn normalize_sender(raw: &str) -> String {
    let raw = raw.trim();

    // Prefer the angle-bracket form
    let candidate = match (raw.rfind('<'), raw.rfind('>')) {
        (Some(open), Some(close)) if open < close => &raw[open + 1..close],
        _ => raw,
    };

    let candidate = candidate.trim().trim_matches('"').to_lowercase();
    if candidate.contains('@') && !candidate.starts_with('@') && !candidate.ends_with('@') {
        candidate
    } else {
        String::new()
    }
}

/// Extract http(s) and `www.` links from free text, deduplicated, in order
/// of first appearance. `www.` links get an `http://` prefix.
pub fn extract_urls(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }

    let mut urls: Vec<String> = Vec::new();
    let mut push_unique = |url: String| {
        if !urls.contains(&url) {
            urls.push(url);
        }
    };

    for m in HTTP_URL_RE.find_iter(content) {
        push_unique(m.as_str().to_string());
    }
    for m in WWW_URL_RE.find_iter(content) {
        let candidate = format!("http://{}", m.as_str());
        // Skip www. matches already captured inside an http(s) URL
        if !content[..m.start()].ends_with("://") && !content[..m.start()].ends_with('.') {
            push_unique(candidate);
        }
    }

    urls
}

/// Host portion of each URL, lowercased, `www.` stripped, deduplicated.
pub fn extract_domains(urls: &[String]) -> Vec<String> {
    let mut domains = Vec::new();
    for url in urls {
        let rest = match url.split_once("://") {
            Some((_, rest)) => rest,
            None => url.as_str(),
        };
        let host = rest
            .split(['/', '?', '#'])
            .next()
            .unwrap_or("")
            .split('@')
            .last()
            .unwrap_or("")
            .split(':')
            .next()
            .unwrap_or("")
            .to_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
        if !host.is_empty() && !domains.contains(&host) {
            domains.push(host);
        }
    }
    domains
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sender_forms() {
        assert_eq!(normalize_sender("Alice <Alice@Example.COM>"), "alice@example.com");
        assert_eq!(normalize_sender("  bob@corp.net  "), "bob@corp.net");
        assert_eq!(normalize_sender("\"Support Team\" <help@Vendor.io>"), "help@vendor.io");
        assert_eq!(normalize_sender("no-address-here"), "");
        assert_eq!(normalize_sender(""), "");
        assert_eq!(normalize_sender("broken@"), "");
    }

    #[test]
    fn test_extract_urls() {
        let text = "Click https://evil.example/login?x=1 or visit www.scam.net/pay now";
        let urls = extract_urls(text);
        assert_eq!(
            urls,
            vec![
                "https://evil.example/login?x=1".to_string(),
                "http://www.scam.net/pay".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_urls_dedup_and_empty() {
        assert!(extract_urls("").is_empty());
        let urls = extract_urls("https://a.com https://a.com");
        assert_eq!(urls.len(), 1);
    }

    #[test]
    fn test_extract_domains() {
        let urls = vec![
            "https://www.Evil.Example/login".to_string(),
            "http://scam.net:8080/pay".to_string(),
            "https://evil.example/other".to_string(),
        ];
        assert_eq!(extract_domains(&urls), vec!["evil.example".to_string(), "scam.net".to_string()]);
    }
}
