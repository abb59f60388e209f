//! Page fetching and HTML-to-text conversion for research context.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{redirect::Policy, Client};
use std::net::IpAddr;
use std::time::Duration;
use url::{Host, Url};

use crate::config::SearchSettings;
use crate::errors::{AppError, AppResult};

const USER_AGENT: &str = concat!("bizlens/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 5;

static HIDDEN_BLOCKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(?:script|style|noscript)\b[^>]*>.*?</(?:script|style|noscript)\s*>")
        .expect("valid regex")
});
static COMMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static BLOCK_TAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)</?(?:p|div|br|hr|li|ul|ol|h[1-6]|tr|td|th|table|section|article|header|footer|nav|blockquote|pre)\b[^>]*>",
    )
    .expect("valid regex")
});
static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\x{a0}]+").expect("valid regex"));

/// Fetches a page and returns its readable text.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PageScraper: Send + Sync {
    async fn fetch_text(&self, url: &str) -> AppResult<String>;
}

/// Reject anything but public http(s) URLs.
pub fn validate_url(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid URL: {}", e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(AppError::BadRequest(format!(
                "Unsupported URL scheme: {}",
                other
            )))
        }
    }

    let blocked = match url.host() {
        None => true,
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        Some(Host::Ipv4(ip)) => is_private_ip(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => is_private_ip(IpAddr::V6(ip)),
    };

    if blocked {
        return Err(AppError::BadRequest(
            "Local and private network addresses are not allowed".to_string(),
        ));
    }
    Ok(url)
}

/// Whether to follow a redirect to `next` after `hops` earlier redirects.
/// Every hop must pass the same checks as the first URL.
fn redirect_allowed(hops: usize, next: &Url) -> bool {
    hops < MAX_REDIRECTS && validate_url(next.as_str()).is_ok()
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                // fc00::/7 unique local, fe80::/10 link local
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80
                || v6.to_ipv4_mapped().is_some_and(|v4| is_private_ip(IpAddr::V4(v4)))
        }
    }
}

/// Readable text of an HTML document.
pub fn html_to_text(html: &str) -> String {
    let text = HIDDEN_BLOCKS.replace_all(html, " ");
    let text = COMMENTS.replace_all(&text, " ");
    let text = BLOCK_TAGS.replace_all(&text, "\n");
    let text = TAGS.replace_all(&text, "");
    let text = decode_entities(&text);

    text.lines()
        .map(|line| SPACES.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&mdash;", "-")
        .replace("&ndash;", "-")
        .replace("&amp;", "&")
}

/// Largest prefix of `text` that fits in `max_bytes` without splitting a char.
pub fn truncate_bytes(text: &mut String, max_bytes: usize) {
    if text.len() <= max_bytes {
        return;
    }
    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
}

pub struct HttpScraper {
    client: Client,
    max_bytes: usize,
}

impl HttpScraper {
    pub fn new(settings: &SearchSettings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.scraper_timeout_seconds))
            .redirect(Policy::custom(|attempt| {
                if redirect_allowed(attempt.previous().len(), attempt.url()) {
                    attempt.follow()
                } else {
                    attempt.stop()
                }
            }))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            max_bytes: settings.scraper_max_bytes,
        })
    }
}

#[async_trait]
impl PageScraper for HttpScraper {
    async fn fetch_text(&self, url: &str) -> AppResult<String> {
        let url = validate_url(url)?;

        let mut response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(format!("{} returned {}", url, status)));
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase().contains("html"))
            .unwrap_or(true);

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            if body.len() >= self.max_bytes {
                break;
            }
        }

        let mut text = String::from_utf8_lossy(&body).into_owned();
        truncate_bytes(&mut text, self.max_bytes);

        let text = if is_html { html_to_text(&text) } else { text };
        tracing::debug!(url = %url, bytes = body.len(), chars = text.len(), "Page scraped");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_public() {
        assert!(validate_url("https://example.com/about").is_ok());
        assert!(validate_url("http://93.184.216.34/").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_local_and_private() {
        for url in [
            "http://localhost:8080",
            "http://api.localhost",
            "http://127.0.0.1",
            "http://10.0.0.8",
            "http://192.168.1.1",
            "http://169.254.169.254/latest/meta-data",
            "http://[::1]/",
            "http://[fd00::1]/",
            "http://0.0.0.0",
        ] {
            assert!(validate_url(url).is_err(), "{} should be rejected", url);
        }
    }

    #[test]
    fn test_redirects_are_validated() {
        let public = Url::parse("https://example.com/next").unwrap();
        assert!(redirect_allowed(0, &public));
        assert!(!redirect_allowed(MAX_REDIRECTS, &public));

        for target in [
            "http://169.254.169.254/latest/meta-data",
            "http://127.0.0.1/admin",
            "http://localhost/",
            "file:///etc/passwd",
        ] {
            let url = Url::parse(target).unwrap();
            assert!(!redirect_allowed(0, &url), "{} should not be followed", target);
        }
    }

    #[test]
    fn test_validate_url_rejects_other_schemes() {
        assert!(validate_url("file:///etc/passwd").is_err());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn test_html_to_text() {
        let html = r#"<html><head><style>body{color:red}</style><script>var x = "<p>";</script></head>
<body><!-- nav --><h1>Acme&nbsp;Corp</h1><p>Makes   <b>anvils</b> &amp; rockets.</p><ul><li>Founded 1949</li></ul></body></html>"#;
        let text = html_to_text(html);
        assert_eq!(text, "Acme Corp\nMakes anvils & rockets.\nFounded 1949");
    }

    #[test]
    fn test_truncate_bytes_char_boundary() {
        let mut text = "aé".to_string();
        truncate_bytes(&mut text, 2);
        assert_eq!(text, "a");

        let mut text = "short".to_string();
        truncate_bytes(&mut text, 100);
        assert_eq!(text, "short");
    }
}
