use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use schemars::JsonSchema;
use serde::Deserialize;
use url::Url;

use crate::config::WebSearchConfig;
use crate::executor::{Tool, ToolError, deserialize_params};
use crate::registry::ToolDef;

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchParams {
    /// The search query
    query: String,
}

static NON_CONTENT_BLOCKS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "noscript"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("non-content block regex is valid")
        })
        .collect()
});

/// Searches the web and returns the text of the first result page.
///
/// Always answers with a JSON string: `{"content": ...}` on success,
/// `{"error": ...}` (plus `details` for transport failures) otherwise.
#[derive(Debug)]
pub struct WebSearchTool {
    client: reqwest::Client,
    endpoint: String,
    result_selector: String,
    max_body_bytes: usize,
}

impl WebSearchTool {
    #[must_use]
    pub fn new(config: &WebSearchConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .redirect(reqwest::redirect::Policy::limited(3))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: config.endpoint.clone(),
            result_selector: config.result_selector.clone(),
            max_body_bytes: config.max_body_bytes,
        }
    }

    async fn search(&self, query: &str) -> Result<Option<String>, ToolError> {
        let search_url = Url::parse_with_params(&self.endpoint, &[("q", query)])
            .map_err(|e| ToolError::Http(format!("invalid search endpoint: {e}")))?;
        let html = self.fetch_html(search_url.as_str()).await?;

        let selector = self.result_selector.clone();
        let link = tokio::task::spawn_blocking(move || first_result_link(&html, &selector))
            .await
            .map_err(|e| ToolError::Execution(std::io::Error::other(e.to_string())))??;
        let Some(link) = link else {
            return Ok(None);
        };

        validate_url(&link)?;
        tracing::debug!(%link, "fetching first search result");
        let page = self.fetch_html(&link).await?;
        let text = tokio::task::spawn_blocking(move || page_text(&page))
            .await
            .map_err(|e| ToolError::Execution(std::io::Error::other(e.to_string())))??;
        Ok(Some(text))
    }

    async fn fetch_html(&self, url: &str) -> Result<String, ToolError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ToolError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ToolError::Http(format!("HTTP {}", resp.status())));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ToolError::Http(e.to_string()))?;

        if bytes.len() > self.max_body_bytes {
            return Err(ToolError::Http(format!(
                "response too large: {} bytes (max: {})",
                bytes.len(),
                self.max_body_bytes,
            )));
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Tool for WebSearchTool {
    fn definition(&self) -> ToolDef {
        ToolDef {
            id: "search_web",
            description: "Search the web and return the first result page's text content without styles, images, and scripts",
            schema: schemars::schema_for!(SearchParams),
        }
    }

    async fn invoke(&self, args: &serde_json::Value) -> Result<String, ToolError> {
        let query = match args.get("query") {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(_) => deserialize_params::<SearchParams>(args)?.query,
        };
        let query = query.trim();
        if query.is_empty() {
            return Ok(serde_json::json!({ "error": "No query provided" }).to_string());
        }

        let payload = match self.search(query).await {
            Ok(Some(content)) => serde_json::json!({ "content": content }),
            Ok(None) => serde_json::json!({ "error": "No results found" }),
            Err(e) => {
                tracing::warn!("web search failed: {e}");
                serde_json::json!({ "error": "Error during search", "details": e.to_string() })
            }
        };
        Ok(payload.to_string())
    }
}

fn first_result_link(html: &str, selector: &str) -> Result<Option<String>, ToolError> {
    let soup = scrape_core::Soup::parse(html);
    let tags = soup
        .find_all(selector)
        .map_err(|e| ToolError::InvalidParams {
            message: format!("invalid result selector: {e}"),
        })?;

    Ok(tags
        .iter()
        .filter_map(|tag| tag.get("href"))
        .find(|href| href.starts_with("http"))
        .map(str::to_owned))
}

fn page_text(html: &str) -> Result<String, ToolError> {
    let mut cleaned = html.to_owned();
    for re in NON_CONTENT_BLOCKS.iter() {
        cleaned = re.replace_all(&cleaned, " ").into_owned();
    }

    let soup = scrape_core::Soup::parse(&cleaned);
    let body = soup.find_all("body").map_err(|e| {
        ToolError::Execution(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("invalid selector: {e}"),
        ))
    })?;
    let raw: String = body.iter().map(|tag| tag.text()).collect();

    Ok(raw.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn validate_url(raw: &str) -> Result<(), ToolError> {
    let parsed = Url::parse(raw).map_err(|_| ToolError::Http(format!("invalid URL: {raw}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ToolError::Http(format!(
            "scheme not allowed: {}",
            parsed.scheme()
        )));
    }

    if let Some(host) = parsed.host()
        && is_private_host(&host)
    {
        return Err(ToolError::Http(format!(
            "private/local host blocked: {}",
            parsed.host_str().unwrap_or("")
        )));
    }

    Ok(())
}

fn is_private_v4(v4: std::net::Ipv4Addr) -> bool {
    v4.is_loopback()
        || v4.is_private()
        || v4.is_link_local()
        || v4.is_unspecified()
        || v4.is_broadcast()
}

fn is_private_host(host: &url::Host<&str>) -> bool {
    match host {
        url::Host::Domain(d) => d.eq_ignore_ascii_case("localhost"),
        url::Host::Ipv4(v4) => is_private_v4(*v4),
        url::Host::Ipv6(v6) => {
            if v6.is_loopback() || v6.is_unspecified() {
                return true;
            }
            let seg = v6.segments();
            // fe80::/10 link-local, fc00::/7 unique local
            if seg[0] & 0xffc0 == 0xfe80 || seg[0] & 0xfe00 == 0xfc00 {
                return true;
            }
            v6.to_ipv4_mapped().is_some_and(is_private_v4)
        }
    }
}
