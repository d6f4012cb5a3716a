//! Backend transport
//!
//! Form-encoded POSTs to the CRUD responder. Every widget call goes
//! through the typed client in classify-core; this only moves bytes.

use async_trait::async_trait;
use classify_core::{ApiClient, ApiError, RawReply, Transport};

pub type Api = ApiClient<HttpTransport>;

/// reqwest-backed [`Transport`] for the browser
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn api_client(url: &str) -> Api {
    ApiClient::new(HttpTransport::new(), url)
}

fn join(base: &str, url: &str) -> Result<reqwest::Url, ApiError> {
    reqwest::Url::parse(base)
        .and_then(|base| base.join(url))
        .map_err(|e| ApiError::Transport(e.to_string()))
}

/// Relative urls such as `./api/mock` are resolved against the page
fn resolve(url: &str) -> Result<reqwest::Url, ApiError> {
    if let Ok(absolute) = reqwest::Url::parse(url) {
        return Ok(absolute);
    }
    let page = web_sys::window()
        .and_then(|w| w.location().href().ok())
        .ok_or_else(|| ApiError::Transport("page location unavailable".to_string()))?;
    join(&page, url)
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<RawReply, ApiError> {
        let url = resolve(url)?;
        log::debug!("POST {} ({} fields)", url, fields.len());

        let response = self
            .client
            .post(url)
            .form(fields)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(RawReply { status, body })
    }
}
