use crate::request::{Body, HttpRequest};
use anyhow::{Context, anyhow};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Client-level limits. The engine applies its own per-turn timeout on top of these.
#[derive(Debug, Clone, Copy)]
struct ClientTimeouts {
    connect: Duration,
    overall: Duration,
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            // Local inference on CPU can be slow.
            overall: Duration::from_secs(120),
        }
    }
}

pub async fn execute(req: &HttpRequest) -> anyhow::Result<HttpResponse> {
    execute_with(req, ClientTimeouts::default()).await
}

async fn execute_with(req: &HttpRequest, t: ClientTimeouts) -> anyhow::Result<HttpResponse> {
    let client = reqwest::Client::builder()
        .connect_timeout(t.connect)
        .timeout(t.overall)
        .build()
        .context("build http client")?;

    let mut headers = HeaderMap::new();
    for (k, v) in &req.headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .with_context(|| format!("invalid header name: {k}"))?;
        let value =
            HeaderValue::from_str(v).with_context(|| format!("invalid header value for {k}"))?;
        headers.insert(name, value);
    }

    let builder = match req.method.as_str() {
        "GET" => client.get(&req.url),
        "POST" => client.post(&req.url),
        other => return Err(anyhow!("unsupported method: {other}")),
    }
    .headers(headers);

    let builder = match &req.body {
        Body::Empty => builder,
        Body::Json(s) => builder.body(s.clone()),
    };

    log::debug!("sending {req:?}");
    let resp = builder.send().await.context("http request failed")?;
    let status = resp.status().as_u16();
    let body = resp
        .bytes()
        .await
        .context("failed reading response body")?
        .to_vec();

    Ok(HttpResponse { status, body })
}
