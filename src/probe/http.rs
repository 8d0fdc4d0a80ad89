// SPDX-License-Identifier: MIT
//! HTTP endpoint reachability probes.
//!
//! One GET per invocation with a 5 second total timeout. Classification:
//! 200 proves the API responds; 400/401/403 prove network reachability even
//! though the endpoint wants credentials; anything else is unreachable.

use crate::probe::{DependencyProbe, ProbeError, ProbeKind, ProbeResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = concat!("statusd/", env!("CARGO_PKG_VERSION"));

const GITHUB_API_URL: &str = "https://api.github.com/";
const CLOUDFLARE_API_URL: &str = "https://api.cloudflare.com/client/v4/";

/// Probes a fixed HTTP endpoint.
pub struct HttpProbe {
    name: String,
    label: String,
    url: String,
    /// URL host, shown on the status page.
    target: String,
    client: reqwest::Client,
}

impl HttpProbe {
    /// GitHub API probe. Full TLS verification.
    pub fn github() -> Self {
        Self::new("github", "GitHub API", GITHUB_API_URL)
    }

    /// Cloudflare API probe.
    ///
    /// `accept_invalid_certs` disables TLS certificate verification for
    /// clusters where a sidecar intercepts TLS
    /// ([`EgressConfig`](crate::config::EgressConfig) — opt-in, never the
    /// default).
    pub fn cloudflare(accept_invalid_certs: bool) -> Self {
        Self::with_options(
            "cloudflare",
            "Cloudflare API",
            CLOUDFLARE_API_URL,
            accept_invalid_certs,
        )
    }

    pub fn new(name: impl Into<String>, label: impl Into<String>, url: impl Into<String>) -> Self {
        Self::with_options(name, label, url, false)
    }

    pub fn with_options(
        name: impl Into<String>,
        label: impl Into<String>,
        url: impl Into<String>,
        accept_invalid_certs: bool,
    ) -> Self {
        let url = url.into();
        let target = reqwest::Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| url.clone());

        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .unwrap_or_default();

        Self {
            name: name.into(),
            label: label.into(),
            url,
            target,
            client,
        }
    }

    /// One GET, classified per the reachability policy. No retries.
    async fn classify(&self) -> Result<&'static str, ProbeError> {
        let response = self.client.get(&self.url).send().await?;
        match response.status() {
            StatusCode::OK => Ok("API responding"),
            // An auth rejection still proves the endpoint is reachable.
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Ok("API responding (auth required)")
            }
            other => Err(ProbeError::HttpStatus(other.as_u16())),
        }
    }
}

#[async_trait]
impl DependencyProbe for HttpProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::Http
    }

    async fn run(&self) -> ProbeResult {
        let start = Instant::now();

        match self.classify().await {
            Ok(detail) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                debug!(probe = %self.name, latency_ms, "endpoint reachable");
                ProbeResult::reachable(&self.name, &self.label, &self.target, ProbeKind::Http, detail)
                    .with_latency(latency_ms)
            }
            Err(e) => {
                warn!(probe = %self.name, err = %e, "http probe failed");
                ProbeResult::unreachable(
                    &self.name,
                    &self.label,
                    &self.target,
                    ProbeKind::Http,
                    e.to_string(),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::DETAIL_MAX_CHARS;
    use mockito::Server;

    fn probe_for(server: &Server) -> HttpProbe {
        HttpProbe::new("mock", "Mock API", server.url())
    }

    #[tokio::test]
    async fn status_200_is_reachable() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .create_async()
            .await;

        let result = probe_for(&server).run().await;
        mock.assert_async().await;

        assert!(result.reachable);
        assert_eq!(result.detail, "API responding");
        assert!(result.latency_ms.is_some());
    }

    #[tokio::test]
    async fn auth_rejection_statuses_still_prove_reachability() {
        for status in [400, 401, 403] {
            let mut server = Server::new_async().await;
            let mock = server
                .mock("GET", "/")
                .with_status(status)
                .create_async()
                .await;

            let result = probe_for(&server).run().await;
            mock.assert_async().await;

            assert!(result.reachable, "status {status} should be reachable");
            assert_eq!(result.detail, "API responding (auth required)");
        }
    }

    #[tokio::test]
    async fn status_500_is_unreachable_with_the_code_in_the_detail() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(500)
            .create_async()
            .await;

        let result = probe_for(&server).run().await;
        mock.assert_async().await;

        assert!(!result.reachable);
        assert_eq!(result.detail, "HTTP 500");
    }

    #[tokio::test]
    async fn transport_failure_detail_is_truncated() {
        // Nothing listens on port 1 — the connection fails at transport level.
        let probe = HttpProbe::new("mock", "Mock API", "http://127.0.0.1:1/");
        let result = probe.run().await;

        assert!(!result.reachable);
        assert!(!result.detail.is_empty());
        assert!(result.detail.chars().count() <= DETAIL_MAX_CHARS);
    }

    #[tokio::test]
    async fn probe_sends_the_service_user_agent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_header("user-agent", USER_AGENT)
            .with_status(200)
            .create_async()
            .await;

        let result = probe_for(&server).run().await;
        mock.assert_async().await;
        assert!(result.reachable);
    }

    #[test]
    fn target_is_the_url_host() {
        let probe = HttpProbe::github();
        assert_eq!(probe.target, "api.github.com");
    }
}
