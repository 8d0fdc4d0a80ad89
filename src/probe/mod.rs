// SPDX-License-Identifier: MIT
//! Dependency probes.
//!
//! Each probe implements [`DependencyProbe`]: one bounded check against one
//! external dependency, classified into a [`ProbeResult`]. Errors never
//! escape a probe — every failure mode is folded into the result at the
//! probe boundary.

pub mod database;
pub mod http;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

pub use database::DatabaseProbe;
pub use http::HttpProbe;

/// Failure details are clipped to this many characters before display.
/// Cosmetic limit — keeps driver error chains from overflowing the page.
pub(crate) const DETAIL_MAX_CHARS: usize = 50;

/// What kind of dependency a probe checks. Drives page layout and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    Database,
    Http,
}

/// Error taxonomy for a single probe attempt.
///
/// Converted into a [`ProbeResult`] at the probe boundary; never propagated
/// to the presentation layer.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Connection refused, network unreachable, or authentication failure.
    #[error("{0}")]
    Connection(String),
    /// The probe query failed or returned no row.
    #[error("{0}")]
    Query(String),
    /// Timeout, DNS failure, or TLS failure below the HTTP layer.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint answered with a status outside the reachable set.
    #[error("HTTP {0}")]
    HttpStatus(u16),
}

/// Outcome of a single probe invocation.
///
/// Created fresh on every invocation; nothing is shared across requests or
/// mutated after construction.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    /// Machine-readable name of the probed dependency (e.g. `"database"`, `"github"`).
    pub name: String,
    /// Human display name (e.g. `"PostgreSQL Database"`).
    pub label: String,
    /// What was probed — host:port/dbname for the database, URL host for HTTP.
    pub target: String,
    pub kind: ProbeKind,
    /// Whether the probe succeeded.
    pub reachable: bool,
    /// Human-readable status or truncated error message. Always non-empty.
    pub detail: String,
    /// ISO-8601 timestamp when the probe ran.
    pub checked_at: String,
    /// Round-trip time of a successful check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl ProbeResult {
    /// Successful probe outcome.
    pub fn reachable(
        name: impl Into<String>,
        label: impl Into<String>,
        target: impl Into<String>,
        kind: ProbeKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            target: target.into(),
            kind,
            reachable: true,
            detail: detail.into(),
            checked_at: Utc::now().to_rfc3339(),
            latency_ms: None,
        }
    }

    /// Failed probe outcome. The detail is truncated for display.
    pub fn unreachable(
        name: impl Into<String>,
        label: impl Into<String>,
        target: impl Into<String>,
        kind: ProbeKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            target: target.into(),
            kind,
            reachable: false,
            detail: truncate_detail(&detail.into()),
            checked_at: Utc::now().to_rfc3339(),
            latency_ms: None,
        }
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

/// Async probe trait.
///
/// Implement this for any dependency that should appear on the status page.
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    /// Machine-readable name of this probe (e.g. `"database"`, `"github"`).
    fn name(&self) -> &str;

    /// Human display name (e.g. `"GitHub API"`).
    fn label(&self) -> &str;

    /// What kind of dependency this probe checks.
    fn kind(&self) -> ProbeKind;

    /// Run the check once. Never fails past this boundary — every error is
    /// folded into the returned [`ProbeResult`].
    async fn run(&self) -> ProbeResult;
}

/// Clip a failure detail to [`DETAIL_MAX_CHARS`] characters.
/// Operates on chars, not bytes, so multi-byte text is never split.
pub(crate) fn truncate_detail(msg: &str) -> String {
    if msg.chars().count() <= DETAIL_MAX_CHARS {
        msg.to_string()
    } else {
        msg.chars().take(DETAIL_MAX_CHARS).collect()
    }
}
