// SPDX-License-Identifier: MIT
//! PostgreSQL reachability probe.
//!
//! Opens a fresh connection on every invocation, runs a trivial read-only
//! query, and reports the returned greeting as the probe detail. The
//! connection lives only for the duration of the probe — it is closed
//! gracefully on success and torn down on drop on every error path.

use crate::config::DatabaseConfig;
use crate::probe::{DependencyProbe, ProbeError, ProbeKind, ProbeResult};
use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const PROBE_QUERY: &str = "SELECT 'Hello from PostgreSQL'::text";

/// Cap on connection establishment so a black-holed host cannot hang the page.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Probes the configured PostgreSQL database.
pub struct DatabaseProbe {
    config: DatabaseConfig,
}

impl DatabaseProbe {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .username(&self.config.user)
            .password(&self.config.password)
            .database(&self.config.dbname)
    }

    /// Connect, run the probe query, and return the greeting row.
    ///
    /// `Err(Connection)` — refused, unreachable, bad credentials, or connect
    /// timeout. `Err(Query)` — the query failed or produced no row.
    async fn get_message(&self) -> Result<String, ProbeError> {
        let options = self.connect_options();
        let connect = PgConnection::connect_with(&options);
        let mut conn = match tokio::time::timeout(CONNECT_TIMEOUT, connect).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(ProbeError::Connection(e.to_string())),
            Err(_) => {
                return Err(ProbeError::Connection(format!(
                    "connect timed out after {}s",
                    CONNECT_TIMEOUT.as_secs()
                )))
            }
        };

        let row: Result<Option<String>, sqlx::Error> = sqlx::query_scalar(PROBE_QUERY)
            .fetch_optional(&mut conn)
            .await;

        // Graceful close on the success path; error paths release on drop.
        let _ = conn.close().await;

        match row {
            Ok(Some(message)) => Ok(message),
            Ok(None) => Err(ProbeError::Query("No message".to_string())),
            Err(e) => Err(ProbeError::Query(e.to_string())),
        }
    }
}

#[async_trait]
impl DependencyProbe for DatabaseProbe {
    fn name(&self) -> &str {
        "database"
    }

    fn label(&self) -> &str {
        "PostgreSQL Database"
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::Database
    }

    async fn run(&self) -> ProbeResult {
        let target = self.config.summary();
        let start = Instant::now();

        match self.get_message().await {
            Ok(message) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                debug!(probe = "database", latency_ms, "database reachable");
                ProbeResult::reachable("database", self.label(), target, ProbeKind::Database, message)
                    .with_latency(latency_ms)
            }
            Err(e) => {
                warn!(probe = "database", err = %e, "database probe failed");
                ProbeResult::unreachable(
                    "database",
                    self.label(),
                    target,
                    ProbeKind::Database,
                    e.to_string(),
                )
            }
        }
    }
}
