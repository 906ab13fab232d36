// Copyright 2025 QueryBench Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP client side of the ClickHouse gateway.

use super::metrics::{ServerCounters, SUMMARY_HEADER};
use super::{ClickHouseConfig, ClickHouseError, Result};
use async_trait::async_trait;
use querybench_core::{classify, ExecutionGateway, QueryOutcome, RawError};
use reqwest::header::HeaderMap;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

const EXCEPTION_CODE_HEADER: &str = "X-ClickHouse-Exception-Code";

const CACHE_DROP_STATEMENTS: [&str; 2] = [
    "SYSTEM DROP MARK CACHE",
    "SYSTEM DROP UNCOMPRESSED CACHE",
];

/// Executes benchmark queries against ClickHouse over HTTP(S).
pub struct ClickHouseGateway {
    config: ClickHouseConfig,
    client: reqwest::Client,
    base_url: String,
}

impl ClickHouseGateway {
    /// Build a gateway without contacting the server.
    pub fn new(config: ClickHouseConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.query_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        let base_url = config.base_url();

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    /// Build a gateway and verify connectivity with `SELECT 1`.
    pub async fn connect(config: ClickHouseConfig) -> Result<Self> {
        let gateway = Self::new(config)?;
        gateway.ping().await?;
        info!(
            url = %gateway.base_url,
            database = %gateway.config.database,
            "Connected to ClickHouse"
        );
        Ok(gateway)
    }

    /// Check that the server answers queries.
    pub async fn ping(&self) -> Result<()> {
        let body = self.statement("SELECT 1").await?;
        if body.trim() != "1" {
            return Err(ClickHouseError::Response(format!(
                "unexpected ping response: {}",
                body.trim()
            )));
        }
        Ok(())
    }

    /// The settings this gateway was built with.
    pub fn config(&self) -> &ClickHouseConfig {
        &self.config
    }

    /// Run a statement outside of measurement and return the response body.
    pub async fn statement(&self, sql: &str) -> Result<String> {
        self.send(sql, &request_params(None, None, None))
            .await
            .map(|(_, body)| body)
            .map_err(|raw| classify(&raw).into())
    }

    /// Run a `FORMAT JSONEachRow` query and decode every row.
    pub(crate) async fn json_rows<T>(&self, sql: &str) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let body = self.statement(sql).await?;
        body.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|e| ClickHouseError::Response(format!("{}: {}", e, line)))
            })
            .collect()
    }

    async fn send(
        &self,
        sql: &str,
        params: &[(&'static str, String)],
    ) -> std::result::Result<(HeaderMap, String), RawError> {
        let response = self
            .client
            .post(&self.base_url)
            .query(params)
            .header("X-ClickHouse-User", &self.config.user)
            .header("X-ClickHouse-Key", &self.config.password)
            .header("X-ClickHouse-Database", &self.config.database)
            .body(sql.to_string())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let code = exception_code(&headers);
            let message = body.trim();
            let message = if message.is_empty() {
                format!("HTTP {}", status)
            } else {
                message.to_string()
            };
            return Err(RawError::backend(code, message));
        }

        Ok((headers, body))
    }

    async fn drop_caches(&self) {
        for statement in CACHE_DROP_STATEMENTS {
            if let Err(e) = self.statement(statement).await {
                warn!(statement, error = %e, "Failed to drop cache, continuing");
            }
        }
    }

    /// Read final counters for `query_id` from `system.query_log`.
    async fn query_log_counters(&self, query_id: &str) -> Option<ServerCounters> {
        let sql = query_log_sql(query_id);
        let attempts = self.config.stats_attempts;

        for attempt in 1..=attempts {
            if let Err(e) = self.statement("SYSTEM FLUSH LOGS").await {
                debug!(error = %e, "SYSTEM FLUSH LOGS failed");
            }

            match self.statement(&sql).await {
                Ok(body) => {
                    if let Some(counters) = ServerCounters::from_json_each_row(&body) {
                        return Some(counters);
                    }
                    debug!(query_id, attempt, "Query log entry not available yet");
                }
                Err(e) => {
                    warn!(query_id, attempt, error = %e, "Failed to read query log");
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.config.stats_retry_delay(attempt)).await;
            }
        }

        None
    }
}

#[async_trait]
impl ExecutionGateway for ClickHouseGateway {
    fn backend_name(&self) -> &str {
        "ClickHouse"
    }

    async fn execute(&self, query: &str, memory_limit_bytes: Option<u64>) -> QueryOutcome {
        if self.config.drop_caches {
            self.drop_caches().await;
        }

        let query_id = Uuid::new_v4().to_string();
        let params = request_params(
            Some(&query_id),
            memory_limit_bytes,
            self.config.max_execution_time,
        );

        let started = Instant::now();
        let result = self.send(query, &params).await;
        let elapsed = started.elapsed();

        let (headers, body) = match result {
            Ok(response) => response,
            Err(raw) => {
                let failure = classify(&raw);
                warn!(
                    query_id = %query_id,
                    kind = %failure.error_kind,
                    code = ?raw.code(),
                    "Query failed"
                );
                return failure.into();
            }
        };

        let mut counters = headers
            .get(SUMMARY_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(ServerCounters::from_summary_header)
            .unwrap_or_default();

        match self.query_log_counters(&query_id).await {
            Some(logged) => counters.merge(&logged),
            None => warn!(
                query_id = %query_id,
                "Query log statistics unavailable, using response summary with zero memory"
            ),
        }

        let sample = counters.to_sample(elapsed, &body);
        debug!(
            query_id = %query_id,
            elapsed_seconds = sample.elapsed_seconds,
            memory_bytes = sample.memory_bytes,
            rows_read = sample.rows_read,
            "Query finished"
        );
        sample.into()
    }
}

fn transport_error(err: reqwest::Error) -> RawError {
    RawError::transport(err.to_string(), err.is_timeout())
}

fn exception_code(headers: &HeaderMap) -> Option<i32> {
    headers
        .get(EXCEPTION_CODE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// URL parameters for one request.
fn request_params(
    query_id: Option<&str>,
    memory_limit_bytes: Option<u64>,
    max_execution_time: Option<u64>,
) -> Vec<(&'static str, String)> {
    let mut params = vec![("wait_end_of_query", "1".to_string())];
    if let Some(id) = query_id {
        params.push(("query_id", id.to_string()));
    }
    if let Some(limit) = memory_limit_bytes {
        params.push(("max_memory_usage", limit.to_string()));
    }
    if let Some(seconds) = max_execution_time {
        params.push(("max_execution_time", seconds.to_string()));
    }
    params
}

fn query_log_sql(query_id: &str) -> String {
    format!(
        "SELECT memory_usage, read_rows, read_bytes, written_rows, written_bytes, \
         result_rows, result_bytes \
         FROM system.query_log \
         WHERE query_id = {} AND type = 'QueryFinish' \
         ORDER BY event_time DESC LIMIT 1 \
         FORMAT JSONEachRow",
        super::tables::quote(query_id)
    )
}
