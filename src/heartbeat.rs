use anyhow::{bail, Context, Result};
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Free-tier hosts idle a service after 15 minutes without traffic
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(14 * 60);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A validated HTTPS address to ping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatTarget(Url);

impl HeartbeatTarget {
    /// Parse and validate the target address
    ///
    /// # Errors
    /// Returns an error if the address is not a valid URL or does not use https
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).with_context(|| format!("Invalid heartbeat URL '{}'", raw))?;
        if url.scheme() != "https" {
            bail!("Heartbeat URL must start with https://, got '{}'", raw);
        }
        Ok(Self(url))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

/// Periodic self-ping keeping the public deployment awake
pub struct Heartbeat {
    client: Client,
    target: HeartbeatTarget,
    period: Duration,
}

impl Heartbeat {
    pub fn new(target: HeartbeatTarget) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build heartbeat HTTP client")?;

        Ok(Self {
            client,
            target,
            period: HEARTBEAT_INTERVAL,
        })
    }

    #[cfg(test)]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Issue one GET, drain the body and report the status code
    pub async fn ping_once(&self) -> Result<StatusCode> {
        let response = self
            .client
            .get(self.target.url().clone())
            .send()
            .await
            .with_context(|| format!("Ping to {} failed", self.target.url()))?;

        let status = response.status();
        // Body content is irrelevant; only drain it so the connection can be reused
        if let Err(e) = response.bytes().await {
            tracing::debug!("Failed to drain ping response body: {}", e);
        }
        Ok(status)
    }

    /// Start the ping loop on the runtime
    ///
    /// The first ping fires immediately, then once per period. Failed pings
    /// are logged and never stop the loop; only [`HeartbeatHandle::stop`] does.
    pub fn spawn(self) -> HeartbeatHandle {
        let token = CancellationToken::new();
        let shutdown = token.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                "Heartbeat started: pinging {} every {:?}",
                self.target.url(),
                self.period
            );

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    result = self.ping_once() => match result {
                        Ok(status) => tracing::info!("Ping -> status {}", status.as_u16()),
                        Err(e) => tracing::warn!("Ping error: {:#}", e),
                    },
                }
            }

            tracing::info!("Heartbeat stopped");
        });

        HeartbeatHandle { token, task }
    }
}

/// Stop hook for a running heartbeat
pub struct HeartbeatHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl HeartbeatHandle {
    /// Cancel the loop, including an in-flight ping, and wait for it to exit
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!("Heartbeat task ended abnormally: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on port 1, so connections are refused immediately
    const UNREACHABLE: &str = "https://127.0.0.1:1/";

    #[test]
    fn test_target_requires_https() {
        let err = HeartbeatTarget::parse("http://visa-pizzaria-backend.onrender.com").unwrap_err();
        assert!(err.to_string().contains("https://"));

        assert!(HeartbeatTarget::parse("ftp://example.com").is_err());
        assert!(HeartbeatTarget::parse("not a url").is_err());
    }

    #[test]
    fn test_target_accepts_https() {
        let target = HeartbeatTarget::parse(crate::config::DEFAULT_HEARTBEAT_URL).unwrap();
        assert_eq!(target.url().scheme(), "https");
        assert_eq!(target.url().host_str(), Some("visa-pizzaria-backend.onrender.com"));
    }

    #[tokio::test]
    async fn test_failed_ping_is_an_error() {
        let heartbeat = Heartbeat::new(HeartbeatTarget::parse(UNREACHABLE).unwrap()).unwrap();
        assert!(heartbeat.ping_once().await.is_err());
    }

    #[tokio::test]
    async fn test_loop_survives_failures_and_stops() {
        let heartbeat = Heartbeat::new(HeartbeatTarget::parse(UNREACHABLE).unwrap())
            .unwrap()
            .with_period(Duration::from_millis(10));

        let handle = heartbeat.spawn();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!handle.task.is_finished());

        tokio::time::timeout(Duration::from_secs(5), handle.stop())
            .await
            .expect("heartbeat did not stop");
    }
}
