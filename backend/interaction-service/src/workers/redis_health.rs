//! Vote buffer health check background job.
//!
//! Periodically pings the buffer to keep connections alive and detect
//! stale connections before they cause broken-pipe errors during actual
//! vote traffic.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::services::vote_buffer::VoteBuffer;

/// How often to ping the buffer (every 60 seconds)
const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for buffer health checks
#[derive(Clone)]
pub struct BufferHealthConfig {
    pub enabled: bool,
    pub check_interval: Duration,
}

impl Default for BufferHealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval: HEALTH_CHECK_INTERVAL,
        }
    }
}

/// Start the buffer health check background job
pub async fn start_buffer_health_check(buffer: Arc<dyn VoteBuffer>, config: BufferHealthConfig) {
    if !config.enabled {
        tracing::info!("Buffer health check disabled by configuration");
        return;
    }

    tracing::info!(
        interval_secs = config.check_interval.as_secs(),
        "Starting vote buffer health check background job"
    );

    // Initial delay to let services start up
    sleep(Duration::from_secs(10)).await;

    let mut consecutive_failures = 0;
    let max_consecutive_failures = 5;

    loop {
        match buffer.ping().await {
            Ok(()) => {
                if consecutive_failures > 0 {
                    tracing::info!(
                        previous_failures = consecutive_failures,
                        "Vote buffer connection recovered"
                    );
                }
                consecutive_failures = 0;
                tracing::debug!("Vote buffer health check: OK");
            }
            Err(e) => {
                consecutive_failures += 1;
                if consecutive_failures >= max_consecutive_failures {
                    tracing::error!(
                        consecutive_failures,
                        error = %e,
                        "Vote buffer health check: CRITICAL - multiple consecutive failures"
                    );
                } else {
                    tracing::warn!(
                        consecutive_failures,
                        error = %e,
                        "Vote buffer health check: FAILED"
                    );
                }
            }
        }

        sleep(config.check_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BufferHealthConfig::default();
        assert!(config.enabled);
        assert_eq!(config.check_interval, Duration::from_secs(60));
    }
}
