//! Best-effort reachability check run before every redirect

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

/// Decides whether a target URL currently answers successfully
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn is_reachable(&self, url: &str) -> bool;
}

/// Probe that issues a `GET` to the target with a bounded timeout
///
/// Redirects are followed. A final 4xx/5xx status, a timeout, a DNS failure
/// or a refused connection all count as unreachable.
#[derive(Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LivenessProbe for HttpProbe {
    async fn is_reachable(&self, url: &str) -> bool {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("liveness probe to \"{}\" failed: {}", url, err);
                return false;
            }
        };

        let status = response.status();
        match response.error_for_status() {
            Ok(_) => {
                debug!("liveness probe to \"{}\" answered {}", url, status);
                true
            }
            Err(_) => {
                warn!("liveness probe to \"{}\" answered {}", url, status);
                false
            }
        }
    }
}
