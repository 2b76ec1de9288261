use anyhow::{Result, bail};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
}

async fn probe(client: &reqwest::Client, url: &str) -> Result<()> {
    let body: HealthBody = client
        .get(url)
        .timeout(Duration::from_secs(5))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    if body.status != "ok" {
        bail!("unexpected health status {:?}", body.status);
    }
    Ok(())
}

/// Poll `GET {base_url}/health` until it reports ok or `retries` attempts fail.
pub(crate) async fn wait_for_health(base_url: &str, retries: u32, interval: Duration) -> Result<()> {
    let url = format!("{}/health", base_url.trim_end_matches('/'));
    let client = reqwest::Client::builder().build()?;

    for attempt in 1..=retries.max(1) {
        match probe(&client, &url).await {
            Ok(()) => {
                info!(attempt, "server is ready");
                return Ok(());
            }
            Err(e) => {
                debug!(attempt, "health probe failed: {e}");
                if attempt < retries {
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }

    bail!("{url} did not report healthy after {retries} attempts")
}
