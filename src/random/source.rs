use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::RandomSourceError;

pub const RANDOM_ORG_URL: &str =
    "https://www.random.org/decimal-fractions/?num=1&dec=2&col=1&format=plain&rnd=new";

/// Supplies the random draw that perturbs a battle
#[async_trait]
pub trait RandomSource: Send + Sync {
    /// A fraction in [0, 1)
    async fn random_fraction(&self) -> Result<f64, RandomSourceError>;
}

/// Parses a plain-text fraction body, surrounding whitespace allowed.
pub fn parse_fraction(body: &str) -> Result<f64, RandomSourceError> {
    let trimmed = body.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| RandomSourceError::MalformedResponse(trimmed.to_string()))?;

    if !(0.0..1.0).contains(&value) {
        return Err(RandomSourceError::MalformedResponse(trimmed.to_string()));
    }

    Ok(value)
}

/// Fetches decimal fractions from random.org over HTTP
pub struct RandomOrgSource {
    url: String,
    http_client: reqwest::Client,
}

impl RandomOrgSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, RandomSourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RandomSourceError::SourceUnavailable(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            http_client,
        })
    }
}

#[async_trait]
impl RandomSource for RandomOrgSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn random_fraction(&self) -> Result<f64, RandomSourceError> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!(error = %e, "Random fraction request failed");
                RandomSourceError::SourceUnavailable(e.to_string())
            })?;

        let body = response.text().await.map_err(|e| {
            warn!(error = %e, "Random fraction body could not be read");
            RandomSourceError::SourceUnavailable(e.to_string())
        })?;

        let value = parse_fraction(&body)?;
        debug!(value, "Received random fraction");
        Ok(value)
    }
}

/// Draws fractions from a local PRNG, for offline runs
pub struct LocalRandomSource {
    rng: Mutex<StdRng>,
}

impl LocalRandomSource {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible sequence of draws for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for LocalRandomSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RandomSource for LocalRandomSource {
    async fn random_fraction(&self) -> Result<f64, RandomSourceError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| RandomSourceError::SourceUnavailable("rng lock poisoned".to_string()))?;
        Ok(rng.random::<f64>())
    }
}
