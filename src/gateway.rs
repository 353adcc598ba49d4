//! AURA portfolio gateway.
//!
//! Translates an opaque wallet address into a USD principal and a set of
//! risk-bucketed yield suggestions, hiding remote shape variability and
//! caching behind a small interface. One network request per cold lookup,
//! no automatic retries; refreshes are user triggered.

use crate::cache::ResponseCache;
use crate::shapes;
use futures::future::join;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://aura.adex.network";

/// Entries kept per risk tier when normalizing strategy suggestions.
const MAX_PER_BUCKET: usize = 3;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("AURA API error: {status} for {endpoint}")]
    Status {
        status: reqwest::StatusCode,
        endpoint: &'static str,
    },
    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    pub apy: Option<f64>,
    pub platforms: Vec<Platform>,
    pub description: Option<String>,
}

/// Yield suggestions grouped by stated risk, in original response order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyBucket {
    pub low: Vec<Strategy>,
    pub moderate: Vec<Strategy>,
    pub high: Vec<Strategy>,
}

impl StrategyBucket {
    pub fn is_empty(&self) -> bool {
        self.low.is_empty() && self.moderate.is_empty() && self.high.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalQuote {
    /// `None` when the response parsed but no known shape matched; callers
    /// fall back to a manually supplied principal.
    pub principal: Option<f64>,
    pub cached: bool,
    pub response_time_ms: u64,
}

#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub principal: Option<f64>,
    pub strategies: StrategyBucket,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct CacheInfo {
    pub balances_fetched_at: Option<u64>,
    pub strategies_fetched_at: Option<u64>,
}

pub struct AuraGateway {
    base_url: String,
    api_key: Option<String>,
    cache: Arc<ResponseCache<Value>>,
}

impl AuraGateway {
    pub fn new(base_url: &str, api_key: Option<String>, cache: Arc<ResponseCache<Value>>) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key,
            cache,
        }
    }

    fn credential(&self) -> &str {
        self.api_key.as_deref().unwrap_or("")
    }

    fn balances_key(&self, address: &str) -> String {
        format!("balances:{address}:{}", self.credential())
    }

    fn strategies_key(&self, address: &str) -> String {
        format!("strategies:{address}:{}", self.credential())
    }

    async fn fetch_endpoint(
        &self,
        endpoint: &'static str,
        address: &str,
    ) -> Result<Value, FetchError> {
        let url = format!("{}/api/portfolio/{endpoint}", self.base_url);
        debug!("Requesting {endpoint} from {url}");

        let mut query = vec![("address", address.to_string())];
        if let Some(api_key) = &self.api_key {
            query.push(("apiKey", api_key.clone()));
        }

        let client = reqwest::Client::builder()
            .user_agent("auragrow/0.1")
            .build()?;
        let response = client.get(&url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status, endpoint });
        }

        Ok(response.json::<Value>().await?)
    }

    #[instrument(name = "AuraBalancesFetch", skip(self), fields(address = %address))]
    pub async fn fetch_balances(&self, address: &str) -> Result<Value, FetchError> {
        self.fetch_endpoint("balances", address).await
    }

    #[instrument(name = "AuraStrategiesFetch", skip(self), fields(address = %address))]
    pub async fn fetch_strategies(&self, address: &str) -> Result<Value, FetchError> {
        self.fetch_endpoint("strategies", address).await
    }

    /// Resolves the wallet's USD principal, consulting the cache first. A
    /// network failure propagates unmodified; a response with no recognized
    /// shape yields `principal: None`.
    pub async fn get_principal(&self, address: &str) -> Result<PrincipalQuote, FetchError> {
        let key = self.balances_key(address);

        if let Some(cached) = self.cache.get(&key).await {
            let principal = shapes::extract_total_usd(&cached);
            info!(
                address,
                cached = true,
                response_time_ms = 0u64,
                principal_usd = ?principal,
                "Resolved principal"
            );
            return Ok(PrincipalQuote {
                principal,
                cached: true,
                response_time_ms: 0,
            });
        }

        let started = Instant::now();
        let data = self.fetch_balances(address).await?;
        let response_time_ms = started.elapsed().as_millis() as u64;

        self.cache.set(&key, data.clone()).await;
        let principal = shapes::extract_total_usd(&data);
        info!(
            address,
            cached = false,
            response_time_ms,
            principal_usd = ?principal,
            "Resolved principal"
        );

        Ok(PrincipalQuote {
            principal,
            cached: false,
            response_time_ms,
        })
    }

    /// Best-effort strategy suggestions. Every failure degrades to an empty
    /// bucket; this never blocks the principal flow.
    pub async fn get_strategies(&self, address: &str) -> StrategyBucket {
        let key = self.strategies_key(address);

        if let Some(cached) = self.cache.get(&key).await {
            return normalize_strategies(&cached);
        }

        match self.fetch_strategies(address).await {
            Ok(data) => {
                self.cache.set(&key, data.clone()).await;
                normalize_strategies(&data)
            }
            Err(e) => {
                debug!("Strategy fetch failed for {address}: {e}");
                StrategyBucket::default()
            }
        }
    }

    /// User-triggered refresh: drops both cache namespaces for the address,
    /// then re-runs principal and strategies concurrently. Never fails; a
    /// failing endpoint maps to the empty/`None` fallback for its field.
    pub async fn refetch(&self, address: &str) -> RefreshOutcome {
        let started = Instant::now();
        self.cache.invalidate(&self.balances_key(address)).await;
        self.cache.invalidate(&self.strategies_key(address)).await;

        let (quote, strategies) = join(self.get_principal(address), self.get_strategies(address)).await;
        let principal = match quote {
            Ok(quote) => quote.principal,
            Err(e) => {
                warn!("Refresh balance fetch failed for {address}: {e}");
                None
            }
        };

        RefreshOutcome {
            principal,
            strategies,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// Last-fetched timestamps for both cache namespaces.
    pub async fn cache_info(&self, address: &str) -> CacheInfo {
        CacheInfo {
            balances_fetched_at: self.cache.timestamp(&self.balances_key(address)).await,
            strategies_fetched_at: self.cache.timestamp(&self.strategies_key(address)).await,
        }
    }
}

/// Normalizes a `strategies[0].response[]` recommendation list into risk
/// buckets. `high` and `opportunistic` tiers merge; unknown tiers drop; at
/// most [`MAX_PER_BUCKET`] entries per tier in response order. Per-strategy
/// details come from the entry's first action.
fn normalize_strategies(data: &Value) -> StrategyBucket {
    let mut bucket = StrategyBucket::default();
    let Some(entries) = data
        .pointer("/strategies/0/response")
        .and_then(Value::as_array)
    else {
        return bucket;
    };

    for entry in entries {
        let Some(name) = entry.get("name").and_then(Value::as_str) else {
            continue;
        };
        let risk = entry
            .get("risk")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_ascii_lowercase();

        let tier = match risk.as_str() {
            "low" => &mut bucket.low,
            "moderate" => &mut bucket.moderate,
            "high" | "opportunistic" => &mut bucket.high,
            _ => continue,
        };
        if tier.len() >= MAX_PER_BUCKET {
            continue;
        }

        let action = entry.pointer("/actions/0");
        tier.push(Strategy {
            name: name.to_string(),
            apy: action.and_then(|a| a.get("apy")).and_then(Value::as_f64),
            platforms: action
                .and_then(|a| a.get("platforms"))
                .and_then(Value::as_array)
                .map(|platforms| {
                    platforms
                        .iter()
                        .map(|p| Platform {
                            name: p.get("name").and_then(Value::as_str).map(str::to_string),
                            url: p.get("url").and_then(Value::as_str).map(str::to_string),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            description: action
                .and_then(|a| a.get("description"))
                .and_then(Value::as_str)
                .map(str::to_string),
        });
    }

    bucket
}
