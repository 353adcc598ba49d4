pub mod cache;
pub mod config;
pub mod gateway;
pub mod growth;
pub mod guard;
pub mod log;
pub mod shapes;
pub mod store;
pub mod ui;

use crate::cache::{ResponseCache, SystemClock};
use crate::config::AppConfig;
use crate::gateway::AuraGateway;
use crate::guard::FlightGuard;
use crate::store::{DiskStore, DurableStore};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Project {
        address: Option<String>,
        principal: Option<f64>,
        rate_percent: Option<f64>,
        years: Option<u32>,
    },
    Refresh {
        address: String,
    },
    Cache {
        address: String,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Aura Grow starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let gateway = build_gateway(&config);

    match command {
        AppCommand::Project {
            address,
            principal,
            rate_percent,
            years,
        } => {
            run_project(
                &config,
                &gateway,
                address.as_deref(),
                principal,
                rate_percent,
                years,
            )
            .await
        }
        AppCommand::Refresh { address } => run_refresh(&gateway, &address).await,
        AppCommand::Cache { address } => run_cache_info(&gateway, &address).await,
    }
}

/// Wires the gateway with the shared two-tier cache. A missing data
/// directory degrades the cache to memory-only rather than failing.
fn build_gateway(config: &AppConfig) -> AuraGateway {
    let store = AppConfig::default_data_path()
        .and_then(|path| DiskStore::open(&path.join("cache")).map(Arc::new))
        .map(|store| store as Arc<dyn DurableStore>)
        .map_err(|e| warn!("Durable cache unavailable, continuing in-memory: {e}"))
        .ok();

    let cache = Arc::new(ResponseCache::new(store, Arc::new(SystemClock)));
    AuraGateway::new(config.base_url(), config.api_key.clone(), cache)
}

/// Resolves the principal (remote balance, else manual fallback) and prints
/// the growth projection for it.
async fn run_project(
    config: &AppConfig,
    gateway: &AuraGateway,
    address: Option<&str>,
    principal_override: Option<f64>,
    rate_percent: Option<f64>,
    years: Option<u32>,
) -> Result<()> {
    let rate_percent = rate_percent.unwrap_or(config.defaults.rate_percent);
    let years = years.unwrap_or(config.defaults.years);

    let (principal, source, strategies) = match (principal_override, address) {
        (Some(principal), _) => (principal, "manual", None),
        (None, Some(address)) => {
            let guard = FlightGuard::new();
            if !guard.begin(address) {
                anyhow::bail!("A fetch for {address} is already in flight");
            }

            let spinner = ui::new_spinner(&format!("Fetching balance for {address}..."));
            let quote = gateway.get_principal(address).await;
            guard.finish();
            spinner.finish_and_clear();

            match quote {
                Ok(quote) => {
                    let strategies = gateway.get_strategies(address).await;
                    match quote.principal {
                        Some(principal) => {
                            let source = if quote.cached { "AURA (cached)" } else { "AURA" };
                            (principal, source, Some(strategies))
                        }
                        None => {
                            println!(
                                "{}",
                                ui::style_text(
                                    "Could not read a USD total from the balance response; \
                                     using the configured fallback principal.",
                                    ui::StyleType::Subtle
                                )
                            );
                            (config.defaults.principal, "manual", Some(strategies))
                        }
                    }
                }
                Err(e) => {
                    println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error));
                    println!("Retry, pass --principal, or try another address.");
                    return Err(e.into());
                }
            }
        }
        (None, None) => (config.defaults.principal, "manual", None),
    };

    let series = growth::build_series(principal, rate_percent, years);
    let simple = growth::simple_growth(principal, rate_percent, f64::from(years));
    let compound = growth::compound_growth(principal, rate_percent, f64::from(years));

    println!("{}", ui::style_text("Growth projection", ui::StyleType::Title));
    println!("Source: {source}");
    println!();
    println!(
        "{}",
        ui::kpi_line(principal, rate_percent, years, simple, compound)
    );
    println!();
    println!("{}", ui::projection_table(&series));

    if let Some(strategies) = strategies {
        if !strategies.is_empty() {
            println!();
            println!(
                "{}",
                ui::style_text("Yield strategy suggestions", ui::StyleType::Title)
            );
            println!("{}", ui::strategies_table(&strategies));
        }
    }

    Ok(())
}

/// Explicit cache-busting refresh of both namespaces for an address.
async fn run_refresh(gateway: &AuraGateway, address: &str) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Refreshing {address}..."));
    let outcome = gateway.refetch(address).await;
    spinner.finish_and_clear();

    match outcome.principal {
        Some(principal) => println!(
            "Balance: {}",
            ui::style_text(&format!("{principal:.2} USD"), ui::StyleType::TotalValue)
        ),
        None => println!(
            "{}",
            ui::style_text("No balance available for this address.", ui::StyleType::Error)
        ),
    }

    if outcome.strategies.is_empty() {
        println!("No strategy suggestions.");
    } else {
        println!("{}", ui::strategies_table(&outcome.strategies));
    }

    println!(
        "{}",
        ui::style_text(
            &format!("Refreshed in {} ms", outcome.elapsed_ms),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

async fn run_cache_info(gateway: &AuraGateway, address: &str) -> Result<()> {
    let info = gateway.cache_info(address).await;

    let render = |label: &str, fetched_at: Option<u64>| {
        let when = fetched_at
            .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms as i64))
            .map_or("never".to_string(), |dt| {
                dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
            });
        format!("{label}: last fetched {when}")
    };

    println!("{}", render("Balances", info.balances_fetched_at));
    println!("{}", render("Strategies", info.strategies_fetched_at));
    Ok(())
}
