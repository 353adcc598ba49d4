//! Terminal rendering helpers for projections and strategy suggestions.

use crate::gateway::{Strategy, StrategyBucket};
use crate::growth::GrowthPoint;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn usd_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right)
}

/// Spinner shown while a network fetch is in flight.
pub fn new_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Renders the year-by-year growth series. Long horizons are thinned to
/// every `step`-th year so the table stays readable; the final year always
/// shows.
pub fn projection_table(series: &[GrowthPoint]) -> String {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Year"),
        header_cell("Simple (USD)"),
        header_cell("Compound (USD)"),
        header_cell("Uplift (USD)"),
    ]);

    let step = if series.len() > 21 { 5 } else { 1 };
    let last = series.len().saturating_sub(1);
    for (i, point) in series.iter().enumerate() {
        if i % step != 0 && i != last {
            continue;
        }
        table.add_row(vec![
            Cell::new(point.year).set_alignment(CellAlignment::Right),
            usd_cell(point.simple),
            usd_cell(point.compound),
            usd_cell(point.compound - point.simple),
        ]);
    }

    table.to_string()
}

/// One-line summary of the projection endpoints.
pub fn kpi_line(principal: f64, rate_percent: f64, years: u32, simple: f64, compound: f64) -> String {
    let advantage_pct = if simple > 0.0 {
        (compound / simple - 1.0) * 100.0
    } else {
        0.0
    };
    format!(
        "{} {principal:.2} USD at {rate_percent:.1}% over {years} years: \
         simple {simple:.2} USD, compound {} ({} ahead)",
        style_text("Principal", StyleType::TotalLabel),
        style_text(&format!("{compound:.2} USD"), StyleType::TotalValue),
        style_text(&format!("{advantage_pct:.1}%"), StyleType::Subtle),
    )
}

fn strategy_rows(table: &mut Table, tier: &str, strategies: &[Strategy]) {
    for strategy in strategies {
        let apy = strategy
            .apy
            .map_or("N/A".to_string(), |apy| format!("{apy:.1}%"));
        let platforms = strategy
            .platforms
            .iter()
            .filter_map(|p| p.name.as_deref())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(tier),
            Cell::new(&strategy.name),
            Cell::new(apy).set_alignment(CellAlignment::Right),
            Cell::new(platforms),
            Cell::new(strategy.description.as_deref().unwrap_or("")),
        ]);
    }
}

/// Renders strategy suggestions grouped by risk tier. Empty buckets render
/// nothing; callers skip the section entirely.
pub fn strategies_table(bucket: &StrategyBucket) -> String {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Risk"),
        header_cell("Strategy"),
        header_cell("APY"),
        header_cell("Platforms"),
        header_cell("Notes"),
    ]);

    strategy_rows(&mut table, "low", &bucket.low);
    strategy_rows(&mut table, "moderate", &bucket.moderate);
    strategy_rows(&mut table, "high", &bucket.high);

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Platform;
    use crate::growth::build_series;

    #[test]
    fn test_projection_table_thins_long_series() {
        let series = build_series(1000.0, 11.0, 30);
        let rendered = projection_table(&series);
        // Sampled years plus the final one.
        assert!(rendered.contains("22892.30"));
        assert!(rendered.contains("4300.00"));
        // Year 1 is thinned out at a 5-year step.
        assert!(!rendered.contains("1110.00"));
    }

    #[test]
    fn test_projection_table_short_series_is_complete() {
        let series = build_series(100.0, 10.0, 3);
        let rendered = projection_table(&series);
        assert!(rendered.contains("110.00"));
        assert!(rendered.contains("121.00"));
        assert!(rendered.contains("133.10"));
    }

    #[test]
    fn test_strategies_table_lists_all_tiers() {
        let bucket = StrategyBucket {
            low: vec![Strategy {
                name: "Stable LP".to_string(),
                apy: Some(4.2),
                platforms: vec![Platform {
                    name: Some("Aave".to_string()),
                    url: None,
                }],
                description: Some("Stablecoin lending".to_string()),
            }],
            moderate: vec![],
            high: vec![Strategy {
                name: "Leverage farm".to_string(),
                apy: None,
                platforms: vec![],
                description: None,
            }],
        };

        let rendered = strategies_table(&bucket);
        assert!(rendered.contains("Stable LP"));
        assert!(rendered.contains("4.2%"));
        assert!(rendered.contains("Aave"));
        assert!(rendered.contains("Leverage farm"));
        assert!(rendered.contains("N/A"));
    }

    #[test]
    fn test_kpi_line_mentions_all_figures() {
        let line = kpi_line(1000.0, 11.0, 30, 4300.0, 22892.30);
        assert!(line.contains("1000.00 USD"));
        assert!(line.contains("4300.00 USD"));
        assert!(line.contains("22892.30 USD"));
    }
}
