//! Shape extraction for heterogeneous balance responses.
//!
//! The AURA balance endpoint has shipped several payload shapes over time.
//! Rather than sniffing fields inline, each known shape is a tagged rule and
//! the rules are tried in priority order; supporting a new provider shape is
//! a data change here, not new control flow in the gateway.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeRule {
    /// A direct numeric `total.usd`, `totalUsd` or `usdTotal` field.
    DirectTotal,
    /// `portfolio[]` of networks, each with `tokens[].balanceUSD`.
    PortfolioTokens,
    /// Legacy `assets[]` with `usdValue` / `usd` / `valueUsd` per asset.
    LegacyAssets,
}

/// Priority order: the first rule yielding a positive number wins.
pub const EXTRACTION_RULES: [ShapeRule; 3] = [
    ShapeRule::DirectTotal,
    ShapeRule::PortfolioTokens,
    ShapeRule::LegacyAssets,
];

impl ShapeRule {
    fn apply(&self, data: &Value) -> Option<f64> {
        match self {
            ShapeRule::DirectTotal => data
                .pointer("/total/usd")
                .or_else(|| data.get("totalUsd"))
                .or_else(|| data.get("usdTotal"))
                .and_then(Value::as_f64),
            ShapeRule::PortfolioTokens => {
                let networks = data.get("portfolio")?.as_array()?;
                let total = networks
                    .iter()
                    .filter_map(|network| network.get("tokens")?.as_array())
                    .flatten()
                    .filter_map(|token| token.get("balanceUSD")?.as_f64())
                    .sum();
                Some(total)
            }
            ShapeRule::LegacyAssets => {
                let assets = data.get("assets")?.as_array()?;
                let total = assets
                    .iter()
                    .filter_map(|asset| {
                        asset
                            .get("usdValue")
                            .or_else(|| asset.get("usd"))
                            .or_else(|| asset.get("valueUsd"))
                            .and_then(Value::as_f64)
                    })
                    .sum();
                Some(total)
            }
        }
    }
}

/// Total USD value of a balance response, or `None` when no known shape
/// yields a positive total. Absence is not an error; callers fall back to a
/// manually supplied principal.
pub fn extract_total_usd(data: &Value) -> Option<f64> {
    EXTRACTION_RULES
        .iter()
        .find_map(|rule| rule.apply(data).filter(|v| v.is_finite() && *v > 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_total_usd_field() {
        assert_eq!(extract_total_usd(&json!({"totalUsd": 500})), Some(500.0));
        assert_eq!(
            extract_total_usd(&json!({"total": {"usd": 1234.5}})),
            Some(1234.5)
        );
        assert_eq!(extract_total_usd(&json!({"usdTotal": 42.0})), Some(42.0));
    }

    #[test]
    fn test_portfolio_tokens_are_summed_across_networks() {
        let data = json!({
            "portfolio": [
                {"tokens": [{"balanceUSD": 100}, {"balanceUSD": 50}]},
                {"tokens": [{"balanceUSD": 25}]}
            ]
        });
        assert_eq!(extract_total_usd(&data), Some(175.0));
    }

    #[test]
    fn test_legacy_assets_mixed_field_names() {
        let data = json!({
            "assets": [
                {"usdValue": 10.0},
                {"usd": 20.0},
                {"valueUsd": 30.0},
                {"symbol": "ETH"}
            ]
        });
        assert_eq!(extract_total_usd(&data), Some(60.0));
    }

    #[test]
    fn test_direct_total_wins_over_portfolio() {
        let data = json!({
            "totalUsd": 999.0,
            "portfolio": [{"tokens": [{"balanceUSD": 1.0}]}]
        });
        assert_eq!(extract_total_usd(&data), Some(999.0));
    }

    #[test]
    fn test_zero_total_falls_through_to_next_rule() {
        let data = json!({
            "totalUsd": 0,
            "assets": [{"usdValue": 75.0}]
        });
        assert_eq!(extract_total_usd(&data), Some(75.0));
    }

    #[test]
    fn test_unrecognized_shapes_are_absent() {
        assert_eq!(extract_total_usd(&json!({})), None);
        assert_eq!(extract_total_usd(&json!(null)), None);
        assert_eq!(extract_total_usd(&json!({"totalUsd": "500"})), None);
        assert_eq!(extract_total_usd(&json!({"portfolio": []})), None);
        assert_eq!(extract_total_usd(&json!({"assets": [{"units": 3}]})), None);
    }
}
