use crate::{
    error::{ScoringError, ScoringResult},
    types::{Days, Money},
};
use serde::{Deserialize, Serialize};

// ── Churn score ────────────────────────────────────────────────────

/// Points added for days since the last order. Each tier applies when
/// the gap is strictly greater than its threshold; the highest
/// matching tier wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecencyPenalties {
    pub mild_after_days: Days,
    pub mild_points: i32,
    pub moderate_after_days: Days,
    pub moderate_points: i32,
    pub severe_after_days: Days,
    pub severe_points: i32,
}

impl Default for RecencyPenalties {
    fn default() -> Self {
        Self {
            mild_after_days: 30,
            mild_points: 10,
            moderate_after_days: 60,
            moderate_points: 25,
            severe_after_days: 90,
            severe_points: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderHistoryPenalties {
    pub single_order_points: i32,
    pub two_order_points: i32,
}

impl Default for OrderHistoryPenalties {
    fn default() -> Self {
        Self {
            single_order_points: 30,
            two_order_points: 15,
        }
    }
}

/// Average-order-value adjustment. `high_aov_points` is normally
/// negative: big baskets reduce churn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpendAdjustment {
    pub low_aov_below: Money,
    pub low_aov_points: i32,
    pub high_aov_above: Money,
    pub high_aov_points: i32,
}

impl Default for SpendAdjustment {
    fn default() -> Self {
        Self {
            low_aov_below: 50.0,
            low_aov_points: 15,
            high_aov_above: 150.0,
            high_aov_points: -10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskTierThresholds {
    /// Scores at or above this are medium risk.
    pub medium_from: u8,
    /// Scores at or above this are high risk.
    pub high_from: u8,
}

impl Default for RiskTierThresholds {
    fn default() -> Self {
        Self { medium_from: 30, high_from: 60 }
    }
}

// ── Projection ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Repeat customers' orders are assumed spread evenly over this window.
    pub trailing_window_days: f64,
    /// Expected reorder cadence for single-order customers.
    pub single_order_cadence_days: f64,
    pub horizon_months: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            trailing_window_days: 365.0,
            single_order_cadence_days: 90.0,
            horizon_months: 12.0,
        }
    }
}

// ── Recommendations ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    pub bundle_aov_below: Money,
    pub vip_upgrade_spent_above: Money,
    pub reengage_after_days: Days,
    /// Re-engagement needs strictly more orders than this.
    pub reengage_orders_above: u32,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            bundle_aov_below: 100.0,
            vip_upgrade_spent_above: 500.0,
            reengage_after_days: 60,
            reengage_orders_above: 1,
        }
    }
}

// ── Segments ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentThresholds {
    pub vip_min_spent: Money,
    pub vip_min_orders: u32,
    pub loyal_min_orders: u32,
    pub loyal_within_days: Days,
    pub new_within_days: Days,
    pub at_risk_from_days: Days,
    pub dormant_from_days: Days,
}

impl Default for SegmentThresholds {
    fn default() -> Self {
        Self {
            vip_min_spent: 500.0,
            vip_min_orders: 5,
            loyal_min_orders: 3,
            loyal_within_days: 60,
            new_within_days: 30,
            at_risk_from_days: 30,
            dormant_from_days: 90,
        }
    }
}

// ── Top level ──────────────────────────────────────────────────────

/// Every business heuristic the engine uses. `Default` reproduces the
/// production rule set exactly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub recency: RecencyPenalties,
    pub order_history: OrderHistoryPenalties,
    pub spend: SpendAdjustment,
    pub risk_tiers: RiskTierThresholds,
    pub projection: ProjectionConfig,
    pub recommendations: RecommendationThresholds,
    pub segments: SegmentThresholds,
}

impl ScoringConfig {
    /// Load from a JSON file. Missing sections and fields fall back to
    /// the defaults, so a file only needs to name what it overrides.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: ScoringConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        log::info!("loaded scoring config from {path}");
        Ok(config)
    }

    pub fn validate(&self) -> ScoringResult<()> {
        let r = &self.recency;
        if !(0 <= r.mild_after_days
            && r.mild_after_days < r.moderate_after_days
            && r.moderate_after_days < r.severe_after_days)
        {
            return Err(invalid("recency thresholds must be non-negative and strictly increasing"));
        }
        if !(0 <= r.mild_points && r.mild_points <= r.moderate_points && r.moderate_points <= r.severe_points) {
            return Err(invalid("recency points must be non-negative and non-decreasing"));
        }

        let s = &self.spend;
        if !(s.low_aov_below.is_finite() && s.high_aov_above.is_finite()) || s.low_aov_below > s.high_aov_above {
            return Err(invalid("spend thresholds must be finite with low <= high"));
        }

        let t = &self.risk_tiers;
        if !(0 < t.medium_from && t.medium_from <= t.high_from && t.high_from <= 100) {
            return Err(invalid("risk tiers must satisfy 0 < medium <= high <= 100"));
        }

        let p = &self.projection;
        for (name, value) in [
            ("trailing_window_days", p.trailing_window_days),
            ("single_order_cadence_days", p.single_order_cadence_days),
            ("horizon_months", p.horizon_months),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("projection.{name} must be positive, got {value}")));
            }
        }

        let g = &self.segments;
        if g.at_risk_from_days > g.dormant_from_days {
            return Err(invalid("segments.at_risk_from_days must not exceed dormant_from_days"));
        }

        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ScoringError {
    ScoringError::InvalidConfig { reason: reason.into() }
}
