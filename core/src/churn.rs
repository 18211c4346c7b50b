//! Churn scoring — additive point system over recency, order history
//! and basket size.
//!
//! Contributions are computed independently in a fixed order, summed,
//! and only then clamped to [0, 100].

use crate::{
    aggregate::CustomerAggregate,
    config::{OrderHistoryPenalties, RecencyPenalties, RiskTierThresholds, ScoringConfig, SpendAdjustment},
    types::{Days, Money},
};
use serde::{Deserialize, Serialize};

pub const MAX_CHURN_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChurnRisk {
    Low,
    Medium,
    High,
}

impl ChurnRisk {
    pub fn from_score(score: u8, tiers: &RiskTierThresholds) -> Self {
        if score >= tiers.high_from {
            ChurnRisk::High
        } else if score >= tiers.medium_from {
            ChurnRisk::Medium
        } else {
            ChurnRisk::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChurnRisk::Low    => "low",
            ChurnRisk::Medium => "medium",
            ChurnRisk::High   => "high",
        }
    }
}

impl std::fmt::Display for ChurnRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Every contribution to a churn score, kept so a score can be audited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnBreakdown {
    pub recency_penalty:     i32,
    pub order_count_penalty: i32,
    pub spend_adjustment:    i32,
    /// Sum before clamping. May fall outside [0, 100].
    pub raw_total:           i32,
    pub score:               u8,
}

pub fn recency_penalty(days_since_last_order: Days, cfg: &RecencyPenalties) -> i32 {
    if days_since_last_order > cfg.severe_after_days {
        cfg.severe_points
    } else if days_since_last_order > cfg.moderate_after_days {
        cfg.moderate_points
    } else if days_since_last_order > cfg.mild_after_days {
        cfg.mild_points
    } else {
        0
    }
}

pub fn order_count_penalty(order_count: u32, cfg: &OrderHistoryPenalties) -> i32 {
    match order_count {
        1 => cfg.single_order_points,
        2 => cfg.two_order_points,
        _ => 0,
    }
}

pub fn spend_adjustment(average_order_value: Money, cfg: &SpendAdjustment) -> i32 {
    if average_order_value < cfg.low_aov_below {
        cfg.low_aov_points
    } else if average_order_value > cfg.high_aov_above {
        cfg.high_aov_points
    } else {
        0
    }
}

pub fn compute_churn(
    customer: &CustomerAggregate,
    days_since_last_order: Days,
    config: &ScoringConfig,
) -> ChurnBreakdown {
    let recency_penalty = recency_penalty(days_since_last_order, &config.recency);
    let order_count_penalty = order_count_penalty(customer.order_count, &config.order_history);
    let spend_adjustment = spend_adjustment(customer.average_order_value, &config.spend);

    let raw_total = recency_penalty + order_count_penalty + spend_adjustment;
    let score = raw_total.clamp(0, MAX_CHURN_SCORE as i32) as u8;

    ChurnBreakdown {
        recency_penalty,
        order_count_penalty,
        spend_adjustment,
        raw_total,
        score,
    }
}
