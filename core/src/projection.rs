//! Purchase-timing and lifetime-value projection.
//!
//! Straight-line model: a repeat customer's orders are assumed evenly
//! spread across the trailing window; single-order customers get a
//! fixed cadence.

use crate::{
    config::ProjectionConfig,
    types::{Days, Money},
};

/// Expected days between orders.
pub fn purchase_frequency_days(order_count: u32, cfg: &ProjectionConfig) -> f64 {
    if order_count > 1 {
        cfg.trailing_window_days / order_count as f64
    } else {
        cfg.single_order_cadence_days
    }
}

/// Days until the expected next order, floored at 0 ("overdue").
pub fn days_until_next_purchase(frequency_days: f64, days_since_last_order: Days) -> u32 {
    let remaining = (frequency_days - days_since_last_order as f64).round();
    if remaining > 0.0 {
        remaining as u32
    } else {
        0
    }
}

/// Projected revenue over the configured horizon, discounted by the
/// retention rate implied by the churn score. Rounded to whole units.
pub fn predicted_clv(
    average_order_value: Money,
    frequency_days: f64,
    churn_score: u8,
    cfg: &ProjectionConfig,
) -> Money {
    let retention_rate = f64::from(100 - churn_score.min(100)) / 100.0;
    let monthly_purchases = 12.0 / frequency_days;
    let clv = (average_order_value * monthly_purchases * cfg.horizon_months * retention_rate).round();
    clv.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_order_customers_use_fixed_cadence() {
        let cfg = ProjectionConfig::default();
        assert_eq!(purchase_frequency_days(1, &cfg), 90.0);
        assert_eq!(purchase_frequency_days(0, &cfg), 90.0);
        assert!((purchase_frequency_days(4, &cfg) - 91.25).abs() < 1e-9);
    }

    #[test]
    fn overdue_customers_floor_at_zero() {
        assert_eq!(days_until_next_purchase(90.0, 120), 0);
        assert_eq!(days_until_next_purchase(90.0, 90), 0);
        assert_eq!(days_until_next_purchase(60.8333, 10), 51);
    }

    #[test]
    fn full_churn_means_no_value() {
        let cfg = ProjectionConfig::default();
        assert_eq!(predicted_clv(250.0, 30.0, 100, &cfg), 0.0);
    }
}
