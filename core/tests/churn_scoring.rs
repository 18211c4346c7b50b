use chrono::{DateTime, Duration, TimeZone, Utc};
use retention_core::{
    churn::ChurnRisk, CustomerAggregate, Recommendation, ScoringConfig, ScoringEngine,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn customer(id: &str, orders: u32, spent: f64, days_ago: i64) -> CustomerAggregate {
    CustomerAggregate::new(id, orders, spent, as_of() - Duration::days(days_ago))
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// One $40 order five days ago: order-count +30, spend +15, recency 0.
#[test]
fn single_small_recent_order_is_medium_risk() {
    let engine = ScoringEngine::default();
    let p = engine.score(&customer("a@example.com", 1, 40.0, 5), &[], as_of()).unwrap();

    assert_eq!(p.churn_breakdown.recency_penalty, 0);
    assert_eq!(p.churn_breakdown.order_count_penalty, 30);
    assert_eq!(p.churn_breakdown.spend_adjustment, 15);
    assert_eq!(p.churn_score, 45);
    assert_eq!(p.churn_risk, ChurnRisk::Medium);
    assert_eq!(p.next_purchase_probability, 55);
}

/// AOV of exactly 150 earns no high-spend discount.
#[test]
fn repeat_vip_customer_scores_zero() {
    let engine = ScoringEngine::default();
    let c = customer("b@example.com", 6, 900.0, 10);
    assert_eq!(c.average_order_value, 150.0);

    let p = engine.score(&c, &[], as_of()).unwrap();

    assert_eq!(p.churn_breakdown.spend_adjustment, 0);
    assert_eq!(p.churn_score, 0);
    assert_eq!(p.churn_risk, ChurnRisk::Low);
    assert_eq!(p.next_purchase_probability, 100);
}

#[test]
fn lapsed_single_small_order_is_high_risk() {
    let engine = ScoringEngine::default();
    let p = engine.score(&customer("c@example.com", 1, 30.0, 120), &[], as_of()).unwrap();

    assert_eq!(p.churn_score, 85);
    assert_eq!(p.churn_risk, ChurnRisk::High);
    assert_eq!(p.next_purchase_probability, 15);
    assert_eq!(
        p.recommendations,
        vec![
            Recommendation::WinBackDiscount,
            Recommendation::FreeShipping,
            Recommendation::BundleDeals,
        ]
    );
}

/// Big baskets push the raw sum below zero; the score clamps at 0.
#[test]
fn negative_raw_total_clamps_to_zero() {
    let engine = ScoringEngine::default();
    let p = engine.score(&customer("d@example.com", 6, 1200.0, 5), &[], as_of()).unwrap();

    assert_eq!(p.churn_breakdown.raw_total, -10);
    assert_eq!(p.churn_score, 0);
    assert_eq!(p.next_purchase_probability, 100);
}

#[test]
fn oversized_penalties_clamp_to_hundred() {
    let mut config = ScoringConfig::default();
    config.recency.severe_points = 90;
    let engine = ScoringEngine::new(config).unwrap();

    let p = engine.score(&customer("e@example.com", 1, 20.0, 200), &[], as_of()).unwrap();

    assert_eq!(p.churn_breakdown.raw_total, 135);
    assert_eq!(p.churn_score, 100);
    assert_eq!(p.next_purchase_probability, 0);
    assert_eq!(p.predicted_clv, 0.0);
}

/// Holding everything else fixed, more days since the last order never
/// lowers the churn score.
#[test]
fn churn_score_is_monotonic_in_recency() {
    let engine = ScoringEngine::default();
    let profiles = [(1, 30.0), (2, 200.0), (4, 800.0), (7, 210.0)];

    for (orders, spent) in profiles {
        let mut previous = 0u8;
        for days in 0..=200 {
            let p = engine
                .score(&customer("m@example.com", orders, spent, days), &[], as_of())
                .unwrap();
            assert!(
                p.churn_score >= previous,
                "orders={orders} spent={spent}: score fell from {previous} to {} at day {days}",
                p.churn_score
            );
            previous = p.churn_score;
        }
    }
}

#[test]
fn recency_tiers_apply_past_each_boundary() {
    let engine = ScoringEngine::default();
    let score_at = |days| {
        engine
            .score(&customer("r@example.com", 3, 300.0, days), &[], as_of())
            .unwrap()
            .churn_score
    };

    assert_eq!(score_at(30), 0);
    assert_eq!(score_at(31), 10);
    assert_eq!(score_at(61), 25);
    assert_eq!(score_at(91), 40);
}

/// Hours past midnight don't count toward a whole day.
#[test]
fn partial_days_do_not_cross_a_threshold() {
    let engine = ScoringEngine::default();
    let c = CustomerAggregate::new(
        "h@example.com",
        3,
        300.0,
        as_of() - Duration::days(31) + Duration::hours(1),
    );

    let p = engine.score(&c, &[], as_of()).unwrap();
    assert_eq!(p.days_since_last_order, 30);
    assert_eq!(p.churn_breakdown.recency_penalty, 0);
}

#[test]
fn custom_risk_tiers_rebucket_scores() {
    let mut config = ScoringConfig::default();
    config.risk_tiers.medium_from = 50;
    config.risk_tiers.high_from = 90;
    let engine = ScoringEngine::new(config).unwrap();

    let p = engine.score(&customer("t@example.com", 1, 30.0, 120), &[], as_of()).unwrap();
    assert_eq!(p.churn_score, 85);
    assert_eq!(p.churn_risk, ChurnRisk::Medium);
}
