//! Property-style checks over a seeded synthetic cohort.

use chrono::{DateTime, TimeZone, Utc};
use retention_core::{
    build_aggregates, synthetic::SyntheticOrders, CustomerSegment, FixedClock, ScoringEngine,
};

const COHORT_SIZE: usize = 500;

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn synthetic_cohort_respects_output_invariants() {
    init_logging();

    let orders = SyntheticOrders::new(42).generate(COHORT_SIZE, as_of());
    let customers = build_aggregates(&orders).unwrap();
    assert!(!customers.is_empty());

    let outcome = ScoringEngine::default().score_batch(&customers, &FixedClock::at(as_of()));
    assert!(outcome.rejected.is_empty(), "Unexpected rejections: {:?}", outcome.rejected);

    for c in &outcome.scored {
        let p = &c.prediction;
        assert!(p.churn_score <= 100, "{}: churn_score={}", c.customer_id(), p.churn_score);
        assert_eq!(
            u16::from(p.churn_score) + u16::from(p.next_purchase_probability),
            100,
            "{}: probability must complement churn", c.customer_id()
        );
        assert!(p.predicted_clv >= 0.0, "{}: clv={}", c.customer_id(), p.predicted_clv);
        assert!(p.predicted_clv.fract() == 0.0, "{}: clv must be whole units", c.customer_id());
        assert!(p.days_since_last_order >= 0);
        assert!(CustomerSegment::ALL.contains(&p.segment));
    }
}

#[test]
fn same_seed_produces_identical_orders() {
    let a = SyntheticOrders::new(0xC4E5_F1CA).generate(50, as_of());
    let b = SyntheticOrders::new(0xC4E5_F1CA).generate(50, as_of());
    assert_eq!(a, b);

    let c = SyntheticOrders::new(99).generate(50, as_of());
    assert_ne!(a, c, "Different seeds produced identical orders — seed is not being used");
}

#[test]
fn synthetic_orders_never_postdate_the_instant() {
    let orders = SyntheticOrders::new(7).generate(100, as_of());
    assert!(orders.iter().all(|o| o.placed_at <= as_of()));
    assert!(orders.iter().all(|o| o.total >= 0.0));
}

#[test]
fn rescoring_a_batch_is_deterministic() {
    let orders = SyntheticOrders::new(1234).generate(120, as_of());
    let customers = build_aggregates(&orders).unwrap();
    let engine = ScoringEngine::default();

    let first = engine.score_batch(&customers, &FixedClock::at(as_of()));
    let second = engine.score_batch(&customers, &FixedClock::at(as_of()));

    assert_ne!(first.batch_id, second.batch_id);
    assert_eq!(first.scored, second.scored);
}
