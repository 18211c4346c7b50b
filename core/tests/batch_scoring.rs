use chrono::{DateTime, Duration, TimeZone, Utc};
use retention_core::{
    event::ScoringEvent, Clock, CustomerAggregate, FixedClock, ScoringEngine, ScoringError,
};
use std::cell::Cell;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn customer(id: &str, orders: u32, spent: f64, days_ago: i64) -> CustomerAggregate {
    CustomerAggregate::new(id, orders, spent, as_of() - Duration::days(days_ago))
}

fn cohort() -> Vec<CustomerAggregate> {
    vec![
        customer("a@example.com", 1, 40.0, 5),
        customer("b@example.com", 6, 900.0, 10),
        customer("c@example.com", 1, 30.0, 120),
        customer("d@example.com", 2, 120.0, 10),
    ]
}

/// Advances one day every time it is read.
struct DriftingClock {
    start: DateTime<Utc>,
    reads: Cell<i64>,
}

impl Clock for DriftingClock {
    fn now(&self) -> DateTime<Utc> {
        let n = self.reads.get();
        self.reads.set(n + 1);
        self.start + Duration::days(n)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn batch_reads_the_clock_once() {
    let clock = DriftingClock { start: as_of(), reads: Cell::new(0) };
    let outcome = ScoringEngine::default().score_batch(&cohort(), &clock);

    assert_eq!(clock.reads.get(), 1, "Batch must capture a single instant");
    assert_eq!(outcome.as_of, as_of());
    assert_eq!(outcome.scored.len(), 4);
}

#[test]
fn batch_matches_individual_scoring() {
    let engine = ScoringEngine::default();
    let customers = cohort();
    let outcome = engine.score_batch(&customers, &FixedClock::at(as_of()));

    for (scored, input) in outcome.scored.iter().zip(&customers) {
        assert_eq!(scored.customer_id(), input.identifier, "Input order must be preserved");
        let single = engine.score(input, &customers, as_of()).unwrap();
        assert_eq!(scored.prediction, single);
    }
}

#[test]
fn scoring_is_idempotent() {
    let engine = ScoringEngine::default();
    let c = customer("i@example.com", 3, 275.5, 44);

    let first = engine.score(&c, &[], as_of()).unwrap();
    let second = engine.score(&c, &[], as_of()).unwrap();
    assert_eq!(first, second);

    let a = serde_json::to_string(&first).unwrap();
    let b = serde_json::to_string(&second).unwrap();
    assert_eq!(a, b, "Serialized predictions must be byte-identical");
}

/// The cohort is reserved for relative scoring; today it must not move
/// any number.
#[test]
fn cohort_does_not_affect_prediction() {
    let engine = ScoringEngine::default();
    let c = customer("x@example.com", 2, 180.0, 70);

    let alone = engine.score(&c, &[], as_of()).unwrap();
    let with_cohort = engine.score(&c, &cohort(), as_of()).unwrap();
    assert_eq!(alone, with_cohort);
}

#[test]
fn invalid_aggregates_are_rejected_not_coerced() {
    let engine = ScoringEngine::default();

    let mut zero_orders = customer("z@example.com", 1, 10.0, 5);
    zero_orders.order_count = 0;
    assert!(matches!(
        engine.score(&zero_orders, &[], as_of()),
        Err(ScoringError::InvalidAggregate { .. })
    ));

    let negative = customer("n@example.com", 2, -20.0, 5);
    assert!(engine.score(&negative, &[], as_of()).is_err());

    let mut no_timestamp = customer("t@example.com", 1, 10.0, 5);
    no_timestamp.last_order_at = None;
    assert!(engine.score(&no_timestamp, &[], as_of()).is_err());

    let future = customer("f@example.com", 1, 10.0, -3);
    assert!(engine.score(&future, &[], as_of()).is_err());

    let mut wrong_average = customer("w@example.com", 2, 100.0, 5);
    wrong_average.average_order_value = 80.0;
    assert!(engine.score(&wrong_average, &[], as_of()).is_err());
}

#[test]
fn one_bad_aggregate_does_not_abort_the_batch() {
    let mut customers = cohort();
    let mut broken = customer("broken@example.com", 1, 10.0, 5);
    broken.order_count = 0;
    customers.insert(1, broken);

    let outcome = ScoringEngine::default().score_batch(&customers, &FixedClock::at(as_of()));

    assert_eq!(outcome.scored.len(), 4);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].customer_id, "broken@example.com");
    assert!(outcome.rejected[0].reason.contains("order_count"));
}

#[test]
fn event_log_brackets_the_batch() {
    let mut customers = cohort();
    customers.push(customer("late@example.com", 1, 10.0, -1));

    let outcome = ScoringEngine::default().score_batch(&customers, &FixedClock::at(as_of()));
    let log = outcome.event_log().unwrap();

    assert_eq!(log.len(), customers.len() + 2);
    assert_eq!(log.first().unwrap().event_type, "batch_started");
    assert_eq!(log.last().unwrap().event_type, "batch_completed");
    assert_eq!(log.iter().filter(|e| e.event_type == "aggregate_rejected").count(), 1);
    assert!(log.iter().enumerate().all(|(i, e)| e.seq == i));

    match outcome.events.last() {
        Some(ScoringEvent::BatchCompleted { scored, rejected, .. }) => {
            assert_eq!(*scored, 4);
            assert_eq!(*rejected, 1);
        }
        other => panic!("Expected BatchCompleted, got {other:?}"),
    }
}

#[test]
fn engine_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ScoringEngine>();

    let engine = std::sync::Arc::new(ScoringEngine::default());
    let handles: Vec<_> = cohort()
        .into_iter()
        .map(|c| {
            let engine = engine.clone();
            std::thread::spawn(move || engine.score(&c, &[], as_of()).unwrap())
        })
        .collect();

    let threaded: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let sequential: Vec<_> = cohort()
        .iter()
        .map(|c| engine.score(c, &[], as_of()).unwrap())
        .collect();
    assert_eq!(threaded, sequential);
}
