//! The scoring engine — one aggregate in, one prediction out.
//!
//! SCORING ORDER (fixed):
//!   1. Validate the aggregate (precondition; rejects, never coerces)
//!   2. Days since last order, against the injected instant
//!   3. Churn score + risk tier
//!   4. Purchase frequency, days until next purchase, CLV
//!   5. Recommendations
//!   6. Segment
//!
//! RULES:
//!   - No I/O, no wall-clock reads, no shared mutable state.
//!   - The same aggregate and instant always yield the same prediction.
//!   - A batch captures "now" once and scores every customer against it.

use crate::{
    aggregate::CustomerAggregate,
    churn::{compute_churn, ChurnBreakdown, ChurnRisk, MAX_CHURN_SCORE},
    clock::{whole_days_between, Clock},
    config::ScoringConfig,
    error::{ScoringError, ScoringResult},
    event::{EventLogEntry, ScoringEvent},
    projection::{days_until_next_purchase, predicted_clv, purchase_frequency_days},
    recommendation::{recommend, Recommendation},
    segment::{classify, CustomerSegment},
    types::{BatchId, CustomerId, Days, Money},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub churn_score:               u8,
    pub churn_risk:                ChurnRisk,
    pub predicted_clv:             Money,
    pub next_purchase_probability: u8,
    pub days_until_next_purchase:  u32,
    pub recommendations:           Vec<Recommendation>,
    pub segment:                   CustomerSegment,
    // Audit detail
    pub days_since_last_order:     Days,
    pub churn_breakdown:           ChurnBreakdown,
}

impl Prediction {
    pub fn is_overdue(&self) -> bool {
        self.days_until_next_purchase == 0
    }

    pub fn recommendation_messages(&self) -> Vec<&'static str> {
        self.recommendations.iter().map(Recommendation::message).collect()
    }
}

/// A prediction alongside the aggregate it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCustomer {
    pub aggregate:  CustomerAggregate,
    pub prediction: Prediction,
}

impl ScoredCustomer {
    pub fn customer_id(&self) -> &str {
        &self.aggregate.identifier
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rejection {
    pub customer_id: CustomerId,
    pub reason:      String,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub batch_id: BatchId,
    pub as_of:    DateTime<Utc>,
    /// Input order preserved.
    pub scored:   Vec<ScoredCustomer>,
    pub rejected: Vec<Rejection>,
    pub events:   Vec<ScoringEvent>,
}

impl BatchOutcome {
    pub fn event_log(&self) -> ScoringResult<Vec<EventLogEntry>> {
        self.events
            .iter()
            .enumerate()
            .map(|(seq, event)| {
                Ok(EventLogEntry {
                    seq,
                    batch_id:   self.batch_id.clone(),
                    event_type: event.type_name().to_string(),
                    payload:    serde_json::to_string(event)?,
                })
            })
            .collect()
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> ScoringResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one customer as of `now`.
    ///
    /// `cohort` is every customer in the current pass. The current rule
    /// set is absolute, so it is accepted but not used in the arithmetic.
    pub fn score(
        &self,
        customer: &CustomerAggregate,
        cohort: &[CustomerAggregate],
        now: DateTime<Utc>,
    ) -> ScoringResult<Prediction> {
        customer.validate()?;

        let last_order_at = customer.last_order_at.ok_or_else(|| {
            ScoringError::invalid_aggregate(&customer.identifier, "last_order_at is missing")
        })?;
        let days_since_last_order = whole_days_between(last_order_at, now);
        if days_since_last_order < 0 {
            return Err(ScoringError::invalid_aggregate(
                &customer.identifier,
                format!("last order at {last_order_at} is after the scoring instant {now}"),
            ));
        }

        log::trace!("score: {} against cohort of {}", customer.identifier, cohort.len());

        let cfg = &self.config;

        let churn_breakdown = compute_churn(customer, days_since_last_order, cfg);
        let churn_score = churn_breakdown.score;
        let churn_risk = ChurnRisk::from_score(churn_score, &cfg.risk_tiers);
        let next_purchase_probability = MAX_CHURN_SCORE - churn_score;

        let frequency = purchase_frequency_days(customer.order_count, &cfg.projection);
        let days_until_next_purchase = days_until_next_purchase(frequency, days_since_last_order);
        let predicted_clv = predicted_clv(
            customer.average_order_value,
            frequency,
            churn_score,
            &cfg.projection,
        );

        let recommendations = recommend(
            customer,
            churn_risk,
            days_since_last_order,
            &cfg.recommendations,
        );
        let segment = classify(customer, days_since_last_order, &cfg.segments);

        log::debug!(
            "score: {} churn={} ({}) clv={:.0} segment={} next_in={}d",
            customer.identifier,
            churn_score,
            churn_risk,
            predicted_clv,
            segment,
            days_until_next_purchase,
        );

        Ok(Prediction {
            churn_score,
            churn_risk,
            predicted_clv,
            next_purchase_probability,
            days_until_next_purchase,
            recommendations,
            segment,
            days_since_last_order,
            churn_breakdown,
        })
    }

    /// Score a whole cohort against one instant read from `clock`.
    /// Invalid aggregates are reported in `rejected`; they never abort
    /// the batch.
    pub fn score_batch(&self, customers: &[CustomerAggregate], clock: &dyn Clock) -> BatchOutcome {
        let as_of = clock.now();
        let batch_id = uuid::Uuid::new_v4().to_string();

        let mut scored = Vec::with_capacity(customers.len());
        let mut rejected = Vec::new();
        let mut events = vec![ScoringEvent::BatchStarted {
            batch_id:  batch_id.clone(),
            as_of,
            customers: customers.len(),
        }];

        for customer in customers {
            match self.score(customer, customers, as_of) {
                Ok(prediction) => {
                    events.push(ScoringEvent::CustomerScored {
                        customer_id:   customer.identifier.clone(),
                        churn_score:   prediction.churn_score,
                        churn_risk:    prediction.churn_risk,
                        segment:       prediction.segment,
                        predicted_clv: prediction.predicted_clv,
                    });
                    scored.push(ScoredCustomer {
                        aggregate: customer.clone(),
                        prediction,
                    });
                }
                Err(e) => {
                    log::warn!("batch {batch_id}: rejected {}: {e}", customer.identifier);
                    let reason = e.to_string();
                    events.push(ScoringEvent::AggregateRejected {
                        customer_id: customer.identifier.clone(),
                        reason:      reason.clone(),
                    });
                    rejected.push(Rejection {
                        customer_id: customer.identifier.clone(),
                        reason,
                    });
                }
            }
        }

        events.push(ScoringEvent::BatchCompleted {
            batch_id: batch_id.clone(),
            scored:   scored.len(),
            rejected: rejected.len(),
        });

        log::info!(
            "batch {batch_id}: as_of={as_of} scored={} rejected={}",
            scored.len(),
            rejected.len(),
        );

        BatchOutcome { batch_id, as_of, scored, rejected, events }
    }
}
