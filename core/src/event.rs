//! The batch event log — what happened during one scoring pass.
//!
//! Events are informational only. Predictions never depend on them,
//! and the consumer may ignore the log entirely.

use crate::{
    churn::ChurnRisk,
    segment::CustomerSegment,
    types::{BatchId, CustomerId, Money},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Variants are appended over time — never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoringEvent {
    BatchStarted {
        batch_id: BatchId,
        as_of: DateTime<Utc>,
        customers: usize,
    },
    CustomerScored {
        customer_id: CustomerId,
        churn_score: u8,
        churn_risk: ChurnRisk,
        segment: CustomerSegment,
        predicted_clv: Money,
    },
    AggregateRejected {
        customer_id: CustomerId,
        reason: String,
    },
    BatchCompleted {
        batch_id: BatchId,
        scored: usize,
        rejected: usize,
    },
}

impl ScoringEvent {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::BatchStarted { .. }      => "batch_started",
            Self::CustomerScored { .. }    => "customer_scored",
            Self::AggregateRejected { .. } => "aggregate_rejected",
            Self::BatchCompleted { .. }    => "batch_completed",
        }
    }
}

/// A serialized event with its position in the batch log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub seq:        usize,
    pub batch_id:   BatchId,
    pub event_type: String,
    pub payload:    String, // JSON-serialized ScoringEvent
}
