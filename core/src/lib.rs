//! Customer value and churn-risk scoring.
//!
//! Pipeline: order records → `aggregate` → `engine` → `cohort` consumers.
//! The engine is pure: one aggregate and one instant in, one prediction out.

pub mod aggregate;
pub mod churn;
pub mod clock;
pub mod cohort;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod projection;
pub mod recommendation;
pub mod rng;
pub mod segment;
pub mod synthetic;
pub mod types;

pub use aggregate::{build_aggregates, AggregateBuilder, CustomerAggregate, OrderRecord, OrderStatus};
pub use churn::ChurnRisk;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ScoringConfig;
pub use engine::{BatchOutcome, Prediction, ScoredCustomer, ScoringEngine};
pub use error::{ScoringError, ScoringResult};
pub use recommendation::Recommendation;
pub use segment::CustomerSegment;
