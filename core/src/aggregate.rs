//! Customer aggregates — the fixed-shape input to the scoring engine.
//!
//! The builder here reduces raw order records into aggregates. It is a
//! reference collaborator: callers with their own order store may build
//! `CustomerAggregate`s directly, as long as they pass `validate()`.

use crate::{
    error::{ScoringError, ScoringResult},
    types::{CustomerId, Money},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tolerance when checking `average_order_value` against
/// `total_spent / order_count`. Callers commonly round to cents.
const AOV_TOLERANCE: Money = 0.01;

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerAggregate {
    pub identifier:           CustomerId,
    pub order_count:          u32,
    pub total_spent:          Money,
    pub last_order_at:        Option<DateTime<Utc>>,
    pub average_order_value:  Money,
    #[serde(default)]
    pub categories_purchased: BTreeSet<String>,
}

impl CustomerAggregate {
    /// Build an aggregate whose average order value is derived from the
    /// totals. `order_count` must be non-zero for the result to validate.
    pub fn new(
        identifier: impl Into<CustomerId>,
        order_count: u32,
        total_spent: Money,
        last_order_at: DateTime<Utc>,
    ) -> Self {
        let average_order_value = if order_count > 0 {
            total_spent / order_count as f64
        } else {
            0.0
        };
        Self {
            identifier: identifier.into(),
            order_count,
            total_spent,
            last_order_at: Some(last_order_at),
            average_order_value,
            categories_purchased: BTreeSet::new(),
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories_purchased
            .extend(categories.into_iter().map(Into::into));
        self
    }

    /// Boundary checks. An aggregate that fails here must never reach
    /// the engine.
    pub fn validate(&self) -> ScoringResult<()> {
        let id = &self.identifier;

        if self.order_count == 0 {
            return Err(ScoringError::invalid_aggregate(id, "order_count must be at least 1"));
        }
        if !self.total_spent.is_finite() || self.total_spent < 0.0 {
            return Err(ScoringError::invalid_aggregate(
                id,
                format!("total_spent must be a non-negative amount, got {}", self.total_spent),
            ));
        }
        if self.last_order_at.is_none() {
            return Err(ScoringError::invalid_aggregate(id, "last_order_at is missing"));
        }
        if !self.average_order_value.is_finite() || self.average_order_value < 0.0 {
            return Err(ScoringError::invalid_aggregate(
                id,
                format!("average_order_value must be non-negative, got {}", self.average_order_value),
            ));
        }

        let expected = self.total_spent / self.order_count as f64;
        if (self.average_order_value - expected).abs() > AOV_TOLERANCE {
            return Err(ScoringError::invalid_aggregate(
                id,
                format!(
                    "average_order_value {:.2} does not match total_spent / order_count = {:.2}",
                    self.average_order_value, expected,
                ),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Cancelled and refunded orders are not purchase history.
    pub fn counts_toward_history(&self) -> bool {
        !matches!(self, OrderStatus::Cancelled | OrderStatus::Refunded)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id:    String,
    pub customer_id: CustomerId,
    pub placed_at:   DateTime<Utc>,
    pub total:       Money,
    pub status:      OrderStatus,
    #[serde(default)]
    pub categories:  Vec<String>,
}

// ── Builder ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Accumulator {
    order_count:   u32,
    total_spent:   Money,
    last_order_at: Option<DateTime<Utc>>,
    categories:    BTreeSet<String>,
}

/// Folds order records into one aggregate per customer.
#[derive(Debug, Default)]
pub struct AggregateBuilder {
    customers: BTreeMap<CustomerId, Accumulator>,
    skipped:   usize,
}

impl AggregateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, order: &OrderRecord) -> ScoringResult<()> {
        if !order.total.is_finite() || order.total < 0.0 {
            return Err(ScoringError::InvalidOrder {
                order_id: order.order_id.clone(),
                reason:   format!("total must be a non-negative amount, got {}", order.total),
            });
        }
        if order.customer_id.trim().is_empty() {
            return Err(ScoringError::InvalidOrder {
                order_id: order.order_id.clone(),
                reason:   "customer_id is empty".into(),
            });
        }

        if !order.status.counts_toward_history() {
            self.skipped += 1;
            log::trace!("aggregate: skipping {} ({:?})", order.order_id, order.status);
            return Ok(());
        }

        let acc = self.customers.entry(order.customer_id.clone()).or_default();
        acc.order_count += 1;
        acc.total_spent += order.total;
        acc.last_order_at = match acc.last_order_at {
            Some(prev) if prev >= order.placed_at => Some(prev),
            _ => Some(order.placed_at),
        };
        for category in &order.categories {
            let label = category.trim();
            if !label.is_empty() {
                acc.categories.insert(label.to_string());
            }
        }
        Ok(())
    }

    pub fn extend<'a, I>(&mut self, orders: I) -> ScoringResult<()>
    where
        I: IntoIterator<Item = &'a OrderRecord>,
    {
        for order in orders {
            self.push(order)?;
        }
        Ok(())
    }

    /// Orders ignored because of their status.
    pub fn skipped_orders(&self) -> usize {
        self.skipped
    }

    /// One aggregate per customer with at least one counting order,
    /// sorted by identifier.
    pub fn build(self) -> Vec<CustomerAggregate> {
        log::debug!(
            "aggregate: built {} customers ({} orders skipped)",
            self.customers.len(),
            self.skipped,
        );
        self.customers
            .into_iter()
            .filter(|(_, acc)| acc.order_count > 0)
            .map(|(identifier, acc)| CustomerAggregate {
                identifier,
                order_count: acc.order_count,
                total_spent: acc.total_spent,
                last_order_at: acc.last_order_at,
                average_order_value: acc.total_spent / acc.order_count as f64,
                categories_purchased: acc.categories,
            })
            .collect()
    }
}

/// Convenience wrapper: fold a slice of orders in one call.
pub fn build_aggregates(orders: &[OrderRecord]) -> ScoringResult<Vec<CustomerAggregate>> {
    let mut builder = AggregateBuilder::new();
    builder.extend(orders)?;
    Ok(builder.build())
}
