//! Deterministic synthetic order histories.
//!
//! Used by the runner's demo mode and by property-style tests. Same seed
//! and same as-of instant always yield the same orders.

use crate::{
    aggregate::{OrderRecord, OrderStatus},
    rng::{RngBank, StreamRng, StreamSlot},
};
use chrono::{DateTime, Duration, Utc};

const MAX_ORDERS_PER_CUSTOMER: u64 = 8;
const MAX_RECENCY_DAYS: u64 = 200;
const NON_COUNTING_STATUS_RATE: f64 = 0.08;

pub struct SyntheticOrders {
    customers:  StreamRng,
    orders:     StreamRng,
    categories: StreamRng,
    statuses:   StreamRng,
}

impl SyntheticOrders {
    pub fn new(seed: u64) -> Self {
        let bank = RngBank::new(seed);
        Self {
            customers:  bank.stream(StreamSlot::Customers),
            orders:     bank.stream(StreamSlot::Orders),
            categories: bank.stream(StreamSlot::Categories),
            statuses:   bank.stream(StreamSlot::Statuses),
        }
    }

    /// Orders for `customer_count` customers, all placed at or before `as_of`.
    pub fn generate(&mut self, customer_count: usize, as_of: DateTime<Utc>) -> Vec<OrderRecord> {
        let mut out = Vec::new();

        for i in 0..customer_count {
            let customer_id = self.email(i);

            // Order count skews low: most shoppers buy once or twice.
            let order_count = (self.customers.pareto(1.0, 1.3).floor() as u64)
                .clamp(1, MAX_ORDERS_PER_CUSTOMER);
            let recency_days = self.customers.below(MAX_RECENCY_DAYS + 1) as i64;
            let spacing_days = self.customers.between(7, 60) as i64;
            let basket_floor = 15.0 + self.customers.next_f64() * 60.0;

            for n in 0..order_count {
                let placed_at = as_of
                    - Duration::days(recency_days + n as i64 * spacing_days)
                    - Duration::minutes(self.orders.below(24 * 60) as i64);
                let total = (self.orders.pareto(basket_floor, 2.2).min(900.0) * 100.0).round() / 100.0;

                out.push(OrderRecord {
                    order_id: format!("o-{i:05}-{n:02}"),
                    customer_id: customer_id.clone(),
                    placed_at,
                    total,
                    status: self.status(),
                    categories: self.pick_categories(),
                });
            }
        }

        log::debug!("synthetic: {} orders for {customer_count} customers", out.len());
        out
    }

    fn email(&mut self, index: usize) -> String {
        let first = self.customers.pick(FIRST_NAMES).copied().unwrap_or("customer");
        let last = self.customers.pick(LAST_NAMES).copied().unwrap_or("unknown");
        format!("{}.{}{index}@example.com", first.to_lowercase(), last.to_lowercase())
    }

    fn status(&mut self) -> OrderStatus {
        if self.statuses.chance(NON_COUNTING_STATUS_RATE) {
            if self.statuses.chance(0.5) { OrderStatus::Cancelled } else { OrderStatus::Refunded }
        } else {
            OrderStatus::Delivered
        }
    }

    fn pick_categories(&mut self) -> Vec<String> {
        let count = self.categories.between(1, 2);
        (0..count)
            .filter_map(|_| self.categories.pick(CATEGORIES).map(|c| c.to_string()))
            .collect()
    }
}

const FIRST_NAMES: &[&str] = &[
    "Amara", "Ben", "Chloe", "Dev", "Elena", "Felix", "Grace", "Hiro",
    "Imani", "Jonas", "Kira", "Luca", "Maya", "Nikhil", "Olive", "Priya",
    "Quinn", "Rafael", "Sofia", "Tomas", "Uma", "Victor", "Wren", "Yusuf",
];

const LAST_NAMES: &[&str] = &[
    "Adeyemi", "Brooks", "Castillo", "Dubois", "Eriksen", "Fischer",
    "Gupta", "Hall", "Ito", "Jensen", "Kowalski", "Laurent", "Mensah",
    "Novak", "Okafor", "Park", "Rossi", "Silva", "Tanaka", "Walsh",
];

const CATEGORIES: &[&str] = &[
    "apparel", "accessories", "beauty", "home", "kitchen", "fitness",
    "outdoor", "stationery", "toys", "electronics",
];
