//! Behavioural segments. First matching rule wins; `Regular` is the
//! explicit default for customers no other rule claims (for example two
//! orders with recent activity).
//!
//! The enum is purely semantic. Display styling is the caller's concern.

use crate::{
    aggregate::CustomerAggregate,
    config::SegmentThresholds,
    types::Days,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerSegment {
    Vip,
    Loyal,
    New,
    Regular,
    AtRisk,
    Dormant,
}

impl CustomerSegment {
    pub const ALL: [CustomerSegment; 6] = [
        CustomerSegment::Vip,
        CustomerSegment::Loyal,
        CustomerSegment::New,
        CustomerSegment::Regular,
        CustomerSegment::AtRisk,
        CustomerSegment::Dormant,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CustomerSegment::Vip     => "VIP",
            CustomerSegment::Loyal   => "Loyal",
            CustomerSegment::New     => "New",
            CustomerSegment::Regular => "Regular",
            CustomerSegment::AtRisk  => "At Risk",
            CustomerSegment::Dormant => "Dormant",
        }
    }
}

impl std::fmt::Display for CustomerSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify(
    customer: &CustomerAggregate,
    days_since_last_order: Days,
    t: &SegmentThresholds,
) -> CustomerSegment {
    let orders = customer.order_count;
    let days = days_since_last_order;

    if customer.total_spent >= t.vip_min_spent || orders >= t.vip_min_orders {
        CustomerSegment::Vip
    } else if orders >= t.loyal_min_orders && days < t.loyal_within_days {
        CustomerSegment::Loyal
    } else if days < t.new_within_days && orders == 1 {
        CustomerSegment::New
    } else if days >= t.at_risk_from_days && days < t.dormant_from_days {
        CustomerSegment::AtRisk
    } else if days >= t.dormant_from_days {
        CustomerSegment::Dormant
    } else {
        CustomerSegment::Regular
    }
}
