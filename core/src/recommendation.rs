//! Retention recommendations. Every rule is evaluated, in a fixed order,
//! and each one that fires appends its actions. Output order is
//! evaluation order.

use crate::{
    aggregate::CustomerAggregate,
    churn::ChurnRisk,
    config::RecommendationThresholds,
    types::Days,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    WinBackDiscount,
    FreeShipping,
    PersonalizedProducts,
    LoyaltyInvite,
    BundleDeals,
    VipUpgrade,
    NewArrivalsReengagement,
}

impl Recommendation {
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::WinBackDiscount         => "Send win-back email with 25% discount",
            Recommendation::FreeShipping            => "Offer free shipping on next order",
            Recommendation::PersonalizedProducts    => "Send personalized product recommendations",
            Recommendation::LoyaltyInvite           => "Invite to loyalty program",
            Recommendation::BundleDeals             => "Suggest bundle deals to increase order value",
            Recommendation::VipUpgrade              => "Upgrade to VIP tier with exclusive perks",
            Recommendation::NewArrivalsReengagement => "Re-engagement email with 'new arrivals' focus",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

pub fn recommend(
    customer: &CustomerAggregate,
    risk: ChurnRisk,
    days_since_last_order: Days,
    t: &RecommendationThresholds,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    match risk {
        ChurnRisk::High => {
            out.push(Recommendation::WinBackDiscount);
            out.push(Recommendation::FreeShipping);
        }
        ChurnRisk::Medium => {
            out.push(Recommendation::PersonalizedProducts);
            out.push(Recommendation::LoyaltyInvite);
        }
        ChurnRisk::Low => {}
    }

    if customer.average_order_value < t.bundle_aov_below {
        out.push(Recommendation::BundleDeals);
    }

    if customer.total_spent > t.vip_upgrade_spent_above {
        out.push(Recommendation::VipUpgrade);
    }

    if days_since_last_order > t.reengage_after_days && customer.order_count > t.reengage_orders_above {
        out.push(Recommendation::NewArrivalsReengagement);
    }

    out
}
