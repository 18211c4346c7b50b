//! Cohort helpers for consumers of predictions: ranking, filtering,
//! bucketing, summaries and campaign recipient lists.
//!
//! The engine guarantees nothing about ordering across customers.
//! Everything here is a consumer-side view over `ScoredCustomer`s.

use crate::{
    churn::ChurnRisk,
    engine::ScoredCustomer,
    segment::CustomerSegment,
    types::{CustomerId, Money},
};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeMap};

// ── Ranking ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    ChurnScore,
    PredictedClv,
    TotalSpent,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "churn" | "churn_score"     => Ok(SortKey::ChurnScore),
            "clv" | "predicted_clv"     => Ok(SortKey::PredictedClv),
            "spent" | "total_spent"     => Ok(SortKey::TotalSpent),
            other => Err(format!("unknown sort key '{other}' (expected churn, clv or spent)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

fn sort_value(c: &ScoredCustomer, key: SortKey) -> f64 {
    match key {
        SortKey::ChurnScore   => f64::from(c.prediction.churn_score),
        SortKey::PredictedClv => c.prediction.predicted_clv,
        SortKey::TotalSpent   => c.aggregate.total_spent,
    }
}

/// Sort in place. Ties are broken by customer identifier (ascending)
/// so the order is stable across runs.
pub fn rank(customers: &mut [ScoredCustomer], key: SortKey, direction: Direction) {
    customers.sort_by(|a, b| {
        let by_value = sort_value(a, key)
            .partial_cmp(&sort_value(b, key))
            .unwrap_or(Ordering::Equal);
        let by_value = match direction {
            Direction::Ascending  => by_value,
            Direction::Descending => by_value.reverse(),
        };
        by_value.then_with(|| a.customer_id().cmp(b.customer_id()))
    });
}

// ── Filtering and bucketing ──────────────────────────────────────────────────

pub fn filter_by_risk(customers: &[ScoredCustomer], risk: ChurnRisk) -> Vec<&ScoredCustomer> {
    customers.iter().filter(|c| c.prediction.churn_risk == risk).collect()
}

pub fn filter_by_segment(customers: &[ScoredCustomer], segment: CustomerSegment) -> Vec<&ScoredCustomer> {
    customers.iter().filter(|c| c.prediction.segment == segment).collect()
}

pub fn bucket_by_segment(customers: &[ScoredCustomer]) -> BTreeMap<CustomerSegment, Vec<CustomerId>> {
    let mut buckets: BTreeMap<CustomerSegment, Vec<CustomerId>> = BTreeMap::new();
    for c in customers {
        buckets.entry(c.prediction.segment).or_default().push(c.aggregate.identifier.clone());
    }
    buckets
}

pub fn bucket_by_risk(customers: &[ScoredCustomer]) -> BTreeMap<ChurnRisk, Vec<CustomerId>> {
    let mut buckets: BTreeMap<ChurnRisk, Vec<CustomerId>> = BTreeMap::new();
    for c in customers {
        buckets.entry(c.prediction.churn_risk).or_default().push(c.aggregate.identifier.clone());
    }
    buckets
}

// ── Summary ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
    pub customers:           usize,
    pub by_segment:          BTreeMap<CustomerSegment, usize>,
    pub by_risk:             BTreeMap<ChurnRisk, usize>,
    pub avg_churn_score:     f64,
    pub total_predicted_clv: Money,
    pub total_spent:         Money,
    pub overdue:             usize,
}

impl CohortSummary {
    pub fn from_scored(customers: &[ScoredCustomer]) -> Self {
        let mut by_segment = BTreeMap::new();
        let mut by_risk = BTreeMap::new();
        let mut churn_sum = 0u64;
        let mut total_predicted_clv = 0.0;
        let mut total_spent = 0.0;
        let mut overdue = 0;

        for c in customers {
            *by_segment.entry(c.prediction.segment).or_insert(0) += 1;
            *by_risk.entry(c.prediction.churn_risk).or_insert(0) += 1;
            churn_sum += u64::from(c.prediction.churn_score);
            total_predicted_clv += c.prediction.predicted_clv;
            total_spent += c.aggregate.total_spent;
            if c.prediction.is_overdue() {
                overdue += 1;
            }
        }

        let avg_churn_score = if customers.is_empty() {
            0.0
        } else {
            churn_sum as f64 / customers.len() as f64
        };

        Self {
            customers: customers.len(),
            by_segment,
            by_risk,
            avg_churn_score,
            total_predicted_clv,
            total_spent,
            overdue,
        }
    }

    pub fn high_risk_count(&self) -> usize {
        self.by_risk.get(&ChurnRisk::High).copied().unwrap_or(0)
    }
}

// ── Campaigns ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignKind {
    WinBack,
    Nurture,
    VipUpgrade,
    Reactivation,
}

impl CampaignKind {
    pub fn label(&self) -> &'static str {
        match self {
            CampaignKind::WinBack      => "win_back",
            CampaignKind::Nurture      => "nurture",
            CampaignKind::VipUpgrade   => "vip_upgrade",
            CampaignKind::Reactivation => "reactivation",
        }
    }
}

/// At most one campaign per customer. Risk takes precedence over
/// segment: a high-risk VIP gets the win-back, not the upgrade.
pub fn campaign_for(customer: &ScoredCustomer) -> Option<CampaignKind> {
    match (customer.prediction.churn_risk, customer.prediction.segment) {
        (ChurnRisk::High, _)                    => Some(CampaignKind::WinBack),
        (ChurnRisk::Medium, _)                  => Some(CampaignKind::Nurture),
        (ChurnRisk::Low, CustomerSegment::Vip)  => Some(CampaignKind::VipUpgrade),
        (ChurnRisk::Low, CustomerSegment::Dormant) => Some(CampaignKind::Reactivation),
        (ChurnRisk::Low, _)                     => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignList {
    pub campaign:   CampaignKind,
    pub recipients: Vec<CustomerId>,
}

/// Group recipients per campaign. Campaigns with no recipients are
/// omitted; recipients keep the order of `customers`.
pub fn plan_campaigns(customers: &[ScoredCustomer]) -> Vec<CampaignList> {
    let mut lists: BTreeMap<CampaignKind, Vec<CustomerId>> = BTreeMap::new();
    for c in customers {
        if let Some(kind) = campaign_for(c) {
            lists.entry(kind).or_default().push(c.aggregate.identifier.clone());
        }
    }
    let plan: Vec<CampaignList> = lists
        .into_iter()
        .map(|(campaign, recipients)| CampaignList { campaign, recipients })
        .collect();

    for list in &plan {
        log::debug!("campaign {}: {} recipients", list.campaign.label(), list.recipients.len());
    }
    plan
}
