use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One tenant/lease record as fetched from the back-office API. Fields are
/// kept untyped because upstream rows carry no unit metadata and vary in
/// shape between endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

/// Portfolio dashboard figures derived from one normalized snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioStats {
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
    pub occupied_units: usize,
    pub total_units: usize,
    pub occupancy_rate: f64,
    pub monthly_revenue: f64,
    pub monthly_budget: f64,
    pub budget_variance: f64,
    pub variance_percent: f64,
    pub monthly_expenses: f64,
    pub profit_margin: f64,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub processed_records: Vec<Record>,
    pub csv_output: String,
    pub tsv_output: String,
    pub stats: PortfolioStats,
    /// Records whose rent figure tripped the sanity clamp, kept aside for
    /// manual data-quality review.
    pub flagged_records: Vec<Record>,
}
