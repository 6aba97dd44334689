use crate::core::normalize::normalize_rent;
use crate::domain::model::{PortfolioStats, Record};
use chrono::Utc;

/// Lease states that mean a unit is NOT producing rent. Anything else,
/// including a missing status field, counts as occupied: the record is on
/// the rent roll.
const VACANT_STATES: [&str; 4] = ["vacant", "ended", "terminated", "expired"];

/// Display label for a record, used in normalizer diagnostics.
pub fn record_label(record: &Record, index: usize) -> String {
    for key in ["tenantName", "name", "tenant", "unit"] {
        if let Some(v) = record.data.get(key).and_then(|v| v.as_str()) {
            if !v.trim().is_empty() {
                return v.to_string();
            }
        }
    }
    format!("record #{}", index + 1)
}

/// First rent field present on the record, probed in configured order.
pub fn raw_rent_value<'a>(record: &'a Record, rent_fields: &[String]) -> Option<&'a serde_json::Value> {
    rent_fields.iter().find_map(|field| record.data.get(field))
}

pub fn is_occupied(record: &Record) -> bool {
    for key in ["status", "leaseStatus"] {
        if let Some(status) = record.data.get(key).and_then(|v| v.as_str()) {
            let status = status.trim().to_lowercase();
            return !VACANT_STATES.contains(&status.as_str());
        }
    }
    true
}

/// Sum of normalized monthly rents over an immutable snapshot. Occupancy is
/// irrelevant here: a row that carries a rent figure contributes it.
pub fn monthly_revenue(records: &[Record], rent_fields: &[String]) -> f64 {
    let total = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            normalize_rent(raw_rent_value(record, rent_fields), &record_label(record, i))
        })
        .sum();
    round2(total)
}

/// Occupied units as a percentage of the portfolio, `0` for an empty one.
pub fn occupancy_rate(occupied: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(occupied as f64 / total as f64 * 100.0)
}

/// Actual minus budget; positive means over budget on revenue.
pub fn budget_variance(actual: f64, budget: f64) -> f64 {
    round2(actual - budget)
}

/// Variance as a percentage of budget, `0` when there is no budget.
pub fn variance_percent(actual: f64, budget: f64) -> f64 {
    if budget == 0.0 {
        return 0.0;
    }
    round2((actual - budget) / budget * 100.0)
}

/// `(revenue - expenses) / revenue` as a percentage, `0` for zero revenue.
pub fn profit_margin(revenue: f64, expenses: f64) -> f64 {
    if revenue == 0.0 {
        return 0.0;
    }
    round2((revenue - expenses) / revenue * 100.0)
}

/// Builds the full dashboard snapshot as one pure reduction over the fetched
/// records. No running totals are kept anywhere else.
pub fn portfolio_stats(
    records: &[Record],
    rent_fields: &[String],
    configured_units: usize,
    monthly_budget: f64,
    monthly_expenses: f64,
) -> PortfolioStats {
    let occupied_units = records.iter().filter(|r| is_occupied(r)).count();
    let total_units = if configured_units > 0 {
        configured_units
    } else {
        records.len()
    };
    let revenue = monthly_revenue(records, rent_fields);

    PortfolioStats {
        generated_at: Utc::now(),
        record_count: records.len(),
        occupied_units,
        total_units,
        occupancy_rate: occupancy_rate(occupied_units, total_units),
        monthly_revenue: revenue,
        monthly_budget,
        budget_variance: budget_variance(revenue, monthly_budget),
        variance_percent: variance_percent(revenue, monthly_budget),
        monthly_expenses,
        profit_margin: profit_margin(revenue, monthly_expenses),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn record(pairs: &[(&str, serde_json::Value)]) -> Record {
        let mut data = HashMap::new();
        for (k, v) in pairs {
            data.insert(k.to_string(), v.clone());
        }
        Record { data }
    }

    fn rent_fields() -> Vec<String> {
        vec!["rentAmount".to_string(), "currentRent".to_string()]
    }

    #[test]
    fn test_monthly_revenue_mixed_units() {
        let records = vec![
            record(&[("tenantName", json!("Al Noor")), ("rentAmount", json!(4500))]),
            // Annual figure
            record(&[("tenantName", json!("Falcon")), ("rentAmount", json!(84000))]),
            // Fils-encoded monthly
            record(&[("tenantName", json!("Oasis")), ("currentRent", json!(650000))]),
            // No rent field at all
            record(&[("tenantName", json!("Empty"))]),
        ];

        assert_eq!(monthly_revenue(&records, &rent_fields()), 18000.0);
    }

    #[test]
    fn test_rent_field_probe_order() {
        let r = record(&[("rentAmount", json!(4500)), ("currentRent", json!(9999))]);
        assert_eq!(
            raw_rent_value(&r, &rent_fields()).unwrap().as_i64(),
            Some(4500)
        );
    }

    #[test]
    fn test_occupancy_rate() {
        assert_eq!(occupancy_rate(18, 24), 75.0);
        assert_eq!(occupancy_rate(1, 3), 33.33);
        assert_eq!(occupancy_rate(0, 0), 0.0);
    }

    #[test]
    fn test_is_occupied_status_handling() {
        assert!(is_occupied(&record(&[("status", json!("active"))])));
        assert!(is_occupied(&record(&[("tenantName", json!("no status"))])));
        assert!(!is_occupied(&record(&[("status", json!("Vacant"))])));
        assert!(!is_occupied(&record(&[("leaseStatus", json!("expired"))])));
    }

    #[test]
    fn test_budget_variance_and_percent() {
        assert_eq!(budget_variance(110_000.0, 100_000.0), 10_000.0);
        assert_eq!(variance_percent(110_000.0, 100_000.0), 10.0);
        assert_eq!(variance_percent(90_000.0, 100_000.0), -10.0);
        assert_eq!(variance_percent(90_000.0, 0.0), 0.0);
    }

    #[test]
    fn test_profit_margin() {
        assert_eq!(profit_margin(100_000.0, 60_000.0), 40.0);
        assert_eq!(profit_margin(0.0, 60_000.0), 0.0);
        assert_eq!(profit_margin(50_000.0, 60_000.0), -20.0);
    }

    #[test]
    fn test_portfolio_stats_reduction() {
        let records = vec![
            record(&[("tenantName", json!("A")), ("rentAmount", json!(4500)), ("status", json!("active"))]),
            record(&[("tenantName", json!("B")), ("rentAmount", json!(84000)), ("status", json!("active"))]),
            record(&[("tenantName", json!("C")), ("status", json!("vacant"))]),
        ];

        let stats = portfolio_stats(&records, &rent_fields(), 4, 10_000.0, 3000.0);

        assert_eq!(stats.record_count, 3);
        assert_eq!(stats.occupied_units, 2);
        assert_eq!(stats.total_units, 4);
        assert_eq!(stats.occupancy_rate, 50.0);
        // 4,500 monthly plus 84,000 annual (7,000/month)
        assert_eq!(stats.monthly_revenue, 11500.0);
        assert_eq!(stats.budget_variance, 1500.0);
        assert_eq!(stats.variance_percent, 15.0);
        assert_eq!(stats.profit_margin, 73.91);
    }

    #[test]
    fn test_portfolio_stats_defaults_units_to_record_count() {
        let records = vec![
            record(&[("rentAmount", json!(4500))]),
            record(&[("rentAmount", json!(5000))]),
        ];
        let stats = portfolio_stats(&records, &rent_fields(), 0, 0.0, 0.0);
        assert_eq!(stats.total_units, 2);
        assert_eq!(stats.occupancy_rate, 100.0);
    }
}
