pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

fn default_rent_fields() -> Vec<String> {
    vec![
        "rentAmount".to_string(),
        "currentRent".to_string(),
        "rent".to_string(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "rentroll-etl"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Rent-roll reporting tool: normalizes unit-ambiguous rents to monthly AED")
)]
pub struct CliConfig {
    #[cfg_attr(
        feature = "cli",
        arg(long, default_value = "http://localhost:3000/api/tenants")
    )]
    pub api_endpoint: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "./output"))]
    pub output_path: String,

    /// Record fields probed in order for the raw rent figure
    #[cfg_attr(
        feature = "cli",
        arg(long, value_delimiter = ',', default_values_t = default_rent_fields())
    )]
    pub rent_fields: Vec<String>,

    #[cfg_attr(feature = "cli", arg(long))]
    pub max_records: Option<usize>,

    /// Portfolio size used as the occupancy denominator (0 = record count)
    #[cfg_attr(feature = "cli", arg(long, default_value = "0"))]
    pub total_units: usize,

    /// Monthly revenue budget in AED, for the variance statistic
    #[cfg_attr(feature = "cli", arg(long, default_value = "0"))]
    pub monthly_budget: f64,

    /// Monthly operating expenses in AED, for the profit-margin statistic
    #[cfg_attr(feature = "cli", arg(long, default_value = "0"))]
    pub monthly_expenses: f64,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable system monitoring"))]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn rent_fields(&self) -> &[String] {
        &self.rent_fields
    }

    fn max_records(&self) -> Option<usize> {
        self.max_records
    }

    fn total_units(&self) -> usize {
        self.total_units
    }

    fn monthly_budget(&self) -> f64 {
        self.monthly_budget
    }

    fn monthly_expenses(&self) -> f64 {
        self.monthly_expenses
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_path("output_path", &self.output_path)?;
        for field in &self.rent_fields {
            validation::validate_non_empty_string("rent_fields", field)?;
        }
        validation::validate_non_negative_amount("monthly_budget", self.monthly_budget)?;
        validation::validate_non_negative_amount("monthly_expenses", self.monthly_expenses)?;
        Ok(())
    }
}
