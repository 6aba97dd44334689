use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub extract: ExtractConfig,
    pub report: Option<ReportConfig>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: String,
    pub endpoint: String,
    pub method: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
    pub parameters: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub max_records: Option<usize>,
    /// Fields probed in order for the raw rent figure
    pub rent_fields: Option<Vec<String>>,
    pub field_mapping: Option<HashMap<String, String>>,
}

/// Portfolio-level inputs to the dashboard statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub total_units: Option<usize>,
    pub monthly_budget: Option<f64>,
    pub monthly_expenses: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
    pub include_flagged: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

const DEFAULT_RENT_FIELDS: [&str; 3] = ["rentAmount", "currentRent", "rent"];

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: TomlConfig =
            toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        if config.extract.rent_fields.is_none() {
            config.extract.rent_fields =
                Some(DEFAULT_RENT_FIELDS.iter().map(|s| s.to_string()).collect());
        }

        Ok(config)
    }

    /// 替換環境變數 (例如 ${API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        // 環境變數未設定時,替換會留下 ${VAR} 佔位符
        if self.source.endpoint.contains("${") {
            return Err(EtlError::MissingConfigError {
                field: "source.endpoint".to_string(),
            });
        }

        validation::validate_url("source.endpoint", &self.source.endpoint)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;

        if let Some(fields) = &self.extract.rent_fields {
            validation::validate_positive_number("extract.rent_fields", fields.len(), 1)?;
            for field in fields {
                validation::validate_non_empty_string("extract.rent_fields", field)?;
            }
        }

        if let Some(report) = &self.report {
            if let Some(budget) = report.monthly_budget {
                validation::validate_non_negative_amount("report.monthly_budget", budget)?;
            }
            if let Some(expenses) = report.monthly_expenses {
                validation::validate_non_negative_amount("report.monthly_expenses", expenses)?;
            }
        }

        // 驗證輸出格式
        let valid_formats = ["csv", "tsv", "json"];
        for format in &self.load.output_formats {
            if !valid_formats.contains(&format.as_str()) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "load.output_formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        valid_formats.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn rent_fields(&self) -> &[String] {
        self.extract.rent_fields.as_deref().unwrap_or(&[])
    }

    fn max_records(&self) -> Option<usize> {
        self.extract.max_records
    }

    fn total_units(&self) -> usize {
        self.report
            .as_ref()
            .and_then(|r| r.total_units)
            .unwrap_or(0)
    }

    fn monthly_budget(&self) -> f64 {
        self.report
            .as_ref()
            .and_then(|r| r.monthly_budget)
            .unwrap_or(0.0)
    }

    fn monthly_expenses(&self) -> f64 {
        self.report
            .as_ref()
            .and_then(|r| r.monthly_expenses)
            .unwrap_or(0.0)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[pipeline]
name = "rent-roll"
description = "Monthly rent-roll report"
version = "1.0.0"

[source]
type = "api"
endpoint = "https://api.example.com/tenants"

[extract]
max_records = 100

[report]
total_units = 24
monthly_budget = 120000.0
monthly_expenses = 35000.0

[load]
output_path = "./test-output"
output_formats = ["csv", "json"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.pipeline.name, "rent-roll");
        assert_eq!(config.source.endpoint, "https://api.example.com/tenants");
        assert_eq!(config.max_records(), Some(100));
        assert_eq!(config.total_units(), 24);
        assert_eq!(config.monthly_budget(), 120000.0);
        // Defaulted probe order
        assert_eq!(
            config.rent_fields(),
            ["rentAmount", "currentRent", "rent"]
        );
    }

    #[test]
    fn test_explicit_rent_fields_win_over_default() {
        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
type = "api"
endpoint = "https://api.example.com"

[extract]
rent_fields = ["currentRent"]

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.rent_fields(), ["currentRent"]);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_TENANT_API", "https://tenants.test.api");

        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
type = "api"
endpoint = "${TEST_TENANT_API}"

[extract]

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.endpoint, "https://tenants.test.api");

        std::env::remove_var("TEST_TENANT_API");
    }

    #[test]
    fn test_unresolved_placeholder_fails_validation() {
        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
type = "api"
endpoint = "${DEFINITELY_UNSET_TENANT_API}"

[extract]

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, EtlError::MissingConfigError { .. }));
    }

    #[test]
    fn test_config_validation_rejects_bad_endpoint() {
        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
type = "api"
endpoint = "invalid-url"

[extract]

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_negative_budget() {
        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
type = "api"
endpoint = "https://api.example.com"

[extract]

[report]
monthly_budget = -5.0

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_unknown_format() {
        let toml_content = r#"
[pipeline]
name = "test"
description = "test"
version = "1.0"

[source]
type = "api"
endpoint = "https://api.example.com"

[extract]

[load]
output_path = "./output"
output_formats = ["xlsx"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[pipeline]
name = "file-test"
description = "File test"
version = "1.0"

[source]
type = "api"
endpoint = "https://api.example.com"

[extract]

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "file-test");
    }
}
