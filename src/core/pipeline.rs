use crate::core::normalize::{clamp_triggered, coerce_amount, normalize_rent};
use crate::core::stats::{is_occupied, portfolio_stats, raw_rent_value, record_label};
use crate::core::{ConfigProvider, Pipeline, Record, Storage, TransformResult};
use crate::utils::currency::format_aed;
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub struct RentRollPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> RentRollPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }
}

/// Renders the rent roll as delimited rows. Shared between the generic and
/// TOML-driven pipelines.
pub(crate) fn render_rows(
    records: &[Record],
    rent_fields: &[String],
    delimiter: u8,
) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(["tenant", "unit", "status", "raw_rent", "monthly_rent_aed"])?;

    for (i, record) in records.iter().enumerate() {
        let label = record_label(record, i);
        let unit = record
            .data
            .get("unit")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        let status = record
            .data
            .get("status")
            .or_else(|| record.data.get("leaseStatus"))
            .and_then(|v| v.as_str())
            .unwrap_or(if is_occupied(record) { "active" } else { "vacant" });
        let raw = raw_rent_value(record, rent_fields);
        let monthly = normalize_rent(raw, &label);
        let raw_rent = format!("{}", coerce_amount(raw));
        let monthly_rent = format!("{:.2}", monthly);

        writer.write_record([
            label.as_str(),
            unit,
            status,
            raw_rent.as_str(),
            monthly_rent.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("CSV writer flush failed: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV output was not valid UTF-8: {}", e),
    })
}

/// Normalizes every record's rent, renders CSV/TSV, and reduces the snapshot
/// to the dashboard statistics.
pub(crate) fn transform_records(
    data: Vec<Record>,
    rent_fields: &[String],
    total_units: usize,
    monthly_budget: f64,
    monthly_expenses: f64,
) -> Result<TransformResult> {
    let mut processed_records = Vec::new();
    let mut flagged_records = Vec::new();

    for (i, record) in data.iter().enumerate() {
        let label = record_label(record, i);
        let raw = raw_rent_value(record, rent_fields);
        let monthly = normalize_rent(raw, &label);

        let mut processed = record.clone();
        processed
            .data
            .insert("monthlyRentAed".to_string(), serde_json::json!(monthly));
        processed.data.insert(
            "monthlyRentDisplay".to_string(),
            serde_json::Value::String(format_aed(monthly)),
        );

        // 觸發上限保護的記錄另外保留，供人工檢查
        if clamp_triggered(coerce_amount(raw)) {
            flagged_records.push(processed.clone());
        }

        processed_records.push(processed);
    }

    let stats = portfolio_stats(
        &data,
        rent_fields,
        total_units,
        monthly_budget,
        monthly_expenses,
    );

    tracing::info!(
        "💰 Monthly revenue: {} across {} records ({} flagged)",
        format_aed(stats.monthly_revenue),
        stats.record_count,
        flagged_records.len()
    );

    let csv_output = render_rows(&data, rent_fields, b',')?;
    let tsv_output = render_rows(&data, rent_fields, b'\t')?;

    Ok(TransformResult {
        processed_records,
        csv_output,
        tsv_output,
        stats,
        flagged_records,
    })
}

pub(crate) const ALL_OUTPUT_FORMATS: [&str; 3] = ["csv", "tsv", "json"];

/// Selects the report files a bundle should carry: `csv`/`tsv` are the rent
/// roll, `json` is the dashboard statistics. Flagged records ride along
/// whenever any exist and the caller wants them.
pub(crate) fn report_files(
    result: &TransformResult,
    formats: &[String],
    include_flagged: bool,
) -> Result<Vec<(String, String)>> {
    let mut files = Vec::new();

    for format in formats {
        match format.as_str() {
            "csv" => files.push(("rent_roll.csv".to_string(), result.csv_output.clone())),
            "tsv" => files.push(("rent_roll.tsv".to_string(), result.tsv_output.clone())),
            "json" => {
                let stats_json = serde_json::to_string_pretty(&result.stats)?;
                files.push(("stats.json".to_string(), stats_json));
            }
            other => {
                tracing::warn!("Skipping unknown output format: {}", other);
            }
        }
    }

    if include_flagged && !result.flagged_records.is_empty() {
        let flagged_json = serde_json::to_string_pretty(&result.flagged_records)?;
        files.push(("flagged.json".to_string(), flagged_json));
    }

    Ok(files)
}

/// Packs already-rendered report files into a ZIP archive.
pub(crate) fn zip_files(files: &[(String, String)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for (name, contents) in files {
        zip.start_file::<_, ()>(name, FileOptions::default())?;
        zip.write_all(contents.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Bundles the selected report files into a ZIP archive.
pub(crate) fn build_report_zip(
    result: &TransformResult,
    formats: &[String],
    include_flagged: bool,
) -> Result<Vec<u8>> {
    zip_files(&report_files(result, formats, include_flagged)?)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for RentRollPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();

        tracing::debug!("Making API request to: {}", self.config.api_endpoint());
        let response = self.client.get(self.config.api_endpoint()).send().await?;

        tracing::debug!("API response status: {}", response.status());

        if response.status().is_success() {
            let json_data: serde_json::Value = response.json().await?;

            // 假設 API 回傳租戶物件陣列
            if let serde_json::Value::Array(items) = json_data {
                let max_records = self.config.max_records().unwrap_or(items.len());
                for item in items.into_iter().take(max_records) {
                    if let serde_json::Value::Object(obj) = item {
                        let mut data = HashMap::new();
                        for (key, value) in obj {
                            data.insert(key, value);
                        }
                        records.push(Record { data });
                    }
                }
            } else if let serde_json::Value::Object(obj) = json_data {
                // 單一租戶物件也接受
                let mut data = HashMap::new();
                for (key, value) in obj {
                    data.insert(key, value);
                }
                records.push(Record { data });
            }
        }

        // 沒有 API 數據時產生示範租戶，報表流程仍可跑通
        if records.is_empty() {
            tracing::warn!("No data from API, generating sample tenants");
            let samples: [(&str, &str, serde_json::Value, &str); 4] = [
                ("Sample Tenant 1", "A-101", serde_json::json!(4500), "active"),
                ("Sample Tenant 2", "A-102", serde_json::json!(84000), "active"),
                ("Sample Tenant 3", "B-201", serde_json::json!(650000), "active"),
                ("Sample Tenant 4", "B-202", serde_json::Value::Null, "vacant"),
            ];
            for (name, unit, rent, status) in samples {
                let mut data = HashMap::new();
                data.insert(
                    "tenantName".to_string(),
                    serde_json::Value::String(name.to_string()),
                );
                data.insert(
                    "unit".to_string(),
                    serde_json::Value::String(unit.to_string()),
                );
                data.insert("rentAmount".to_string(), rent);
                data.insert(
                    "status".to_string(),
                    serde_json::Value::String(status.to_string()),
                );
                records.push(Record { data });
            }
        }

        Ok(records)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        transform_records(
            data,
            self.config.rent_fields(),
            self.config.total_units(),
            self.config.monthly_budget(),
            self.config.monthly_expenses(),
        )
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = format!("{}/rent_roll.zip", self.config.output_path());

        let formats: Vec<String> = ALL_OUTPUT_FORMATS.iter().map(|s| s.to_string()).collect();
        let files = report_files(&result, &formats, true)?;
        tracing::debug!("Creating ZIP file with {} files", files.len());

        let zip_data = zip_files(&files)?;

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file("rent_roll.zip", &zip_data).await?;

        tracing::debug!("ZIP file saved successfully");
        Ok(output_path)
    }
}
