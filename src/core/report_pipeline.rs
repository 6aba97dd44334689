use crate::config::toml_config::TomlConfig;
use crate::core::pipeline::{build_report_zip, report_files, transform_records};
use crate::core::{ConfigProvider, Pipeline, Record, Storage, TransformResult};
use crate::utils::error::Result;
use reqwest::Client;
use std::collections::HashMap;

/// TOML-configured rent-roll pipeline. Unlike the generic
/// [`RentRollPipeline`](crate::core::pipeline::RentRollPipeline) it honors
/// the request options and field mapping a config file can carry.
pub struct TomlReportPipeline<S: Storage> {
    storage: S,
    config: TomlConfig,
    client: Client,
}

impl<S: Storage> TomlReportPipeline<S> {
    pub fn new(storage: S, config: TomlConfig) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    fn record_from_object(
        &self,
        obj: serde_json::Map<String, serde_json::Value>,
    ) -> Record {
        let mut data = HashMap::new();

        // 應用字段映射
        if let Some(field_mapping) = &self.config.extract.field_mapping {
            for (original_key, value) in obj {
                let mapped_key = field_mapping.get(&original_key).unwrap_or(&original_key);
                data.insert(mapped_key.clone(), value);
            }
        } else {
            for (key, value) in obj {
                data.insert(key, value);
            }
        }

        Record { data }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for TomlReportPipeline<S> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();

        tracing::info!(
            "🚀 Fetching tenant records from: {}",
            self.config.source.endpoint
        );

        // 構建請求
        let method = self.config.source.method.as_deref().unwrap_or("GET");
        let mut request = match method.to_uppercase().as_str() {
            "POST" => self.client.post(&self.config.source.endpoint),
            _ => self.client.get(&self.config.source.endpoint),
        };

        // 添加自定義標頭
        if let Some(headers) = &self.config.source.headers {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }

        // 添加查詢參數
        if let Some(params) = &self.config.source.parameters {
            for (key, value) in params {
                request = request.query(&[(key, value)]);
            }
        }

        // 設定超時
        if let Some(timeout) = self.config.source.timeout_seconds {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());

        if response.status().is_success() {
            let json_data: serde_json::Value = response.json().await?;

            match json_data {
                serde_json::Value::Array(items) => {
                    let max_records = self.config.max_records().unwrap_or(items.len());
                    for item in items.into_iter().take(max_records) {
                        if let serde_json::Value::Object(obj) = item {
                            records.push(self.record_from_object(obj));
                        }
                    }
                }
                serde_json::Value::Object(obj) => {
                    records.push(self.record_from_object(obj));
                }
                _ => {
                    tracing::warn!("Unexpected response shape, no records extracted");
                }
            }
        }

        tracing::info!("📊 Extracted {} records", records.len());
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
        let formats = &self.config.load.output_formats;
        let compression = self.config.load.compression.as_ref();
        let include_flagged = compression
            .and_then(|c| c.include_flagged)
            .unwrap_or(true);

        // 未配置壓縮時預設打包成 ZIP
        let compress = compression.map(|c| c.enabled).unwrap_or(true);

        if compress {
            let filename = compression
                .map(|c| c.filename.as_str())
                .unwrap_or("rent_roll.zip");
            let zip_data = build_report_zip(&result, formats, include_flagged)?;
            self.storage.write_file(filename, &zip_data).await?;

            let output_path = format!("{}/{}", self.config.output_path(), filename);
            tracing::info!("📦 Report bundle saved: {}", output_path);
            Ok(output_path)
        } else {
            let files = report_files(&result, formats, include_flagged)?;
            let count = files.len();
            for (name, contents) in files {
                self.storage.write_file(&name, contents.as_bytes()).await?;
            }

            let output_path = self.config.output_path().to_string();
            tracing::info!("📦 {} report files saved under: {}", count, output_path);
            Ok(output_path)
        }
    }
}
