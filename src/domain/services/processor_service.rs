// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::models::processing_result::ProcessingResult;
use crate::domain::models::record::ExtractedRecord;
use crate::domain::services::extractor_service::ExtractorService;

/// 进度回调：每处理完一张图片（无论成败）以 (序号, 总数, 文件名) 调用一次
pub type ProgressCallback<'a> = &'a (dyn Fn(usize, usize, &str) + Send + Sync);

/// 摘要日志中每张图片最多展示的样例记录数
const MAX_SAMPLE_RECORDS: usize = 3;

/// 数据处理服务
///
/// 按列表顺序逐张处理图片：调用提取服务，把成功结果累积到
/// 平铺列表，失败的图片记入失败列表后继续处理（跳过而非重试，
/// 单张图片的失败永远不会中止整个批次）。
/// 另外提供 CSV 写出和摘要日志输出
pub struct DataProcessor {
    extractor: Arc<dyn ExtractorService>,
    output_file: PathBuf,
    fields: Vec<String>,
}

impl DataProcessor {
    /// 创建新的数据处理服务
    ///
    /// # 参数
    ///
    /// * `extractor` - 提取服务
    /// * `output_file` - 输出 CSV 文件路径
    /// * `fields` - 提取和输出的字段列表（决定 CSV 列顺序）
    pub fn new(
        extractor: Arc<dyn ExtractorService>,
        output_file: impl Into<PathBuf>,
        fields: Vec<String>,
    ) -> Self {
        Self {
            extractor,
            output_file: output_file.into(),
            fields,
        }
    }

    /// 批量处理图片文件
    ///
    /// 提取服务返回空列表与返回错误都按失败处理，
    /// 图片文件名恰好被记入失败列表一次，随后继续处理下一张
    ///
    /// # 参数
    ///
    /// * `image_files` - 待处理的图片文件列表（顺序决定输出行顺序）
    /// * `verbose` - 是否输出详细进度日志
    /// * `progress_callback` - 可选的进度回调
    pub async fn process_images(
        &self,
        image_files: &[PathBuf],
        verbose: bool,
        progress_callback: Option<ProgressCallback<'_>>,
    ) -> ProcessingResult {
        let total = image_files.len();
        let mut all_results: Vec<ExtractedRecord> = Vec::new();
        let mut total_records = 0;
        let mut failed_images: Vec<String> = Vec::new();

        for (i, image_file) in image_files.iter().enumerate() {
            let index = i + 1;
            let name = image_file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();

            if verbose {
                info!("Processing ({}/{}): {}", index, total, name);
            }

            match self.extractor.extract_all_info(image_file).await {
                Ok(records) if !records.is_empty() => {
                    if verbose {
                        info!("  Extracted {} records", records.len());
                        self.log_sample_records(&records);
                    }
                    total_records += records.len();
                    all_results.extend(records);
                }
                Ok(_) => {
                    failed_images.push(name.clone());
                    if verbose {
                        warn!("  No records found");
                    }
                }
                Err(e) => {
                    if verbose {
                        // Alternate display includes the wrapped cause chain
                        error!("  Error: {:#}", anyhow::Error::from(e));
                    }
                    failed_images.push(name.clone());
                }
            }

            if let Some(callback) = progress_callback {
                callback(index, total, &name);
            }
        }

        ProcessingResult {
            total_images: total,
            successful_images: total - failed_images.len(),
            failed_images,
            total_records,
            all_results,
        }
    }

    fn log_sample_records(&self, records: &[ExtractedRecord]) {
        for (j, record) in records.iter().take(MAX_SAMPLE_RECORDS).enumerate() {
            // Display the first two configured fields
            let display_fields: Vec<&str> = self
                .fields
                .iter()
                .take(2)
                .map(|field| record.get(field))
                .filter(|value| !value.is_empty())
                .collect();
            info!("    {}. {}", j + 1, display_fields.join(" - "));
        }

        if records.len() > MAX_SAMPLE_RECORDS {
            info!("    ... and {} more", records.len() - MAX_SAMPLE_RECORDS);
        }
    }

    /// 将记录列表写出为 CSV 文件
    ///
    /// 表头为配置的字段列表，每条记录一行，记录中缺失的字段
    /// 输出为空字符串。整个文件在一次操作中覆盖写入
    pub fn save_to_csv(&self, results: &[ExtractedRecord]) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.output_file).with_context(|| {
            format!("Failed to create output file: {}", self.output_file.display())
        })?;

        writer
            .write_record(&self.fields)
            .context("Failed to write CSV header")?;

        for record in results {
            writer
                .write_record(self.fields.iter().map(|field| record.get(field)))
                .context("Failed to write CSV record")?;
        }

        writer.flush().context("Failed to flush CSV output")?;
        Ok(())
    }

    /// 输出处理摘要日志
    pub fn log_summary(&self, result: &ProcessingResult) {
        info!("Complete! Data saved to {}", self.output_file.display());
        info!("Results Summary:");
        info!("  - Images: {}", result.total_images);
        info!("  - Successful: {}", result.successful_images);
        info!("  - Failed: {}", result.failed_images.len());
        info!("  - Success rate: {:.1}%", result.success_rate());
        info!("  - Total records: {}", result.total_records);

        if !result.failed_images.is_empty() {
            warn!("Failed images:");
            for img in &result.failed_images {
                warn!("  - {}", img);
            }
        }
    }
}
