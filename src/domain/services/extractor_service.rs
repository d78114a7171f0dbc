// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use tracing::debug;

use crate::config::settings::OpenAiSettings;
use crate::domain::models::record::ExtractedRecord;
use crate::utils::errors::ExtractionError;
use crate::utils::image_utils::encode_image;

/// 发送给视觉模型的固定指令，描述表格布局和期望的 JSON 数组输出格式
const EXTRACTION_PROMPT: &str = r#"This image contains a table with three columns: Email, First name, and Name (Full name).

Please extract the following information from all rows in the table (excluding the header row):
1. Email (email address)
2. First name
3. Name (full name)

Return in the following JSON array format (JSON only, no explanation):
[
  {
    "email": "extracted email address 1",
    "firstname": "extracted first name 1",
    "name": "extracted full name 1"
  }
]

Extract all rows. If no data is found, return an empty array."#;

#[async_trait]
pub trait ExtractorService: Send + Sync {
    async fn extract_all_info(
        &self,
        image_path: &Path,
    ) -> Result<Vec<ExtractedRecord>, ExtractionError>;
}

/// 视觉模型响应中的单行表格数据，缺失字段默认为空字符串
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    email: String,
    #[serde(default)]
    firstname: String,
    #[serde(default)]
    name: String,
}

/// 图片数据提取服务 - 处理与视觉模型提供商的交互
///
/// # 功能
///
/// 对单张图片发起一次同步的视觉补全请求，清理响应中的
/// Markdown 代码围栏，解析 JSON 数组并为每行注入源文件名
///
/// # 错误
///
/// * `ExtractionError::Api` - 清理后的文本无法解析为 JSON
/// * `ExtractionError::ImageProcessing` - 其他所有失败（编码、网络、响应结构）
pub struct ImageDataExtractor {
    client: reqwest::Client,
    openai: OpenAiSettings,
}

#[async_trait]
impl ExtractorService for ImageDataExtractor {
    async fn extract_all_info(
        &self,
        image_path: &Path,
    ) -> Result<Vec<ExtractedRecord>, ExtractionError> {
        ImageDataExtractor::extract_all_info(self, image_path).await
    }
}

impl ImageDataExtractor {
    pub fn new(openai: OpenAiSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            openai,
        }
    }

    /// 使用视觉模型从图片中提取全部表格信息
    ///
    /// # 参数
    /// * `image_path` - 图片文件路径
    ///
    /// # 返回值
    /// * `Result<Vec<ExtractedRecord>, ExtractionError>` - 提取的记录列表（可能为空）
    pub async fn extract_all_info(
        &self,
        image_path: &Path,
    ) -> Result<Vec<ExtractedRecord>, ExtractionError> {
        let image = image_path.display().to_string();

        let content = self
            .request_table_content(image_path)
            .await
            .map_err(|source| ExtractionError::ImageProcessing {
                image: image.clone(),
                source,
            })?;

        let cleaned = strip_markdown_fences(&content);
        debug!(image = %image, "Cleaned vision response: {}", cleaned);

        let rows: Vec<RawRecord> = serde_json::from_str(cleaned)
            .map_err(|source| ExtractionError::Api {
                image: image.clone(),
                source,
            })?;

        let filename = image_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();

        let records = rows
            .into_iter()
            .map(|row| {
                let mut record = ExtractedRecord::new();
                record.insert("filename", filename.clone());
                record.insert("email", row.email);
                record.insert("firstname", row.firstname);
                record.insert("name", row.name);
                record
            })
            .collect();

        Ok(records)
    }

    /// 发起一次视觉补全请求并返回首个 choice 的文本内容
    async fn request_table_content(&self, image_path: &Path) -> Result<String> {
        let base64_image = encode_image(image_path).context("Failed to read image file")?;

        let request_body = json!({
            "model": self.openai.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "text",
                            "text": EXTRACTION_PROMPT
                        },
                        {
                            "type": "image_url",
                            "image_url": {
                                "url": format!("data:image/png;base64,{}", base64_image)
                            }
                        }
                    ]
                }
            ],
            "max_tokens": self.openai.max_tokens(),
            "temperature": self.openai.temperature()
        });

        let url = format!("{}/chat/completions", self.openai.api_base_url);
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.openai.api_key()))
            .json(&request_body)
            .send()
            .await
            .context("Failed to send request to vision API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Vision API returned error: {} - {}",
                status,
                error_text
            ));
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse vision API response")?;

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("Invalid response format from vision API"))?;

        Ok(content.trim().to_string())
    }
}

/// 去除响应文本首尾的 Markdown 代码围栏
///
/// 依次剥离开头的 "```json"、开头的 "```" 和结尾的 "```"
fn strip_markdown_fences(content: &str) -> &str {
    let mut content = content.trim();
    if let Some(rest) = content.strip_prefix("```json") {
        content = rest;
    }
    if let Some(rest) = content.strip_prefix("```") {
        content = rest;
    }
    if let Some(rest) = content.strip_suffix("```") {
        content = rest;
    }
    content.trim()
}
