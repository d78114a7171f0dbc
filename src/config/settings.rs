// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::errors::ConfigError;

/// 默认使用的视觉模型
pub const DEFAULT_MODEL: &str = "gpt-4o";
/// 默认最大输出令牌数
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
/// 默认温度值
pub const DEFAULT_TEMPERATURE: f64 = 0.0;
/// 支持的图片扩展名（不区分大小写）
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tiff"];

const API_KEY_PLACEHOLDER: &str = "your-api-key-here";

/// 应用程序配置设置
///
/// 组合 OpenAI API 配置、图片文件夹配置、输出文件和提取字段列表，
/// 在构造时完成全部校验（快速失败）
#[derive(Debug, Clone)]
pub struct Settings {
    /// OpenAI API 配置
    pub openai: OpenAiSettings,
    /// 图片文件夹配置
    pub images: ImageFolderSettings,
    /// 输出 CSV 文件路径
    pub output_file: String,
    /// 提取字段列表（同时决定 CSV 列顺序）
    pub extract_fields: Vec<String>,
}

/// OpenAI API 配置设置
///
/// `max_tokens` 与 `temperature` 为受保护的可变项：
/// 非法写入返回错误且不改变现有值
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    api_key: String,
    /// 使用的模型名称
    pub model: String,
    max_tokens: u32,
    temperature: f64,
    /// API 基础 URL（测试时可指向本地 mock 服务）
    pub api_base_url: String,
}

/// 图片文件夹配置设置
#[derive(Debug, Clone)]
pub struct ImageFolderSettings {
    /// 图片文件夹路径
    pub folder_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    openai: RawOpenAiSettings,
    images: RawImageSettings,
    output_file: String,
    extract_fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawOpenAiSettings {
    model: String,
    max_tokens: i64,
    temperature: f64,
    api_base_url: String,
}

#[derive(Debug, Deserialize)]
struct RawImageSettings {
    folder: String,
}

/// 校验 OpenAI API 密钥
///
/// # 错误
///
/// * `ApiKeyNotFound` - 密钥未设置或为空
/// * `ApiKeyInvalid` - 密钥为占位符或缺少 "sk-" 前缀
pub fn validate_api_key(api_key: &str) -> Result<(), ConfigError> {
    if api_key.is_empty() {
        return Err(ConfigError::ApiKeyNotFound);
    }
    if api_key == API_KEY_PLACEHOLDER {
        return Err(ConfigError::ApiKeyInvalid);
    }
    if !api_key.starts_with("sk-") {
        return Err(ConfigError::ApiKeyInvalid);
    }
    Ok(())
}

fn validate_max_tokens(value: i64) -> Result<u32, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::InvalidMaxTokens(value));
    }
    u32::try_from(value).map_err(|_| ConfigError::InvalidMaxTokens(value))
}

fn validate_temperature(value: f64) -> Result<f64, ConfigError> {
    if !(0.0..=2.0).contains(&value) {
        return Err(ConfigError::InvalidTemperature(value));
    }
    Ok(value)
}

impl OpenAiSettings {
    /// 创建新的 OpenAI 配置
    ///
    /// 构造时执行与 setter 相同的范围校验
    pub fn new(
        api_key: String,
        model: String,
        max_tokens: i64,
        temperature: f64,
        api_base_url: String,
    ) -> Result<Self, ConfigError> {
        validate_api_key(&api_key)?;
        let max_tokens = validate_max_tokens(max_tokens)?;
        let temperature = validate_temperature(temperature)?;
        Ok(Self {
            api_key,
            model,
            max_tokens,
            temperature,
            api_base_url,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// 设置最大令牌数
    ///
    /// # 错误
    ///
    /// 非正数时返回 `InvalidMaxTokens`，现有值保持不变
    pub fn set_max_tokens(&mut self, value: i64) -> Result<(), ConfigError> {
        self.max_tokens = validate_max_tokens(value)?;
        Ok(())
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// 设置温度值
    ///
    /// # 错误
    ///
    /// 超出 [0.0, 2.0] 范围时返回 `InvalidTemperature`，现有值保持不变
    pub fn set_temperature(&mut self, value: f64) -> Result<(), ConfigError> {
        self.temperature = validate_temperature(value)?;
        Ok(())
    }

    /// 获取脱敏的 API 密钥（用于日志输出）
    ///
    /// 例如 `***l2AA`
    pub fn masked_api_key(&self) -> String {
        if self.api_key.len() > 4 {
            format!("***{}", &self.api_key[self.api_key.len() - 4..])
        } else {
            "***".to_string()
        }
    }
}

impl ImageFolderSettings {
    pub fn new(folder_path: impl Into<PathBuf>) -> Self {
        Self {
            folder_path: folder_path.into(),
        }
    }

    /// 校验图片文件夹是否存在
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.folder_path.exists() {
            return Err(ConfigError::ImageFolderNotFound(self.folder_path.clone()));
        }
        Ok(())
    }

    /// 获取图片文件夹中的图片文件
    ///
    /// 非递归扫描，按扩展名过滤（不区分大小写），
    /// 返回按字典序排序的路径列表。排序决定输出行顺序，
    /// 对同一文件夹必须在多次运行间保持稳定
    ///
    /// # 错误
    ///
    /// * `ImageFolderNotFound` - 文件夹不存在
    /// * `NoImageFiles` - 文件夹中没有可识别的图片文件
    pub fn image_files(&self) -> Result<Vec<PathBuf>, ConfigError> {
        self.validate()?;

        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.folder_path)
            .map_err(|_| ConfigError::ImageFolderNotFound(self.folder_path.clone()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_supported_image(path))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(ConfigError::NoImageFiles(self.folder_path.clone()));
        }

        Ok(files)
    }
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 加载顺序：内置默认值 -> `config/default.toml`（可选）->
    /// `EXTRACTRS__*` 环境变量。API 密钥单独从 `OPENAI_API_KEY`
    /// 环境变量读取（`.env` 文件由入口点预先加载）
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 校验通过的配置
    /// * `Err(ConfigError)` - 配置加载或校验失败
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            // Default OpenAI settings
            .set_default("openai.model", DEFAULT_MODEL)?
            .set_default("openai.max_tokens", DEFAULT_MAX_TOKENS as i64)?
            .set_default("openai.temperature", DEFAULT_TEMPERATURE)?
            .set_default("openai.api_base_url", "https://api.openai.com/v1")?
            // Default folder and output settings
            .set_default("images.folder", "images")?
            .set_default("output_file", "extracted_data_gpt_all.csv")?
            .set_default("extract_fields", vec!["filename", "email", "firstname", "name"])?
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("EXTRACTRS").separator("__"));

        let raw: RawSettings = builder.build()?.try_deserialize()?;

        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let openai = OpenAiSettings::new(
            api_key,
            raw.openai.model,
            raw.openai.max_tokens,
            raw.openai.temperature,
            raw.openai.api_base_url,
        )?;

        let images = ImageFolderSettings::new(raw.images.folder);
        images.validate()?;

        Ok(Self {
            openai,
            images,
            output_file: raw.output_file,
            extract_fields: raw.extract_fields,
        })
    }
}
