// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::PathBuf;
use thiserror::Error;

/// 配置错误类型
///
/// 配置校验失败时返回，所有变体都是致命错误，
/// 在任何 API 调用发起之前终止进程
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY 未设置\n请创建 .env 文件并按如下格式配置:\nOPENAI_API_KEY=sk-...")]
    ApiKeyNotFound,

    #[error("OPENAI_API_KEY 无效\n请检查 .env 文件中的 API 密钥")]
    ApiKeyInvalid,

    #[error("图片文件夹不存在: {0}\n请创建该文件夹并放入图片文件")]
    ImageFolderNotFound(PathBuf),

    #[error("未找到图片文件: {0}\n支持的格式: .png, .jpg, .jpeg, .bmp, .tiff")]
    NoImageFiles(PathBuf),

    #[error("max_tokens 必须为正整数: {0}")]
    InvalidMaxTokens(i64),

    #[error("temperature 必须在 0.0 到 2.0 范围内: {0}")]
    InvalidTemperature(f64),

    #[error("配置加载失败: {0}")]
    Load(#[from] config::ConfigError),
}

/// 提取错误类型
///
/// 单张图片处理失败时返回，均为非致命错误，
/// 由处理器捕获并记录到失败列表后继续处理
///
/// 两个变体必须保持可区分：调用方依赖变体类型判断失败原因
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// 清理后的响应文本无法解析为 JSON 数组
    #[error("JSON 解析错误: {image}")]
    Api {
        image: String,
        #[source]
        source: serde_json::Error,
    },

    /// 其他所有失败（编码、网络、响应结构异常）
    #[error("处理图片时发生错误: {image}")]
    ImageProcessing {
        image: String,
        #[source]
        source: anyhow::Error,
    },
}
