// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

/// 将图片文件编码为 base64 字符串
///
/// 读取文件的全部字节并按标准 base64 编码，
/// 不做任何尺寸调整或格式校验，空文件编码为空字符串
///
/// # 错误
///
/// 文件不存在或不可读时返回 IO 错误
pub fn encode_image(image_path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(image_path)?;
    Ok(STANDARD.encode(bytes))
}
