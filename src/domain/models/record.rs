// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 提取记录实体
///
/// 表示输出数据的一行：字段名到字符串值的映射。
/// "filename" 字段始终由提取服务根据源文件路径注入，
/// 不来自 API 响应。记录身份是位置性的（每个检测到的
/// 表格行对应一条记录），全局不做唯一性约束
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedRecord {
    fields: HashMap<String, String>,
}

impl ExtractedRecord {
    /// 创建一个空记录
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一个字段值
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// 读取字段值，缺失的字段返回空字符串
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ExtractedRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        let mut record = Self::new();
        for (field, value) in pairs {
            record.insert(field, value);
        }
        record
    }
}
