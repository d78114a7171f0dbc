// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::record::ExtractedRecord;

/// 处理结果实体
///
/// 表示一次完整批处理运行的聚合结果，由处理器构建一次，
/// 供 CSV 写入和摘要日志消费后丢弃，不做持久化。
/// `all_results` 的顺序 = 图片处理顺序，再按单张图片响应内的行顺序
#[derive(Debug, Clone, Default)]
pub struct ProcessingResult {
    /// 处理的图片总数
    pub total_images: usize,
    /// 成功提取到记录的图片数
    pub successful_images: usize,
    /// 失败图片的文件名列表（按处理顺序）
    pub failed_images: Vec<String>,
    /// 提取到的记录总数
    pub total_records: usize,
    /// 全部提取记录的平铺列表
    pub all_results: Vec<ExtractedRecord>,
}

impl ProcessingResult {
    /// 计算成功率（百分比）
    ///
    /// 图片总数为 0 时定义为 0.0
    pub fn success_rate(&self) -> f64 {
        if self.total_images == 0 {
            return 0.0;
        }
        (self.successful_images as f64 / self.total_images as f64) * 100.0
    }
}
