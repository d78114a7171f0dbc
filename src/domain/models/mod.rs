// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 提取记录（record）：从图片表格的一行中提取出的数据
/// - 处理结果（processing_result）：一次完整批处理运行的聚合结果
pub mod processing_result;
pub mod record;
