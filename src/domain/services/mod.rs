// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含系统的核心业务逻辑服务：
/// - 提取服务（extractor_service）：调用视觉模型从单张图片中提取表格数据
/// - 处理服务（processor_service）：按顺序批处理图片、聚合结果并输出 CSV
pub mod extractor_service;
pub mod processor_service;
