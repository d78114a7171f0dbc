// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tracing::{error, info, warn};

use extractrs::config::settings::Settings;
use extractrs::domain::services::extractor_service::ImageDataExtractor;
use extractrs::domain::services::processor_service::DataProcessor;
use extractrs::utils::telemetry;

/// 主函数
///
/// 应用程序入口点：装配配置、提取服务和处理服务，
/// 执行批处理并将结果映射为进程退出码
/// （0 = 运行完成，1 = 配置错误、用户中断或未预期错误）
#[tokio::main]
async fn main() {
    // 1. Initialize logging
    telemetry::init_telemetry();

    std::process::exit(run().await);
}

async fn run() -> i32 {
    // 2. Load .env then build configuration (fails fast before any API call)
    dotenvy::dotenv().ok();

    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Configuration error: {}", e);
            return 1;
        }
    };

    info!("Configuration:");
    info!("  - Model: {}", settings.openai.model);
    info!("  - Max tokens: {}", settings.openai.max_tokens());
    info!("  - Temperature: {}", settings.openai.temperature());
    info!("  - API key: {}", settings.openai.masked_api_key());
    info!("  - Image folder: {}", settings.images.folder_path.display());
    info!("  - Output file: {}", settings.output_file);
    info!("Extraction fields: {}", settings.extract_fields.join(", "));

    let image_files = match settings.images.image_files() {
        Ok(files) => files,
        Err(e) => {
            error!("Configuration error: {}", e);
            return 1;
        }
    };

    // 3. Initialize services
    let extractor = Arc::new(ImageDataExtractor::new(settings.openai.clone()));
    let processor = DataProcessor::new(
        extractor,
        settings.output_file.clone(),
        settings.extract_fields.clone(),
    );

    info!("Processing {} images...", image_files.len());
    warn!("Note: vision extraction may take some time");

    // 4. Process images (Ctrl-C aborts the batch with a non-zero exit)
    let result = tokio::select! {
        result = processor.process_images(&image_files, true, None) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Process interrupted by user");
            return 1;
        }
    };

    // 5. Save results and display summary
    if let Err(e) = processor.save_to_csv(&result.all_results) {
        error!("Unexpected error: {:#}", e);
        return 1;
    }

    processor.log_summary(&result);
    0
}
