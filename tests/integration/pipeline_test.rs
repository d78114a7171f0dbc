// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use extractrs::config::settings::{ImageFolderSettings, OpenAiSettings};
use extractrs::domain::services::extractor_service::ImageDataExtractor;
use extractrs::domain::services::processor_service::DataProcessor;
use extractrs::utils::image_utils::encode_image;
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [
            { "message": { "role": "assistant", "content": content } }
        ]
    })
}

/// 端到端流水线测试：临时图片文件夹 -> mock 视觉 API -> CSV 输出
///
/// 三张图片分别覆盖：多行提取成功（带 Markdown 围栏）、
/// 空数组响应（按失败处理）、HTTP 错误响应（按失败处理）
#[tokio::test]
async fn test_full_pipeline_with_mixed_outcomes() {
    let server = MockServer::start().await;

    let images_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let output_file = output_dir.path().join("extracted.csv");

    let image_a = images_dir.path().join("01_contacts.png");
    let image_b = images_dir.path().join("02_blank.jpg");
    let image_c = images_dir.path().join("03_broken.png");
    std::fs::write(&image_a, b"image-alpha").unwrap();
    std::fs::write(&image_b, b"image-beta").unwrap();
    std::fs::write(&image_c, b"image-gamma").unwrap();
    // A non-image file that the folder scan must ignore
    std::fs::write(images_dir.path().join("notes.txt"), b"skip me").unwrap();

    // Requests carry the base64 payload of the source image, which lets the
    // mock route each image to its own scripted response
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains(encode_image(&image_a).unwrap()))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "```json\n[\n  {\"email\": \"jane@example.com\", \"firstname\": \"Jane\", \"name\": \"Jane Doe\"},\n  {\"email\": \"bob@example.com\", \"firstname\": \"Bob\", \"name\": \"Bob Roe\"}\n]\n```",
        )))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains(encode_image(&image_b).unwrap()))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("[]")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains(encode_image(&image_c).unwrap()))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
        .mount(&server)
        .await;

    let openai = OpenAiSettings::new(
        "sk-test123456".to_string(),
        "gpt-4o".to_string(),
        2000,
        0.0,
        server.uri(),
    )
    .unwrap();

    let folder = ImageFolderSettings::new(images_dir.path());
    let image_files = folder.image_files().unwrap();
    assert_eq!(image_files.len(), 3);

    let fields: Vec<String> = ["filename", "email", "firstname", "name"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let extractor = Arc::new(ImageDataExtractor::new(openai));
    let processor = DataProcessor::new(extractor, &output_file, fields);

    let progress: Mutex<Vec<(usize, usize, String)>> = Mutex::new(Vec::new());
    let callback = |index: usize, total: usize, name: &str| {
        progress.lock().unwrap().push((index, total, name.to_string()));
    };

    let result = processor
        .process_images(&image_files, true, Some(&callback))
        .await;

    assert_eq!(result.total_images, 3);
    assert_eq!(result.successful_images, 1);
    assert_eq!(
        result.failed_images,
        vec!["02_blank.jpg".to_string(), "03_broken.png".to_string()]
    );
    assert_eq!(result.total_records, 2);
    let expected_rate = (1.0 / 3.0) * 100.0;
    assert!((result.success_rate() - expected_rate).abs() < 1e-9);

    // The callback fires for every image, success or not
    let progress = progress.into_inner().unwrap();
    assert_eq!(progress.len(), 3);
    assert_eq!(progress[0], (1, 3, "01_contacts.png".to_string()));
    assert_eq!(progress[2], (3, 3, "03_broken.png".to_string()));

    processor.save_to_csv(&result.all_results).unwrap();

    let mut reader = csv::Reader::from_path(&output_file).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["filename", "email", "firstname", "name"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "01_contacts.png");
    assert_eq!(&rows[0][1], "jane@example.com");
    assert_eq!(&rows[1][2], "Bob");

    processor.log_summary(&result);
}
