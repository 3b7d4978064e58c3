use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ledgerly::services::{ImageHost, ImageUpload};
use ledgerly::Error;

fn png(len: usize) -> ImageUpload {
    ImageUpload {
        file_name: "cover.png".into(),
        content_type: "image/png".into(),
        bytes: vec![7u8; len],
    }
}

#[tokio::test]
async fn upload_returns_hosted_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/upload"))
        .and(query_param("key", "img-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"url": "https://i.example/abc/cover.png", "id": "abc"},
            "success": true,
            "status": 200
        })))
        .expect(1)
        .mount(&server)
        .await;

    let host = ImageHost::new(&format!("{}/1/upload", server.uri()), Some("img-key".into()), 4096);
    let url = host.upload(png(128)).await.unwrap();

    assert_eq!(url, "https://i.example/abc/cover.png");
}

#[tokio::test]
async fn host_rejection_is_an_image_host_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status_code": 400,
            "error": {"message": "Invalid API v1 key.", "code": 100}
        })))
        .mount(&server)
        .await;

    let host = ImageHost::new(&server.uri(), Some("bad".into()), 4096);
    let err = host.upload(png(16)).await.unwrap_err();

    assert!(matches!(err, Error::ImageHost(ref m) if m == "Invalid API v1 key."));
}

#[tokio::test]
async fn oversized_files_are_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let host = ImageHost::new(&server.uri(), Some("img-key".into()), 64);
    let err = host.upload(png(65)).await.unwrap_err();

    assert!(matches!(err, Error::FileTooLarge { max_size: 64 }));
}
