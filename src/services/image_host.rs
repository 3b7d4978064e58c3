//! Upload client for the external image host.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct ImageHost {
    client: Client,
    upload_url: String,
    api_key: Option<String>,
    max_bytes: usize,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: Option<UploadData>,
    error: Option<UploadError>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadError {
    message: String,
}

/// An image to upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageHost {
    pub fn new(upload_url: &str, api_key: Option<String>, max_bytes: usize) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            upload_url: upload_url.to_string(),
            api_key,
            max_bytes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.image_host_url,
            config.image_host_api_key.clone(),
            config.max_upload_bytes,
        )
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Check size and type before anything leaves the process.
    pub fn check(&self, upload: &ImageUpload) -> Result<()> {
        if upload.bytes.is_empty() {
            return Err(Error::InvalidInput("uploaded file is empty".to_string()));
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(Error::FileTooLarge { max_size: self.max_bytes });
        }
        let content_type: mime::Mime = upload
            .content_type
            .parse()
            .map_err(|_| Error::InvalidFileType(upload.content_type.clone()))?;
        if content_type.type_() != mime::IMAGE {
            return Err(Error::InvalidFileType(upload.content_type.clone()));
        }
        Ok(())
    }

    /// Upload an image and return its public URL.
    pub async fn upload(&self, upload: ImageUpload) -> Result<String> {
        self.check(&upload)?;

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("IMAGE_HOST_API_KEY is not set".to_string()))?;

        let size = upload.bytes.len();
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|_| Error::InvalidFileType(upload.content_type.clone()))?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(&self.upload_url)
            .query(&[("key", api_key)])
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::ImageHost(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::ImageHost(format!("Failed to read response: {}", e)))?;

        let parsed: UploadResponse = serde_json::from_str(&text)
            .map_err(|_| Error::ImageHost(format!("Host returned {}: {}", status, text)))?;

        if !status.is_success() {
            let message = parsed
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| status.to_string());
            return Err(Error::ImageHost(message));
        }

        let url = parsed
            .data
            .map(|d| d.url)
            .ok_or_else(|| Error::ImageHost("response did not include a URL".to_string()))?;

        info!(file = %upload.file_name, size, "image uploaded");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> ImageHost {
        ImageHost::new("http://localhost:1/upload", Some("key".into()), 16)
    }

    fn image(content_type: &str, len: usize) -> ImageUpload {
        ImageUpload {
            file_name: "cover.png".into(),
            content_type: content_type.into(),
            bytes: vec![0u8; len],
        }
    }

    #[test]
    fn accepts_small_images() {
        assert!(host().check(&image("image/png", 8)).is_ok());
        assert!(host().check(&image("image/jpeg", 16)).is_ok());
    }

    #[test]
    fn rejects_oversized_empty_and_non_images() {
        assert!(matches!(
            host().check(&image("image/png", 17)),
            Err(Error::FileTooLarge { max_size: 16 })
        ));
        assert!(matches!(host().check(&image("image/png", 0)), Err(Error::InvalidInput(_))));
        assert!(matches!(
            host().check(&image("application/pdf", 4)),
            Err(Error::InvalidFileType(_))
        ));
        assert!(matches!(host().check(&image("not a mime", 4)), Err(Error::InvalidFileType(_))));
    }
}
