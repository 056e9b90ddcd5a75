use crate::utils::error::CustomError;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::env;

/// Cloudinary configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub upload_preset: Option<String>,
}

impl CloudinaryConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            cloud_name: env::var("CLOUDINARY_CLOUD_NAME")
                .map_err(|_| "CLOUDINARY_CLOUD_NAME is required")?,
            api_key: env::var("CLOUDINARY_API_KEY")
                .map_err(|_| "CLOUDINARY_API_KEY is required")?,
            api_secret: env::var("CLOUDINARY_API_SECRET")
                .map_err(|_| "CLOUDINARY_API_SECRET is required")?,
            upload_preset: env::var("CLOUDINARY_UPLOAD_PRESET").ok(),
        })
    }

    pub fn upload_url(&self, resource_type: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/{}/upload",
            self.cloud_name, resource_type
        )
    }

    /// Generate a signature for authenticated uploads. Cloudinary signs the
    /// params (timestamp included) sorted alphabetically by key, joined with
    /// `&`, with the API secret appended.
    pub fn generate_signature(&self, params: &[(&str, &str)], timestamp: i64) -> String {
        let timestamp = timestamp.to_string();
        let mut pairs: Vec<(&str, &str)> = params.to_vec();
        pairs.push(("timestamp", &timestamp));
        pairs.sort();

        let joined = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let to_sign = format!("{}{}", joined, self.api_secret);

        let mut hasher = Sha1::new();
        hasher.update(to_sign.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Response from the Cloudinary upload API (unused fields omitted)
#[derive(Debug, Deserialize)]
pub struct CloudinaryUploadResponse {
    pub public_id: String,
    pub format: String,
    pub bytes: u64,
    pub url: String,
    pub secure_url: String,
}

#[derive(Debug, Deserialize)]
pub struct CloudinaryError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CloudinaryErrorResponse {
    pub error: CloudinaryError,
}

/// A file held in memory, as extracted from a multipart request.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

impl FileUpload {
    pub fn new(file_name: String, data: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            file_name,
            data,
            content_type,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }
}

/// File validation configuration
#[derive(Debug, Clone)]
pub struct FileValidator {
    pub allowed_extensions: Vec<String>,
    pub max_file_size: usize,
}

impl FileValidator {
    /// Validator for post media: images and short videos, max 25MB
    pub fn media() -> Self {
        Self {
            allowed_extensions: [
                "jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "mp4", "mov", "webm",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            max_file_size: 25 * 1024 * 1024,
        }
    }

    pub fn validate(&self, file: &FileUpload) -> Result<(), String> {
        let extension = file.extension().ok_or("File has no extension")?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(format!(
                "Invalid file type '{}'. Allowed types: {}",
                extension,
                self.allowed_extensions.join(", ")
            ));
        }

        if file.size() > self.max_file_size {
            return Err(format!(
                "File too large. Maximum size: {} bytes, file size: {} bytes",
                self.max_file_size,
                file.size()
            ));
        }

        if file.data.is_empty() {
            return Err("File is empty".to_string());
        }

        Ok(())
    }

    /// Cloudinary resource type from the file extension
    pub fn get_resource_type(&self, file_name: &str) -> String {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" | "bmp" | "ico" => "image".to_string(),
            "mp4" | "mov" | "avi" | "mkv" | "webm" | "flv" | "wmv" => "video".to_string(),
            _ => "raw".to_string(),
        }
    }
}

/// The one operation post logic needs from an upload backend: take a file,
/// hand back its durable URL.
pub trait MediaUpload {
    async fn upload(&self, file: FileUpload) -> Result<String, CustomError>;
}

/// Upload service for Cloudinary. Constructed once at startup and shared;
/// credentials never come from anywhere but the config passed in.
pub struct UploadService {
    config: CloudinaryConfig,
    client: reqwest::Client,
    validator: FileValidator,
}

impl UploadService {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            validator: FileValidator::media(),
        }
    }

    pub fn from_env() -> Result<Self, String> {
        Ok(Self::new(CloudinaryConfig::from_env()?))
    }

    async fn upload_file(
        &self,
        file: FileUpload,
        resource_type: &str,
    ) -> Result<CloudinaryUploadResponse, CustomError> {
        let timestamp = chrono::Utc::now().timestamp();
        let upload_url = self.config.upload_url(resource_type);

        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(ref preset) = self.config.upload_preset {
            params.push(("upload_preset", preset));
        }

        let signature = self.config.generate_signature(&params, timestamp);

        let mime = file
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_part = Part::bytes(file.data)
            .file_name(file.file_name)
            .mime_str(&mime)
            .map_err(|e| CustomError::UploadError(format!("Failed to create file part: {}", e)))?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature", signature);

        if let Some(ref preset) = self.config.upload_preset {
            form = form.text("upload_preset", preset.clone());
        }

        let response = self
            .client
            .post(&upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CustomError::UploadError(format!("Failed to send upload request: {}", e)))?;

        if response.status().is_success() {
            response.json::<CloudinaryUploadResponse>().await.map_err(|e| {
                CustomError::UploadError(format!("Failed to parse upload response: {}", e))
            })
        } else {
            let error_response = response
                .json::<CloudinaryErrorResponse>()
                .await
                .map_err(|e| {
                    CustomError::UploadError(format!("Failed to parse error response: {}", e))
                })?;
            Err(CustomError::UploadError(format!(
                "Cloudinary upload failed: {}",
                error_response.error.message
            )))
        }
    }
}

impl MediaUpload for UploadService {
    /// Upload a file and return its durable URL. The buffer lives only for
    /// the duration of the request; a failed upload leaves nothing behind.
    async fn upload(&self, file: FileUpload) -> Result<String, CustomError> {
        self.validator
            .validate(&file)
            .map_err(CustomError::UploadError)?;

        let resource_type = self.validator.get_resource_type(&file.file_name);
        let response = self.upload_file(file, &resource_type).await?;

        Ok(response.secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            upload_preset: None,
        }
    }

    #[test]
    fn upload_url_embeds_cloud_and_resource_type() {
        assert_eq!(
            config().upload_url("image"),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
    }

    #[test]
    fn signature_matches_canonical_payload() {
        // SHA-1 of "timestamp=1700000000secret": no params means the
        // string-to-sign is just the timestamp pair plus the secret, with
        // no stray separators.
        assert_eq!(
            config().generate_signature(&[], 1_700_000_000),
            "84af3c6077e429a8e7ff26d2ca13d5feb6bc7cb0"
        );

        // SHA-1 of "timestamp=1700000000&upload_preset=postssecret":
        // pairs sorted by key ("timestamp" < "upload_preset"), joined
        // with '&', secret appended.
        assert_eq!(
            config().generate_signature(&[("upload_preset", "posts")], 1_700_000_000),
            "4cfba349bf408d6fba9f19512471b93cdde26370"
        );
    }

    #[test]
    fn signature_depends_on_secret_and_timestamp() {
        let a = config().generate_signature(&[("upload_preset", "posts")], 1_700_000_000);

        let mut other = config();
        other.api_secret = "other-secret".to_string();
        assert_ne!(a, other.generate_signature(&[("upload_preset", "posts")], 1_700_000_000));
        assert_ne!(
            a,
            config().generate_signature(&[("upload_preset", "posts")], 1_700_000_001)
        );
    }

    #[test]
    fn resource_type_by_extension() {
        let v = FileValidator::media();
        assert_eq!(v.get_resource_type("cat.png"), "image");
        assert_eq!(v.get_resource_type("clip.MP4"), "video");
        assert_eq!(v.get_resource_type("notes.txt"), "raw");
    }

    #[test]
    fn validator_rejects_bad_files() {
        let v = FileValidator::media();

        let ok = FileUpload::new("photo.jpg".into(), vec![1, 2, 3], None);
        assert!(v.validate(&ok).is_ok());

        let wrong_ext = FileUpload::new("script.exe".into(), vec![1], None);
        assert!(v.validate(&wrong_ext).is_err());

        // A bare name is not its own extension
        let no_ext = FileUpload::new("readme".into(), vec![1], None);
        assert!(no_ext.extension().is_none());
        assert_eq!(
            v.validate(&no_ext).unwrap_err(),
            "File has no extension".to_string()
        );

        let empty = FileUpload::new("photo.png".into(), vec![], None);
        assert!(v.validate(&empty).is_err());

        let huge = FileUpload::new("movie.mp4".into(), vec![0; 26 * 1024 * 1024], None);
        assert!(v.validate(&huge).is_err());
    }
}
