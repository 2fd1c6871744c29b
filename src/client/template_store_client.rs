use std::time::Duration;

use async_trait::async_trait;

use aws_config::timeout::TimeoutConfig;
use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::Client;

use super::TemplateStore;
use crate::error::{Error, Result};

/// Reads template objects out of a single S3 bucket
#[derive(Debug)]
pub struct TemplateStoreClient {
    client: Client,
    bucket: String,
}

impl TemplateStoreClient {
    /// Build a client from shared AWS config. An alternate endpoint switches to path-style addressing.
    pub fn new(config: &SdkConfig, bucket: impl Into<String>, api_timeout: Duration) -> Self {
        let s3_config = aws_sdk_s3::config::Builder::from(config)
            .force_path_style(config.endpoint_url().is_some())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(api_timeout)
                    .build(),
            )
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: bucket.into(),
        }
    }

    async fn fetch(&self, key: &str) -> std::result::Result<String, String> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(GetObjectError::NoSuchKey(_)) => format!("no such key in {}", self.bucket),
                _ => DisplayErrorContext(&e).to_string(),
            })?;

        let body = object
            .body
            .collect()
            .await
            .map_err(|e| format!("failed to read object body: {}", e))?;

        String::from_utf8(body.to_vec()).map_err(|e| format!("object is not UTF-8: {}", e))
    }
}

#[async_trait]
impl TemplateStore for TemplateStoreClient {
    #[tracing::instrument(name = "Fetch a template object", skip(self), fields(bucket = %self.bucket))]
    async fn get_template(&self, name: &str) -> Result<String> {
        self.fetch(name).await.map_err(|reason| Error::TemplateFetch {
            name: name.into(),
            reason,
        })
    }
}
