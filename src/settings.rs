use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};

use config::{Config, Environment, File};

use serde::Deserialize;
use serde_aux::prelude::*;

use url::Url;

use crate::handler::{PartialFailurePolicy, TemplateNames};
use crate::message::{LinkSlotPolicy, MessageOptions, EMAIL_TEMPLATE_ID};

/// Runtime environment, either `Dev` for local development, or `Prod` for release
#[derive(Debug)]
pub enum Runtime {
    Dev,
    Prod,
}

impl Runtime {
    pub fn as_str(&self) -> &str {
        match self {
            Runtime::Dev => "dev",
            Runtime::Prod => "prod",
        }
    }
}

impl TryFrom<String> for Runtime {
    type Error = anyhow::Error;

    fn try_from(s: String) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => anyhow::bail!("{} is not a valid runtime environment", other),
        }
    }
}

/// Application settings wrapper
#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: ApplicationSettings,
    pub aws: AwsSettings,
    pub templates: TemplateSettings,
    pub queue: QueueSettings,
    pub email: EmailSettings,
    #[serde(default)]
    pub policy: PolicySettings,
}

impl Settings {
    /// Load application settings from the settings directory
    pub fn load() -> anyhow::Result<Self> {
        // Get the path to the settings directory
        let path = env::current_dir()?.join("settings");
        // Get the current environment based on the `APP_ENV` environment variable, default to `Dev`
        let runtime: Runtime = env::var("APP_ENV")
            .unwrap_or_else(|_| "dev".into())
            .try_into()?;

        Self::load_from(runtime, &path)
    }
    /// Load application settings from a specified path and runtime
    pub fn load_from(runtime: Runtime, base_path: &Path) -> anyhow::Result<Self> {
        Config::builder()
            // Include the base settings
            .add_source(File::from(base_path.join("base")).required(true))
            // Include the runtime settings
            .add_source(File::from(base_path.join(runtime.as_str())).required(true))
            // Override/include any settings from environment variables
            // NOTE: Should be used for any prod secrets. Takes the form `APP_<settings category>__<setting name>`.
            .add_source(
                Environment::with_prefix("app")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
            .context("Failed to load/deserialize settings")
    }
}

#[derive(Debug, Deserialize)]
pub struct ApplicationSettings {
    host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    port: u16,
    log_filter: String,
    /// Also log span creation and close
    #[serde(default)]
    log_spans: bool,
    #[serde(default)]
    log_ansi: bool,
}

impl ApplicationSettings {
    /// The application address to bind to
    pub fn addr(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
    /// The `tracing` env-filter directive
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }
    pub fn log_spans(&self) -> bool {
        self.log_spans
    }
    pub fn log_ansi(&self) -> bool {
        self.log_ansi
    }

    #[cfg(test)]
    pub(crate) fn new(log_filter: &str, log_spans: bool) -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            log_filter: log_filter.into(),
            log_spans,
            log_ansi: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AwsSettings {
    region: String,
    /// Alternate endpoint for every AWS service, e.g. a local emulator
    endpoint: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    max_attempts: u32,
}

impl AwsSettings {
    /// Shared SDK config. Credentials come from the default provider chain.
    pub async fn sdk_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .retry_config(RetryConfig::standard().with_max_attempts(self.max_attempts));

        if let Some(endpoint) = &self.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        loader.load().await
    }
}

#[derive(Debug, Deserialize)]
pub struct TemplateSettings {
    bucket: String,
    available_object: String,
    fully_booked_object: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    timeout_milliseconds: u64,
}

impl TemplateSettings {
    /// Object names of the two email templates
    pub fn names(&self) -> TemplateNames {
        TemplateNames {
            available: self.available_object.clone(),
            fully_booked: self.fully_booked_object.clone(),
        }
    }
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The template storage request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Debug, Deserialize)]
pub struct QueueSettings {
    url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    timeout_milliseconds: u64,
}

impl QueueSettings {
    /// The queue every email message is sent to
    pub fn url(&self) -> &str {
        &self.url
    }
    /// The queue request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Debug, Deserialize)]
pub struct EmailSettings {
    link_base_url: String,
    template_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PolicySettings {
    #[serde(default)]
    pub link_slot: LinkSlotPolicy,
    #[serde(default)]
    pub partial_failure: PartialFailurePolicy,
}

impl Settings {
    /// Values every outbound message is built with
    pub fn message_options(&self) -> anyhow::Result<MessageOptions> {
        let link_base_url =
            Url::parse(&self.email.link_base_url).context("Failed to parse email link base URL")?;
        let template_id = self
            .email
            .template_id
            .clone()
            .unwrap_or_else(|| EMAIL_TEMPLATE_ID.into());

        Ok(MessageOptions {
            link_base_url,
            link_slot: self.policy.link_slot,
            template_id,
        })
    }
}
