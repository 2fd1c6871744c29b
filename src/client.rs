mod queue_client;
mod template_store_client;

use async_trait::async_trait;

use crate::error::Result;
use crate::message::OutboundMessage;

pub use queue_client::QueueClient;
pub use template_store_client::TemplateStoreClient;

/// Key to text lookup for raw email templates
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn get_template(&self, name: &str) -> Result<String>;
}

/// Hands one message to the outbound queue
#[async_trait]
pub trait QueueSender: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<()>;
}
