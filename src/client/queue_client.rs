use std::time::Duration;

use async_trait::async_trait;

use aws_config::timeout::TimeoutConfig;
use aws_config::SdkConfig;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::MessageAttributeValue;
use aws_sdk_sqs::Client;

use super::QueueSender;
use crate::error::{Error, Result};
use crate::message::OutboundMessage;

const STRING_DATA_TYPE: &str = "String";

/// Enqueues outbound emails on a single SQS queue
#[derive(Debug)]
pub struct QueueClient {
    client: Client,
    queue_url: String,
}

impl QueueClient {
    pub fn new(config: &SdkConfig, queue_url: impl Into<String>, api_timeout: Duration) -> Self {
        let sqs_config = aws_sdk_sqs::config::Builder::from(config)
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(api_timeout)
                    .build(),
            )
            .build();

        Self {
            client: Client::from_conf(sqs_config),
            queue_url: queue_url.into(),
        }
    }
}

#[async_trait]
impl QueueSender for QueueClient {
    #[tracing::instrument(
        name = "Enqueue an email message",
        skip(self, message),
        fields(recipient_id = %message.recipient_id)
    )]
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let mut request = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(&message.body);

        for (name, value) in message.attributes.entries() {
            let attribute = MessageAttributeValue::builder()
                .data_type(STRING_DATA_TYPE)
                .string_value(value)
                .build()
                .map_err(|e| Error::SendMessage(e.to_string()))?;
            request = request.message_attributes(name, attribute);
        }

        let output = request
            .send()
            .await
            .map_err(|e| Error::SendMessage(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!("Enqueued message {:?}", output.message_id());
        Ok(())
    }
}
