use serde::Deserialize;
use serde_json::Value;

use crate::client::{QueueSender, TemplateStore};
use crate::detect::has_changed;
use crate::dispatch::{dispatch, BatchSummary};
use crate::domain::Availability;
use crate::error::{Error, Result};
use crate::extract::{RawEvent, RecordExtractor};
use crate::message::{build, MessageOptions, OutboundMessage};
use crate::template::{fetch_templates, EmailTemplates};
use crate::validate::validate;

/// What a batch with some failed sends means for the whole invocation.
///
/// `Tolerate` reports the failures and completes, `FailInvocation` fails so the
/// platform redelivers the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialFailurePolicy {
    #[default]
    Tolerate,
    FailInvocation,
}

/// One invocation's worth of raw events
#[derive(Debug, Deserialize)]
pub struct EventBatch {
    #[serde(rename = "Records")]
    pub records: Vec<Value>,
}

/// Object names of the two email templates
#[derive(Debug, Clone)]
pub struct TemplateNames {
    pub available: String,
    pub fully_booked: String,
}

/// Runs the notification pipeline over event batches
pub struct Notifier<S, Q> {
    store: S,
    sender: Q,
    template_names: TemplateNames,
    message_options: MessageOptions,
    partial_failure: PartialFailurePolicy,
}

impl<S, Q> Notifier<S, Q>
where
    S: TemplateStore,
    Q: QueueSender,
{
    pub fn new(
        store: S,
        sender: Q,
        template_names: TemplateNames,
        message_options: MessageOptions,
        partial_failure: PartialFailurePolicy,
    ) -> Self {
        Self {
            store,
            sender,
            template_names,
            message_options,
            partial_failure,
        }
    }

    /// Turn a batch of raw events into enqueued notification emails.
    ///
    /// Bad records are logged and dropped. Only a template fetch failure, or a
    /// partial dispatch failure under `PartialFailurePolicy::FailInvocation`,
    /// fails the invocation.
    #[tracing::instrument(name = "Handle an event batch", skip_all, fields(records = batch.records.len()))]
    pub async fn handle(&self, batch: EventBatch) -> Result<BatchSummary> {
        tracing::info!("Fetching email templates...");
        let templates = fetch_templates(
            &self.store,
            &self.template_names.available,
            &self.template_names.fully_booked,
        )
        .await
        .map_err(|error| {
            tracing::error!(error.cause_chain = ?error, "Failed to fetch the email templates");
            error
        })?;

        tracing::info!("Received {} records.", batch.records.len());
        let mut messages = Vec::with_capacity(batch.records.len());
        for (position, raw) in batch.records.into_iter().enumerate() {
            match self.prepare(raw, &templates) {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => {}
                Err(error) => {
                    tracing::error!(
                        error.cause_chain = ?error,
                        "Dropping record {}: {}",
                        position,
                        error
                    );
                }
            }
        }

        let summary = dispatch(&messages, &self.sender).await;

        match self.partial_failure {
            PartialFailurePolicy::FailInvocation if summary.has_failures() => {
                Err(Error::PartialDispatch {
                    failed: summary
                        .failed_recipient_ids
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                })
            }
            _ => Ok(summary),
        }
    }

    /// Build the message for one raw event, or `None` if nothing needs sending
    fn prepare(&self, raw: Value, templates: &EmailTemplates) -> Result<Option<OutboundMessage>> {
        let event = RawEvent::parse(raw)?;
        if !event.is_actionable() {
            tracing::debug!("Skipping stream event {:?}, not a modification", event.event_id());
            return Ok(None);
        }

        let record = validate(event.extract()?)?;

        let new_snapshot = record.new_availability.as_ref().map(Availability::snapshot);
        if !has_changed(record.old_availability.as_ref(), new_snapshot) {
            tracing::debug!("Availability of ATF {} has not changed", record.id);
            return Ok(None);
        }
        let Some(availability) = record.new_availability.as_ref() else {
            return Ok(None);
        };

        Ok(Some(build(
            &record,
            availability,
            templates,
            &self.message_options,
        )))
    }
}
