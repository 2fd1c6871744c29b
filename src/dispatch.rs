use serde::Serialize;

use uuid::Uuid;

use crate::client::QueueSender;
use crate::message::OutboundMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Settled result of one send
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub recipient_id: Uuid,
    pub outcome: Outcome,
}

/// Aggregate result of dispatching one batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Recipients whose message could not be enqueued, in batch order
    pub failed_recipient_ids: Vec<Uuid>,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl FromIterator<DispatchOutcome> for BatchSummary {
    fn from_iter<I: IntoIterator<Item = DispatchOutcome>>(outcomes: I) -> Self {
        outcomes
            .into_iter()
            .fold(Self::default(), |mut summary, outcome| {
                summary.attempted += 1;
                match outcome.outcome {
                    Outcome::Success => summary.succeeded += 1,
                    Outcome::Failure => {
                        summary.failed += 1;
                        summary.failed_recipient_ids.push(outcome.recipient_id);
                    }
                }
                summary
            })
    }
}

/// Send every message concurrently and wait for all of them to settle.
///
/// A failed send never stops the others and is only reported through the
/// summary. Nothing is retried here, redelivery of the batch is up to the
/// platform invoking us.
#[tracing::instrument(name = "Dispatch email messages", skip_all, fields(count = messages.len()))]
pub async fn dispatch<S>(messages: &[OutboundMessage], sender: &S) -> BatchSummary
where
    S: QueueSender + ?Sized,
{
    let sends = messages.iter().map(|message| async move {
        let outcome = match sender.send(message).await {
            Ok(()) => Outcome::Success,
            Err(error) => {
                tracing::warn!(
                    error.cause_chain = ?error,
                    "Failed to enqueue message (recipient id: {})",
                    message.recipient_id
                );
                Outcome::Failure
            }
        };
        DispatchOutcome {
            recipient_id: message.recipient_id,
            outcome,
        }
    });

    let summary: BatchSummary = futures::future::join_all(sends).await.into_iter().collect();

    if summary.has_failures() {
        let failed: Vec<String> = summary
            .failed_recipient_ids
            .iter()
            .map(Uuid::to_string)
            .collect();
        tracing::warn!(
            "Could not enqueue emails for the following ATFs: {}",
            failed.join(", ")
        );
    } else if summary.attempted > 0 {
        tracing::info!("All emails enqueued successfully.");
    }
    tracing::info!(
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Messages processed: {}, successful: {}, failed: {}.",
        summary.attempted,
        summary.succeeded,
        summary.failed
    );

    summary
}
