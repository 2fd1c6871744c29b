mod dynamodb;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::{AvailabilitySnapshot, ChangeRecord, LinkTokens, TokenMaterial};
use crate::error::{Error, Result};

pub use dynamodb::unmarshall_image;

/// Normalizes one inbound envelope shape into a `ChangeRecord`
pub trait RecordExtractor {
    fn extract(self) -> Result<ChangeRecord>;
}

/// A raw inbound event, tagged by the upstream source that produced it
#[derive(Debug, Deserialize)]
#[serde(tag = "eventSource")]
pub enum RawEvent {
    /// A pre-built notification delivered through a queue
    #[serde(rename = "aws:sqs")]
    Notification(QueueNotification),
    /// A before/after pair from the change-data-capture stream
    #[serde(rename = "aws:dynamodb")]
    Change(StreamRecord),
}

impl RawEvent {
    /// Parse a single batch item, failing with `MalformedEnvelope`
    pub fn parse(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::MalformedEnvelope(e.to_string()))
    }

    /// Upstream identifier of the event, for logging
    pub fn event_id(&self) -> Option<&str> {
        match self {
            Self::Notification(notification) => notification.message_id.as_deref(),
            Self::Change(record) => record.event_id.as_deref(),
        }
    }

    /// Only modifications of an existing item are worth extracting from the stream
    pub fn is_actionable(&self) -> bool {
        match self {
            Self::Notification(_) => true,
            Self::Change(record) => record.event_name == StreamEventName::Modify,
        }
    }
}

impl RecordExtractor for RawEvent {
    fn extract(self) -> Result<ChangeRecord> {
        match self {
            Self::Notification(notification) => notification.extract(),
            Self::Change(record) => record.extract(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueNotification {
    #[serde(default)]
    pub message_id: Option<String>,
    pub body: String,
}

/// Transport wrapper around the serialized notification
#[derive(Debug, Deserialize)]
struct NotificationBody {
    #[serde(rename = "Message")]
    message: String,
}

impl RecordExtractor for QueueNotification {
    fn extract(self) -> Result<ChangeRecord> {
        let body: NotificationBody = serde_json::from_str(&self.body)
            .map_err(|e| Error::MalformedEnvelope(format!("unparsable queue body: {}", e)))?;
        let facility: FacilityRecord = serde_json::from_str(&body.message)
            .map_err(|e| Error::MalformedEnvelope(format!("unparsable notification: {}", e)))?;

        Ok(facility.into_change(None))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreamEventName {
    Insert,
    Modify,
    Remove,
}

#[derive(Debug, Deserialize)]
pub struct StreamRecord {
    #[serde(rename = "eventID", default)]
    pub event_id: Option<String>,
    #[serde(rename = "eventName")]
    pub event_name: StreamEventName,
    pub dynamodb: StreamImages,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamImages {
    #[serde(default)]
    pub old_image: Option<Map<String, Value>>,
    #[serde(default)]
    pub new_image: Option<Map<String, Value>>,
}

impl RecordExtractor for StreamRecord {
    fn extract(self) -> Result<ChangeRecord> {
        let old_image = self.dynamodb.old_image.as_ref().map(unmarshall_image).transpose()?;
        let new_image = self.dynamodb.new_image.as_ref().map(unmarshall_image).transpose()?;

        let old_availability = old_image.as_ref().and_then(project_availability);

        // Identity comes from the newest image available
        let identity = new_image
            .or(old_image)
            .ok_or_else(|| Error::MalformedEnvelope("change record has no images".into()))?;
        let facility: FacilityRecord = serde_json::from_value(Value::Object(identity))
            .map_err(|e| Error::MalformedEnvelope(format!("unusable image: {}", e)))?;

        // An identity taken from the old image means the new side is gone
        let facility = if self.dynamodb.new_image.is_none() {
            FacilityRecord {
                availability: None,
                ..facility
            }
        } else {
            facility
        };

        Ok(facility.into_change(old_availability))
    }
}

fn project_availability(image: &Map<String, Value>) -> Option<AvailabilitySnapshot> {
    match image.get("availability") {
        Some(Value::Object(availability)) => Some(availability.clone().into()),
        _ => None,
    }
}

/// Facility fields shared by both envelope shapes, extra fields are ignored
#[derive(Debug, Deserialize)]
struct FacilityRecord {
    id: String,
    name: String,
    email: String,
    #[serde(flatten)]
    tokens: TokenMaterial,
    #[serde(default)]
    availability: Option<AvailabilitySnapshot>,
}

impl FacilityRecord {
    fn into_change(self, old_availability: Option<AvailabilitySnapshot>) -> ChangeRecord {
        ChangeRecord {
            id: self.id,
            name: self.name,
            email: self.email,
            tokens: LinkTokens::from(self.tokens),
            old_availability,
            new_availability: self.availability,
        }
    }
}
