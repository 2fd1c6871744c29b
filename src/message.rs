use secrecy::ExposeSecret;

use serde::Deserialize;

use url::Url;

use uuid::Uuid;

use crate::domain::{Availability, TokenSlot, ValidatedRecord};
use crate::template::{EmailTemplates, TemplateValues};

pub const EMAIL_TEMPLATE_ID: &str = "GOVNOTIFYTEMPLATE";
pub const EMAIL_SUBJECT: &str = "ATF Availability Confirmation";
pub const MESSAGE_TYPE: &str = "Email";

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Which token slot fills the action link.
///
/// `Legacy` always links the `no` token, as the deployed handler does regardless
/// of the availability flag. `FollowAvailability` links `no` for an available
/// facility and `yes` for a fully booked one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSlotPolicy {
    #[default]
    Legacy,
    FollowAvailability,
}

impl LinkSlotPolicy {
    pub fn slot(&self, is_available: bool) -> TokenSlot {
        match self {
            Self::Legacy => TokenSlot::No,
            Self::FollowAvailability if is_available => TokenSlot::No,
            Self::FollowAvailability => TokenSlot::Yes,
        }
    }
}

/// Deployment values every message is built with
#[derive(Debug, Clone)]
pub struct MessageOptions {
    pub link_base_url: Url,
    pub link_slot: LinkSlotPolicy,
    pub template_id: String,
}

impl MessageOptions {
    pub fn new(link_base_url: Url) -> Self {
        Self {
            link_base_url,
            link_slot: LinkSlotPolicy::default(),
            template_id: EMAIL_TEMPLATE_ID.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageAttributes {
    pub template_id: String,
    pub message_type: String,
    pub recipient: String,
    pub subject: String,
}

impl MessageAttributes {
    /// Attribute names and values as they go on the wire
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("templateId", self.template_id.as_str()),
            ("messageType", self.message_type.as_str()),
            ("recipient", self.recipient.as_str()),
            ("subject", self.subject.as_str()),
        ]
    }
}

/// A rendered email ready to be handed to the queue
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    /// Facility the message is for, used to correlate dispatch outcomes
    pub recipient_id: Uuid,
    pub body: String,
    pub attributes: MessageAttributes,
}

/// Render the notification email for a changed facility
pub fn build(
    record: &ValidatedRecord,
    availability: &Availability,
    templates: &EmailTemplates,
    options: &MessageOptions,
) -> OutboundMessage {
    let template = if availability.is_available {
        &templates.available
    } else {
        &templates.fully_booked
    };

    let slot = options.link_slot.slot(availability.is_available);
    let mut link = options.link_base_url.clone();
    link.query_pairs_mut()
        .append_pair("jwt", record.tokens.get(slot).expose_secret());

    let values = TemplateValues::from([
        ("atf_name", record.name.to_string()),
        (
            "additional_open_date_start",
            availability.start_date.format(DATE_FORMAT).to_string(),
        ),
        (
            "additional_open_date_end",
            availability.end_date.format(DATE_FORMAT).to_string(),
        ),
        (slot.link_variable(), link.to_string()),
    ]);

    OutboundMessage {
        recipient_id: record.id,
        body: template.render(&values),
        attributes: MessageAttributes {
            template_id: options.template_id.clone(),
            message_type: MESSAGE_TYPE.into(),
            recipient: record.email.to_string(),
            subject: EMAIL_SUBJECT.into(),
        },
    }
}
