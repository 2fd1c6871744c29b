mod availability;
mod change_record;
mod email_address;
mod facility_name;
mod link_tokens;

pub use availability::{parse_iso8601, Availability, AvailabilitySnapshot};
pub use change_record::{ChangeRecord, ValidatedRecord};
pub use email_address::EmailAddress;
pub use facility_name::FacilityName;
pub use link_tokens::{LinkTokens, TokenSlot};

pub(crate) use link_tokens::TokenMaterial;
