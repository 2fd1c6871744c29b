use uuid::Uuid;

use super::{Availability, AvailabilitySnapshot, EmailAddress, FacilityName, LinkTokens};

/// One facility's before/after availability, normalized from an inbound event
#[derive(Debug, Clone)]
pub struct ChangeRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub tokens: LinkTokens,
    /// `None` if there was no prior availability
    pub old_availability: Option<AvailabilitySnapshot>,
    /// `None` if availability was deleted
    pub new_availability: Option<AvailabilitySnapshot>,
}

/// A change record that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedRecord {
    pub id: Uuid,
    pub name: FacilityName,
    pub email: EmailAddress,
    pub tokens: LinkTokens,
    pub old_availability: Option<AvailabilitySnapshot>,
    pub new_availability: Option<Availability>,
}
