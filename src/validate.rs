use uuid::Uuid;

use crate::domain::{Availability, ChangeRecord, EmailAddress, FacilityName, ValidatedRecord};
use crate::error::{Error, Result};

const HYPHENATED_UUID_LEN: usize = 36;

/// Check a change record field by field, failing on the first violated rule.
///
/// Availability rules only apply to the new side of the change, the old side is
/// kept as received for comparison.
pub fn validate(record: ChangeRecord) -> Result<ValidatedRecord> {
    let id = parse_id(&record.id)?;
    let name: FacilityName = record
        .name
        .parse()
        .map_err(|reason| Error::validation("name", reason))?;
    let email: EmailAddress = record
        .email
        .parse()
        .map_err(|reason| Error::validation("email", reason))?;
    for (field, token) in record.tokens.entries() {
        if token.trim().is_empty() {
            return Err(Error::validation(field, "Token cannot be empty"));
        }
    }
    let new_availability = record
        .new_availability
        .map(Availability::try_from)
        .transpose()?;

    Ok(ValidatedRecord {
        id,
        name,
        email,
        tokens: record.tokens,
        old_availability: record.old_availability,
        new_availability,
    })
}

fn parse_id(value: &str) -> Result<Uuid> {
    if value.len() != HYPHENATED_UUID_LEN {
        return Err(Error::validation("id", format!("{:?} is not a UUID", value)));
    }
    Uuid::try_parse(value).map_err(|e| Error::validation("id", e.to_string()))
}
