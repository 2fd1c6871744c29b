use std::fmt;
use std::str::FromStr;

/// Display name of a facility, as used in the email greeting
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityName(String);

impl AsRef<str> for FacilityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FacilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FacilityName {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().is_empty() {
            return Err("Name cannot be empty".into());
        }
        Ok(Self(value.to_string()))
    }
}
