use secrecy::{ExposeSecret, Secret};

use serde::Deserialize;

/// The two semantic slots an action link token can fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSlot {
    Yes,
    No,
}

impl TokenSlot {
    /// Name of the template variable that carries a link for this slot
    pub fn link_variable(&self) -> &'static str {
        match self {
            Self::Yes => "yes_link",
            Self::No => "no_link",
        }
    }
}

/// Signed tokens embedded in a facility's action links.
///
/// Change-stream images carry a `yes`/`no` pair, pre-built notifications carry
/// a single token that answers for both slots.
#[derive(Debug, Clone)]
pub enum LinkTokens {
    Pair { yes: Secret<String>, no: Secret<String> },
    Single(Secret<String>),
}

impl LinkTokens {
    pub fn pair(yes: impl Into<String>, no: impl Into<String>) -> Self {
        Self::Pair {
            yes: Secret::new(yes.into()),
            no: Secret::new(no.into()),
        }
    }

    pub fn single(token: impl Into<String>) -> Self {
        Self::Single(Secret::new(token.into()))
    }

    /// The token for a slot
    pub fn get(&self, slot: TokenSlot) -> &Secret<String> {
        match (self, slot) {
            (Self::Pair { yes, .. }, TokenSlot::Yes) => yes,
            (Self::Pair { no, .. }, TokenSlot::No) => no,
            (Self::Single(token), _) => token,
        }
    }

    /// Name and value of every token held, for validation
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Pair { yes, no } => vec![
                ("tokens.yes", yes.expose_secret().as_str()),
                ("tokens.no", no.expose_secret().as_str()),
            ],
            Self::Single(token) => vec![("token", token.expose_secret().as_str())],
        }
    }
}

/// Token material as it appears on an inbound facility record
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TokenMaterial {
    Pair { tokens: TokenPair },
    Single { token: String },
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenPair {
    yes: String,
    no: String,
}

impl From<TokenMaterial> for LinkTokens {
    fn from(value: TokenMaterial) -> Self {
        match value {
            TokenMaterial::Pair { tokens } => Self::pair(tokens.yes, tokens.no),
            TokenMaterial::Single { token } => Self::single(token),
        }
    }
}
