//! Wire-level constants and small value types

use std::fmt;

/// Media type asking PostgREST for a single JSON object instead of an array.
pub const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// `Prefer` value asking for the affected rows back.
pub const RETURN_REPRESENTATION: &str = "return=representation";

/// `Prefer` value used by upsert.
pub const RETURN_REPRESENTATION_MERGE_DUPLICATES: &str =
    "return=representation,resolution=merge-duplicates";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A header applied to a single request, on top of the client defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOption {
    pub key: String,
    pub value: String,
}

impl HeaderOption {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// `Authorization: Bearer <token>` for this request only.
    pub fn auth_token(token: &str) -> Self {
        Self::new("Authorization", &format!("Bearer {}", token))
    }
}
