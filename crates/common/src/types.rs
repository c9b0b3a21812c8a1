use serde::{Deserialize, Serialize};

/// Numeric identifier for a club location.
///
/// Wraps the raw club number to provide type safety and prevent mixing
/// club ids with other integer identifiers (POS transaction ids, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClubId(u32);

impl ClubId {
    /// Creates a club id from a raw club number.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw club number.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ClubId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ClubId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<ClubId> for u32 {
    fn from(id: ClubId) -> Self {
        id.0
    }
}

/// Customer code assigned by the club database.
///
/// Unique within a club's database shard. For walk-up guests the code is
/// allocated by the provisioner before any money moves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustCode(String);

impl CustCode {
    /// Creates a customer code from a string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the code is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for CustCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CustCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CustCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for CustCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
