//! Club configuration and the region router.
//!
//! Clubs are statically partitioned into two jurisdictions. The
//! jurisdiction decides which database shard a club writes to and which
//! payment processor charges its cards. A club id outside every configured
//! range is a hard error; nothing ever falls back to a default region.

use common::ClubId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A region grouping of clubs sharing one payment gateway and tax treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Jurisdiction {
    /// Texas clubs, charged through the Cardlink gateway.
    Texas,
    /// Tennessee clubs, charged through the Payflex gateway.
    Tennessee,
}

impl Jurisdiction {
    /// Returns the processor name reported back to callers and receipts.
    pub fn processor(&self) -> &'static str {
        match self {
            Jurisdiction::Texas => "cardlink",
            Jurisdiction::Tennessee => "payflex",
        }
    }

    /// Returns the database shard name for this jurisdiction's clubs.
    pub fn shard(&self) -> &'static str {
        match self {
            Jurisdiction::Texas => "clubs_tx",
            Jurisdiction::Tennessee => "clubs_tn",
        }
    }

    /// Returns the jurisdiction name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Jurisdiction::Texas => "texas",
            Jurisdiction::Tennessee => "tennessee",
        }
    }
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A club location: id plus its statically configured jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub id: ClubId,
    pub jurisdiction: Jurisdiction,
}

impl Club {
    /// Returns this club's database shard name.
    pub fn shard(&self) -> &'static str {
        self.jurisdiction.shard()
    }
}

/// Inclusive club-id ranges per jurisdiction.
///
/// The partition is disjoint; each id maps to at most one jurisdiction.
const CLUB_RANGES: &[(u32, u32, Jurisdiction)] = &[
    (1, 499, Jurisdiction::Texas),
    (500, 899, Jurisdiction::Tennessee),
];

/// Resolves the jurisdiction for a club id.
///
/// Fails closed: an id outside every configured range is
/// [`DomainError::UnsupportedClub`], never a default jurisdiction.
pub fn resolve_jurisdiction(club_id: ClubId) -> Result<Jurisdiction, DomainError> {
    let id = club_id.as_u32();
    CLUB_RANGES
        .iter()
        .find(|(lo, hi, _)| (*lo..=*hi).contains(&id))
        .map(|(_, _, j)| *j)
        .ok_or(DomainError::UnsupportedClub(club_id))
}

/// Resolves the full club record for a club id.
pub fn resolve_club(club_id: ClubId) -> Result<Club, DomainError> {
    Ok(Club {
        id: club_id,
        jurisdiction: resolve_jurisdiction(club_id)?,
    })
}
