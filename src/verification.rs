//! Donation verification state machine: `pending` resolves once to either
//! `verified` or `rejected`, and the public-facing `status` field mirrors the
//! resolution. Re-applying the current resolution succeeds as a no-op; every
//! other move between resolved states is refused.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(VerificationStatus::Pending),
            "verified" => Some(VerificationStatus::Verified),
            "rejected" => Some(VerificationStatus::Rejected),
            _ => None,
        }
    }

    /// The donation `status` value mirrored from a verification state.
    pub fn mirrored_status(self) -> DonationStatus {
        match self {
            VerificationStatus::Pending => DonationStatus::Pending,
            VerificationStatus::Verified => DonationStatus::Confirmed,
            VerificationStatus::Rejected => DonationStatus::Failed,
        }
    }

    pub fn is_resolved(self) -> bool {
        self != VerificationStatus::Pending
    }
}

/// Public-facing donation status, always derived from the verification state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Confirmed,
    Failed,
}

impl DonationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Confirmed => "confirmed",
            DonationStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(DonationStatus::Pending),
            "confirmed" => Some(DonationStatus::Confirmed),
            "failed" => Some(DonationStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move a {current} donation to {requested}")]
pub struct InvalidTransition {
    pub current: VerificationStatus,
    pub requested: VerificationStatus,
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of applying a verify/reject command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The donation moved to the requested state.
    Applied(VerificationStatus),
    /// The donation was already in the requested state; nothing to write.
    Noop,
}

/// Decide what a verify/reject command does to a donation in `current` state.
///
/// `requested` is always `Verified` or `Rejected`; asking for `Pending` is an
/// error because nothing un-resolves a donation.
pub fn resolve(
    current: VerificationStatus,
    requested: VerificationStatus,
) -> Result<Transition, InvalidTransition> {
    if requested == VerificationStatus::Pending {
        return Err(InvalidTransition { current, requested });
    }
    if current == requested {
        return Ok(Transition::Noop);
    }
    if current == VerificationStatus::Pending {
        return Ok(Transition::Applied(requested));
    }
    // verified -> rejected and rejected -> verified are both refused; a
    // resolved donation stays resolved the way it was.
    Err(InvalidTransition { current, requested })
}

impl FromSql for VerificationStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        VerificationStatus::parse(s).ok_or_else(|| {
            FromSqlError::Other(format!("unknown verification status: {s}").into())
        })
    }
}

impl ToSql for VerificationStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for DonationStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        DonationStatus::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown donation status: {s}").into()))
    }
}

impl ToSql for DonationStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use VerificationStatus::*;

    #[test]
    fn pending_resolves_either_way() {
        assert_eq!(resolve(Pending, Verified), Ok(Transition::Applied(Verified)));
        assert_eq!(resolve(Pending, Rejected), Ok(Transition::Applied(Rejected)));
    }

    #[test]
    fn reapplying_a_resolution_is_a_noop() {
        assert_eq!(resolve(Verified, Verified), Ok(Transition::Noop));
        assert_eq!(resolve(Rejected, Rejected), Ok(Transition::Noop));
    }

    #[test]
    fn resolved_donations_never_flip() {
        assert!(resolve(Verified, Rejected).is_err());
        assert!(resolve(Rejected, Verified).is_err());
    }

    #[test]
    fn nothing_returns_to_pending() {
        for current in [Pending, Verified, Rejected] {
            assert!(resolve(current, Pending).is_err());
        }
    }

    #[test]
    fn status_mirrors_verification() {
        assert_eq!(Pending.mirrored_status(), DonationStatus::Pending);
        assert_eq!(Verified.mirrored_status(), DonationStatus::Confirmed);
        assert_eq!(Rejected.mirrored_status(), DonationStatus::Failed);
    }
}
