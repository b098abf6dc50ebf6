use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::decimal::Decimal;

/// One discovery lesson, then the pack window opens.
pub const DISCOVERY_LESSONS: u32 = 1;
pub const PACK_LESSONS: u32 = 5;

pub const DISCOVERY_PRICE: Decimal = Decimal::int(10);
pub const PACK_PRICE: Decimal = Decimal::int(50);
pub const MEMBER_PRICE: Decimal = Decimal::int(140);

/// Billing tier of a student.
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PackageKind {
    #[default]
    Contact,
    Discovery,
    Pack5,
    Member,
    MemberInactive,
}

impl PackageKind {
    pub fn lesson_limit(&self) -> Option<u32> {
        match self {
            PackageKind::Discovery => Some(DISCOVERY_LESSONS),
            PackageKind::Pack5 => Some(PACK_LESSONS),
            PackageKind::Contact | PackageKind::Member | PackageKind::MemberInactive => None,
        }
    }

    /// Tiers whose lesson consumption is tracked against a limit.
    pub fn is_tracked(&self) -> bool {
        self.lesson_limit().is_some()
    }

    pub fn is_membership(&self) -> bool {
        matches!(self, PackageKind::Member | PackageKind::MemberInactive)
    }
}

/// Derived lifecycle state of a student's current package.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PackageStatus {
    /// No tracking for this tier.
    None,
    /// Package bought but no lesson taken yet.
    Future,
    Active,
    Finished,
    /// Gone stale without finishing, or an inactive membership.
    Inactive,
    ExpiredActive,
    ExpiredFinished,
    Unlimited,
}

impl PackageStatus {
    pub fn is_expired(&self) -> bool {
        matches!(
            self,
            PackageStatus::ExpiredActive | PackageStatus::ExpiredFinished
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_limits() {
        assert_eq!(Some(1), PackageKind::Discovery.lesson_limit());
        assert_eq!(Some(5), PackageKind::Pack5.lesson_limit());
        assert_eq!(None, PackageKind::Member.lesson_limit());
        assert!(!PackageKind::Contact.is_tracked());
        assert!(PackageKind::Pack5.is_tracked());
    }

    #[test]
    fn test_serde_tags() {
        assert_eq!("pack5", PackageKind::Pack5.to_string());
        assert_eq!("member_inactive", PackageKind::MemberInactive.to_string());
        assert_eq!("expired-active", PackageStatus::ExpiredActive.to_string());
        assert!(PackageStatus::ExpiredActive.is_expired());
        assert!(!PackageStatus::Finished.is_expired());
    }
}
