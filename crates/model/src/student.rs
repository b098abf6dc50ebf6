use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::package::PackageKind;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub main_coach_id: Option<ObjectId>,
    #[serde(default)]
    pub package: PackageKind,
    /// First day counted toward the current package. Manual override or
    /// stamped by the repair routine.
    #[serde(default)]
    pub package_start_date: Option<NaiveDate>,
    /// When a pack-of-5 student became a member.
    #[serde(default)]
    pub member_since: Option<NaiveDate>,
    /// Signed correction added to the computed lesson count. Negative
    /// totals are allowed and surface as a data-quality signal.
    #[serde(default)]
    pub manual_adjustment: i32,
    /// No scheduled future lesson, needs manual outreach.
    #[serde(default)]
    pub needs_proposal: bool,
    #[serde(default)]
    pub version: u64,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    #[serde(default = "default_created_at")]
    pub created_at: DateTime<Utc>,
}

fn default_created_at() -> DateTime<Utc> {
    Utc::now()
}

impl Student {
    pub fn new(
        first_name: String,
        last_name: String,
        email: String,
        language: String,
        main_coach_id: Option<ObjectId>,
        package: PackageKind,
    ) -> Student {
        Student {
            id: ObjectId::new(),
            first_name,
            last_name,
            email,
            language,
            main_coach_id,
            package,
            package_start_date: None,
            member_since: None,
            manual_adjustment: 0,
            needs_proposal: false,
            version: 0,
            created_at: Utc::now(),
        }
    }
}

/// Partial update: only supplied fields change. Nested `Option`s
/// distinguish "leave as is" from "clear the value".
#[derive(Debug, Default, Clone)]
pub struct StudentUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub language: Option<String>,
    pub main_coach_id: Option<Option<ObjectId>>,
    pub package: Option<PackageKind>,
    pub package_start_date: Option<Option<NaiveDate>>,
    pub member_since: Option<Option<NaiveDate>>,
    pub manual_adjustment: Option<i32>,
    pub needs_proposal: Option<bool>,
}

impl StudentUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.language.is_none()
            && self.main_coach_id.is_none()
            && self.package.is_none()
            && self.package_start_date.is_none()
            && self.member_since.is_none()
            && self.manual_adjustment.is_none()
            && self.needs_proposal.is_none()
    }
}
