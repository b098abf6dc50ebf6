use bson::oid::ObjectId;
use serde::Serialize;

use super::MonthKey;
use crate::{decimal::Decimal, student::Student};

/// Named student inside an acquisition bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRef {
    pub id: ObjectId,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Student> for StudentRef {
    fn from(student: &Student) -> StudentRef {
        StudentRef {
            id: student.id,
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
        }
    }
}

/// Drill-down lists behind the acquisition counters. Each list length
/// equals the matching counter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AcquisitionDetail {
    pub discoveries: Vec<StudentRef>,
    pub packs: Vec<StudentRef>,
    pub members: Vec<StudentRef>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MonthStats {
    pub lessons: u32,
    /// One student in one lesson counts once, any status.
    pub participations: u32,
    pub new_students: u32,
    pub new_packs: u32,
    pub new_members: u32,
    pub revenue: Decimal,
    pub detail: AcquisitionDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthRow {
    pub key: MonthKey,
    #[serde(flatten)]
    pub stats: MonthStats,
}
