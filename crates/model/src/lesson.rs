use bson::oid::ObjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};
use strum::{Display, EnumIter, EnumString};

/// The two fixed evening slots of the weekly grid.
pub const SLOTS: [Slot; 2] = [Slot::SixPm, Slot::SevenPm];

#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
)]
pub enum Slot {
    #[serde(rename = "18:00")]
    #[strum(serialize = "18:00")]
    SixPm,
    #[serde(rename = "19:00")]
    #[strum(serialize = "19:00")]
    SevenPm,
}

/// Per-student confirmation state within one lesson.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Attendance {
    Proposed,
    Confirmed,
    Cancelled,
}

impl Attendance {
    pub fn counts_toward_package(&self) -> bool {
        matches!(self, Attendance::Confirmed)
    }
}

/// Roster entry linking a student to a lesson.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LessonStudent {
    pub student_id: ObjectId,
    pub status: Attendance,
    /// Overrides the lesson-level coach for this student.
    #[serde(default)]
    pub coach_id: Option<ObjectId>,
}

impl LessonStudent {
    pub fn proposed(student_id: ObjectId) -> LessonStudent {
        LessonStudent {
            student_id,
            status: Attendance::Proposed,
            coach_id: None,
        }
    }
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Lesson {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// `None` means the stored date was missing or unreadable; such
    /// lessons are kept out of date comparisons and bucketed as unknown.
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub slot: Slot,
    /// Default coach for the whole slot.
    #[serde(default)]
    pub coach_id: Option<ObjectId>,
    #[serde(default)]
    pub students: Vec<LessonStudent>,
    #[serde(default)]
    pub version: u64,
}

impl Lesson {
    pub fn new(date: NaiveDate, slot: Slot, coach_id: Option<ObjectId>) -> Lesson {
        Lesson {
            id: ObjectId::new(),
            date: Some(date),
            slot,
            coach_id,
            students: Vec::new(),
            version: 0,
        }
    }

    pub fn find_student(&self, student_id: ObjectId) -> Option<&LessonStudent> {
        self.students.iter().find(|s| s.student_id == student_id)
    }

    /// Coach teaching this roster entry: per-student override first, then
    /// the lesson default.
    pub fn coach_for(&self, link: &LessonStudent) -> Option<ObjectId> {
        link.coach_id.or(self.coach_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_tokens() {
        assert_eq!("18:00", Slot::SixPm.to_string());
        assert_eq!("19:00", Slot::SevenPm.to_string());
        assert_eq!(Slot::SixPm, "18:00".parse().unwrap());
        assert!(Slot::SixPm < Slot::SevenPm);
    }

    #[test]
    fn test_coach_resolution() {
        let coach = ObjectId::new();
        let substitute = ObjectId::new();
        let student_id = ObjectId::new();

        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let mut lesson = Lesson::new(date, Slot::SixPm, Some(coach));
        lesson.students.push(LessonStudent::proposed(student_id));

        let link = lesson.find_student(student_id).unwrap();
        assert_eq!(Some(coach), lesson.coach_for(link));

        lesson.students[0].coach_id = Some(substitute);
        let link = lesson.find_student(student_id).unwrap();
        assert_eq!(Some(substitute), lesson.coach_for(link));

        lesson.coach_id = None;
        lesson.students[0].coach_id = None;
        let link = lesson.find_student(student_id).unwrap();
        assert_eq!(None, lesson.coach_for(link));
    }

    #[test]
    fn test_unreadable_date_becomes_unknown() {
        let raw = serde_json::json!({
            "_id": ObjectId::new(),
            "date": "not-a-date",
            "slot": "18:00",
            "students": [],
        });
        let lesson: Lesson = serde_json::from_value(raw).unwrap();
        assert_eq!(None, lesson.date);
    }
}
