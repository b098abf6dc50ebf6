use bson::oid::ObjectId;
use chrono::NaiveDate;
use thiserror::Error;

use crate::lesson::Slot;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Common error: {0}")]
    Eyre(#[from] eyre::Error),
    #[error("Mongo error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("Student not found: {0}")]
    StudentNotFound(ObjectId),
    #[error("Coach not found: {0}")]
    CoachNotFound(ObjectId),
    #[error("Lesson not found: {0}")]
    LessonNotFound(ObjectId),
    #[error("Slot {slot} on {date} already has a lesson")]
    SlotOccupied { date: NaiveDate, slot: Slot },
    #[error("Student already scheduled")]
    AlreadyScheduled {
        lesson_id: ObjectId,
        student_id: ObjectId,
    },
    #[error("Student not scheduled")]
    NotScheduled {
        lesson_id: ObjectId,
        student_id: ObjectId,
    },
    #[error("Invalid value: {0}")]
    Validation(String),
}
