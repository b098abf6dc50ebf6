use bson::oid::ObjectId;
use chrono::NaiveDate;
use eyre::Result;
use model::{
    day::{is_class_day, month_grid, GridDay},
    errors::LedgerError,
    lesson::{Attendance, Lesson, LessonStudent, Slot},
    session::Session,
};
use storage::{calendar::LessonStore, student::StudentStore};
use tx_macro::tx;

#[derive(Clone)]
pub struct Calendar {
    lessons: LessonStore,
    students: StudentStore,
}

/// One grid cell of the month view with the lessons scheduled on it.
#[derive(Debug, Clone)]
pub struct DaySchedule {
    pub day: GridDay,
    pub is_class_day: bool,
    pub lessons: Vec<Lesson>,
}

impl Calendar {
    pub(crate) fn new(lessons: LessonStore, students: StudentStore) -> Self {
        Calendar { lessons, students }
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Option<Lesson>> {
        self.lessons.get(session, id).await
    }

    pub async fn get_by_slot(
        &self,
        session: &mut Session,
        date: NaiveDate,
        slot: Slot,
    ) -> Result<Option<Lesson>> {
        self.lessons.get_by_slot(session, date, slot).await
    }

    pub async fn all(&self, session: &mut Session) -> Result<Vec<Lesson>> {
        self.lessons.dump(session).await
    }

    /// Six-week month view with each day's lessons in slot order.
    pub async fn month_schedule(
        &self,
        session: &mut Session,
        year: i32,
        month: u32,
    ) -> Result<Vec<DaySchedule>> {
        let mut lessons = self.lessons.dump(session).await?;
        lessons.sort_by_key(|l| (l.date, l.slot));

        Ok(month_grid(year, month)
            .into_iter()
            .map(|day| DaySchedule {
                day,
                is_class_day: is_class_day(day.date),
                lessons: lessons
                    .iter()
                    .filter(|l| l.date == Some(day.date))
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    /// Puts a student into a calendar slot, creating the lesson when the
    /// slot is still empty. The new roster entry starts as proposed.
    #[tx]
    pub async fn schedule_student(
        &self,
        session: &mut Session,
        date: NaiveDate,
        slot: Slot,
        student_id: ObjectId,
    ) -> Result<ObjectId, LedgerError> {
        if self.students.get(session, student_id).await?.is_none() {
            return Err(LedgerError::StudentNotFound(student_id));
        }

        match self.lessons.get_by_slot(session, date, slot).await? {
            Some(lesson) => {
                if lesson.find_student(student_id).is_some() {
                    return Err(LedgerError::AlreadyScheduled {
                        lesson_id: lesson.id,
                        student_id,
                    });
                }
                self.lessons
                    .push_student(session, lesson.id, &LessonStudent::proposed(student_id))
                    .await?;
                Ok(lesson.id)
            }
            None => {
                let mut lesson = Lesson::new(date, slot, None);
                lesson.students.push(LessonStudent::proposed(student_id));
                let id = lesson.id;
                self.lessons.insert(session, lesson).await?;
                Ok(id)
            }
        }
    }

    /// Removing the last student deletes the lesson.
    #[tx]
    pub async fn remove_student(
        &self,
        session: &mut Session,
        lesson_id: ObjectId,
        student_id: ObjectId,
    ) -> Result<(), LedgerError> {
        let lesson = self.require(session, lesson_id).await?;
        if lesson.find_student(student_id).is_none() {
            return Err(LedgerError::NotScheduled {
                lesson_id,
                student_id,
            });
        }

        if lesson.students.len() == 1 {
            self.lessons.delete(session, lesson_id).await?;
        } else {
            self.lessons
                .pull_student(session, lesson_id, student_id)
                .await?;
        }
        Ok(())
    }

    #[tx]
    pub async fn set_attendance(
        &self,
        session: &mut Session,
        lesson_id: ObjectId,
        student_id: ObjectId,
        status: Attendance,
    ) -> Result<(), LedgerError> {
        if !self
            .lessons
            .set_student_status(session, lesson_id, student_id, status)
            .await?
        {
            return Err(LedgerError::NotScheduled {
                lesson_id,
                student_id,
            });
        }
        Ok(())
    }

    /// Per-student coach override within one lesson.
    #[tx]
    pub async fn assign_student_coach(
        &self,
        session: &mut Session,
        lesson_id: ObjectId,
        student_id: ObjectId,
        coach_id: Option<ObjectId>,
    ) -> Result<(), LedgerError> {
        if !self
            .lessons
            .set_student_coach(session, lesson_id, student_id, coach_id)
            .await?
        {
            return Err(LedgerError::NotScheduled {
                lesson_id,
                student_id,
            });
        }
        Ok(())
    }

    #[tx]
    pub async fn set_lesson_coach(
        &self,
        session: &mut Session,
        lesson_id: ObjectId,
        coach_id: Option<ObjectId>,
    ) -> Result<(), LedgerError> {
        self.require(session, lesson_id).await?;
        self.lessons.set_coach(session, lesson_id, coach_id).await?;
        Ok(())
    }

    #[tx]
    pub async fn add_lesson(
        &self,
        session: &mut Session,
        date: NaiveDate,
        slot: Slot,
        coach_id: Option<ObjectId>,
        roster: Vec<LessonStudent>,
    ) -> Result<ObjectId, LedgerError> {
        if roster.is_empty() {
            return Err(LedgerError::Validation(
                "a lesson needs at least one student".to_owned(),
            ));
        }
        if self.lessons.get_by_slot(session, date, slot).await?.is_some() {
            return Err(LedgerError::SlotOccupied { date, slot });
        }

        let mut lesson = Lesson::new(date, slot, coach_id);
        lesson.students = roster;
        let id = lesson.id;
        self.lessons.insert(session, lesson).await?;
        Ok(id)
    }

    /// An empty replacement roster deletes the lesson.
    #[tx]
    pub async fn replace_roster(
        &self,
        session: &mut Session,
        lesson_id: ObjectId,
        roster: Vec<LessonStudent>,
    ) -> Result<(), LedgerError> {
        self.require(session, lesson_id).await?;

        if roster.is_empty() {
            self.lessons.delete(session, lesson_id).await?;
            return Ok(());
        }

        let mut ids: Vec<ObjectId> = roster.iter().map(|link| link.student_id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() != roster.len() {
            return Err(LedgerError::Validation(
                "duplicate student in roster".to_owned(),
            ));
        }

        self.lessons.set_roster(session, lesson_id, &roster).await?;
        Ok(())
    }

    #[tx]
    pub async fn delete_lesson(
        &self,
        session: &mut Session,
        lesson_id: ObjectId,
    ) -> Result<(), LedgerError> {
        self.require(session, lesson_id).await?;
        self.lessons.delete(session, lesson_id).await?;
        Ok(())
    }

    async fn require(&self, session: &mut Session, id: ObjectId) -> Result<Lesson, LedgerError> {
        self.lessons
            .get(session, id)
            .await?
            .ok_or(LedgerError::LessonNotFound(id))
    }
}
