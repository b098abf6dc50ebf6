use std::collections::HashMap;

use bson::oid::ObjectId;
use chrono::Local;
use eyre::Result;
use model::{
    errors::LedgerError,
    lesson::Lesson,
    package::PackageStatus,
    planning,
    progress::{self, LessonDetail},
    session::Session,
    student::Student,
};
use serde::Serialize;
use storage::{calendar::LessonStore, student::StudentStore};

/// Answers per-student billing questions over a fresh snapshot. All the
/// actual rules live in [`model::progress`]; this service only resolves
/// ids and loads data.
#[derive(Clone)]
pub struct Accounting {
    students: StudentStore,
    lessons: LessonStore,
}

/// One row of the sorted roster view.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub student: Student,
    pub progress: String,
    pub status: PackageStatus,
    pub rank: u8,
}

/// Triage lists resolved to full records.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PlanningBoard {
    pub awaiting_proposal: Vec<Student>,
    pub awaiting_confirmation: Vec<(Student, Lesson)>,
    pub awaiting_coach: Vec<(Student, Lesson)>,
    pub confirmed: Vec<(Student, Lesson)>,
}

impl Accounting {
    pub(crate) fn new(students: StudentStore, lessons: LessonStore) -> Self {
        Accounting { students, lessons }
    }

    pub async fn confirmed_lesson_count(
        &self,
        session: &mut Session,
        student_id: ObjectId,
    ) -> Result<i64, LedgerError> {
        let student = self.require(session, student_id).await?;
        let lessons = self.lessons.dump(session).await?;
        Ok(progress::confirmed_lesson_count(&student, &lessons))
    }

    pub async fn lesson_detail(
        &self,
        session: &mut Session,
        student_id: ObjectId,
    ) -> Result<LessonDetail, LedgerError> {
        let student = self.require(session, student_id).await?;
        let lessons = self.lessons.dump(session).await?;
        Ok(progress::lesson_detail(&student, &lessons))
    }

    pub async fn package_status(
        &self,
        session: &mut Session,
        student_id: ObjectId,
    ) -> Result<PackageStatus, LedgerError> {
        let student = self.require(session, student_id).await?;
        let lessons = self.lessons.dump(session).await?;
        Ok(progress::package_status(
            &student,
            &lessons,
            Local::now().date_naive(),
        ))
    }

    pub async fn sort_priority(
        &self,
        session: &mut Session,
        student_id: ObjectId,
    ) -> Result<u8, LedgerError> {
        let student = self.require(session, student_id).await?;
        let lessons = self.lessons.dump(session).await?;
        Ok(progress::sort_priority(
            &student,
            &lessons,
            Local::now().date_naive(),
        ))
    }

    /// Every student ranked for the roster view: members first, then
    /// actionable students, expired and stale ones last.
    pub async fn sorted_roster(&self, session: &mut Session) -> Result<Vec<RosterEntry>> {
        let mut students = self.students.dump(session).await?;
        let lessons = self.lessons.dump(session).await?;
        let today = Local::now().date_naive();

        students.sort_by_cached_key(|s| progress::roster_key(s, &lessons, today));
        Ok(students
            .into_iter()
            .map(|student| RosterEntry {
                progress: progress::progress_label(&student, &lessons),
                status: progress::package_status(&student, &lessons, today),
                rank: progress::sort_priority(&student, &lessons, today),
                student,
            })
            .collect())
    }

    pub async fn planning(&self, session: &mut Session) -> Result<PlanningBoard> {
        let today = Local::now().date_naive();
        let students = self.students.dump(session).await?;
        // Only upcoming lessons matter for the triage board.
        let lessons = self.lessons.find_from(session, today).await?;
        let triage = planning::triage(&students, &lessons, today);

        let by_student: HashMap<ObjectId, &Student> =
            students.iter().map(|s| (s.id, s)).collect();
        let by_lesson: HashMap<ObjectId, &Lesson> = lessons.iter().map(|l| (l.id, l)).collect();
        let resolve = |items: &[planning::TriageItem]| -> Vec<(Student, Lesson)> {
            items
                .iter()
                .filter_map(|item| {
                    let student = by_student.get(&item.student_id)?;
                    let lesson = by_lesson.get(&item.lesson_id)?;
                    Some(((*student).clone(), (*lesson).clone()))
                })
                .collect()
        };

        Ok(PlanningBoard {
            awaiting_proposal: triage
                .awaiting_proposal
                .iter()
                .filter_map(|id| by_student.get(id).map(|s| (*s).clone()))
                .collect(),
            awaiting_confirmation: resolve(&triage.awaiting_confirmation),
            awaiting_coach: resolve(&triage.awaiting_coach),
            confirmed: resolve(&triage.confirmed),
        })
    }

    async fn require(&self, session: &mut Session, id: ObjectId) -> Result<Student, LedgerError> {
        self.students
            .get(session, id)
            .await?
            .ok_or(LedgerError::StudentNotFound(id))
    }
}
