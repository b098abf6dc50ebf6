use bson::oid::ObjectId;
use eyre::Error;
use log::{info, warn};
use model::{package::PackageKind, progress, session::Session};
use serde::Serialize;
use storage::{calendar::LessonStore, student::StudentStore};

#[derive(Clone)]
pub struct Repair {
    students: StudentStore,
    lessons: LessonStore,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct RepairReport {
    pub scanned: u32,
    pub updated: u32,
    /// Ids whose write failed; already-applied writes stay applied.
    pub failed: Vec<ObjectId>,
}

impl Repair {
    pub(crate) fn new(students: StudentStore, lessons: LessonStore) -> Self {
        Repair { students, lessons }
    }

    /// Recomputes every non-member package start date from confirmed
    /// lesson history, discarding stored overrides. Writes go out one by
    /// one; a failure only lands the student id in the report.
    pub async fn repair_package_dates(&self, session: &mut Session) -> Result<RepairReport, Error> {
        let students = self.students.dump(session).await?;
        let lessons = self.lessons.dump(session).await?;

        let mut report = RepairReport::default();
        for student in &students {
            if student.package == PackageKind::Member {
                continue;
            }
            report.scanned += 1;

            let recomputed = progress::infer_start_date(student.id, &lessons);
            if recomputed == student.package_start_date {
                continue;
            }

            match self
                .students
                .set_package_start_date(session, student.id, recomputed)
                .await
            {
                Ok(()) => report.updated += 1,
                Err(err) => {
                    warn!("Failed to re-date student {}: {}", student.id, err);
                    report.failed.push(student.id);
                }
            }
        }

        info!(
            "Package date repair: {} scanned, {} updated, {} failed",
            report.scanned,
            report.updated,
            report.failed.len()
        );
        Ok(report)
    }
}
