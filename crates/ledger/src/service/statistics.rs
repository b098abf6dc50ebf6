use std::collections::{BTreeMap, HashMap};

use bson::oid::ObjectId;
use chrono::NaiveDate;
use eyre::Result;
use model::{
    lesson::Lesson,
    package::{PackageKind, DISCOVERY_PRICE, MEMBER_PRICE, PACK_PRICE},
    session::Session,
    statistics::{
        month::{MonthRow, MonthStats, StudentRef},
        year::{YearRow, YearStats},
        MonthKey, YearKey,
    },
    student::Student,
};
use storage::{calendar::LessonStore, student::StudentStore};

#[derive(Clone)]
pub struct Statistics {
    students: StudentStore,
    lessons: LessonStore,
}

impl Statistics {
    pub(crate) fn new(students: StudentStore, lessons: LessonStore) -> Self {
        Statistics { students, lessons }
    }

    /// Rollups of the given year, months ascending.
    pub async fn monthly(&self, session: &mut Session, year: i32) -> Result<Vec<MonthRow>> {
        let students = self.students.dump(session).await?;
        let lessons = self.lessons.dump(session).await?;
        Ok(monthly(&students, &lessons, year))
    }

    /// All-time rollups per year, newest first.
    pub async fn yearly(&self, session: &mut Session) -> Result<Vec<YearRow>> {
        let students = self.students.dump(session).await?;
        let lessons = self.lessons.dump(session).await?;
        Ok(yearly(&students, &lessons))
    }
}

/// Earliest lesson date a student ever appears on, any status. `Some(None)`
/// means only unknown-dated lessons reference the student.
fn first_appearance(lessons: &[Lesson]) -> HashMap<ObjectId, Option<NaiveDate>> {
    let mut first: HashMap<ObjectId, Option<NaiveDate>> = HashMap::new();
    for lesson in lessons {
        for link in &lesson.students {
            let entry = first.entry(link.student_id).or_insert(lesson.date);
            let earlier = match (lesson.date, *entry) {
                (Some(candidate), Some(current)) => candidate < current,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if earlier {
                *entry = lesson.date;
            }
        }
    }
    first
}

pub fn aggregate(students: &[Student], lessons: &[Lesson]) -> BTreeMap<MonthKey, MonthStats> {
    let mut months: BTreeMap<MonthKey, MonthStats> = BTreeMap::new();

    // Lesson volume.
    for lesson in lessons {
        let stats = months.entry(MonthKey::from_date(lesson.date)).or_default();
        stats.lessons += 1;
        stats.participations += lesson.students.len() as u32;
    }

    // New heads: bucketed by the month of their first-ever lesson.
    // Iterating the student list keeps the detail order deterministic and
    // drops orphaned roster links, so counter and list always agree.
    let first = first_appearance(lessons);
    for student in students {
        if let Some(date) = first.get(&student.id) {
            let stats = months.entry(MonthKey::from_date(*date)).or_default();
            stats.new_students += 1;
            stats.detail.discoveries.push(StudentRef::from(student));
        }
    }

    // Pack-of-5 starts. Members started one too if they carry a
    // transition date.
    for student in students {
        let Some(start) = student.package_start_date else {
            continue;
        };
        let started_pack = match student.package {
            PackageKind::Pack5 => true,
            PackageKind::Member | PackageKind::MemberInactive => student.member_since.is_some(),
            PackageKind::Contact | PackageKind::Discovery => false,
        };
        if started_pack {
            let stats = months.entry(MonthKey::from_date(Some(start))).or_default();
            stats.new_packs += 1;
            stats.detail.packs.push(StudentRef::from(student));
        }
    }

    // Membership starts, falling back to the package start date.
    for student in students {
        if !student.package.is_membership() {
            continue;
        }
        let Some(date) = student.member_since.or(student.package_start_date) else {
            continue;
        };
        let stats = months.entry(MonthKey::from_date(Some(date))).or_default();
        stats.new_members += 1;
        stats.detail.members.push(StudentRef::from(student));
    }

    for stats in months.values_mut() {
        stats.revenue = DISCOVERY_PRICE * stats.new_students
            + PACK_PRICE * stats.new_packs
            + MEMBER_PRICE * stats.new_members;
    }

    months
}

pub fn monthly(students: &[Student], lessons: &[Lesson], year: i32) -> Vec<MonthRow> {
    aggregate(students, lessons)
        .into_iter()
        .filter(|(key, _)| matches!(key, MonthKey::Month { year: y, .. } if *y == year))
        .map(|(key, stats)| MonthRow { key, stats })
        .collect()
}

pub fn yearly(students: &[Student], lessons: &[Lesson]) -> Vec<YearRow> {
    let mut years: BTreeMap<YearKey, YearStats> = BTreeMap::new();
    for (key, stats) in aggregate(students, lessons) {
        years.entry(key.year()).or_default().absorb(&stats);
    }
    years
        .into_iter()
        .rev()
        .map(|(key, stats)| YearRow { key, stats })
        .collect()
}
