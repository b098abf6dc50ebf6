use bson::oid::ObjectId;
use chrono::{Months, NaiveDate};

use crate::{
    lesson::{Lesson, Slot},
    package::{PackageKind, PackageStatus, PACK_LESSONS},
    student::Student,
};

/// Months before an unfinished package counts as stale.
pub const STALE_AFTER_MONTHS: u32 = 3;
/// Months before a finished pack counts as expired.
pub const EXPIRED_AFTER_MONTHS: u32 = 5;

/// One lesson that counted toward the student's package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountedLesson {
    pub date: Option<NaiveDate>,
    pub slot: Slot,
    pub coach_id: Option<ObjectId>,
}

/// Audit trail reconciling exactly with [`confirmed_lesson_count`]:
/// `total == counted.len() + adjustment`, always.
#[derive(Debug, Clone)]
pub struct LessonDetail {
    pub total: i64,
    pub adjustment: i32,
    pub counted: Vec<CountedLesson>,
    pub start_date: Option<NaiveDate>,
    /// Confirmed lessons dropped for predating the package start.
    pub excluded: u32,
}

fn in_package_window(start: Option<NaiveDate>, date: Option<NaiveDate>) -> bool {
    match (start, date) {
        // No stored start date: no filter at all.
        (None, _) => true,
        // A window is set but the lesson date is unknown: not provably
        // inside, keep it out.
        (Some(_), None) => false,
        (Some(start), Some(date)) => date >= start,
    }
}

fn is_confirmed_for(lesson: &Lesson, student_id: ObjectId) -> bool {
    lesson
        .find_student(student_id)
        .map_or(false, |link| link.status.counts_toward_package())
}

/// Confirmed lessons inside the student's package window, in (date, slot)
/// order. Only the stored `package_start_date` filters; the inferred one
/// never does.
pub fn counted_lessons(student: &Student, lessons: &[Lesson]) -> Vec<CountedLesson> {
    let mut counted: Vec<CountedLesson> = lessons
        .iter()
        .filter(|lesson| is_confirmed_for(lesson, student.id))
        .filter(|lesson| in_package_window(student.package_start_date, lesson.date))
        .map(|lesson| CountedLesson {
            date: lesson.date,
            slot: lesson.slot,
            coach_id: lesson
                .find_student(student.id)
                .and_then(|link| lesson.coach_for(link)),
        })
        .collect();
    counted.sort_by_key(|l| (l.date, l.slot));
    counted
}

pub fn confirmed_lesson_count(student: &Student, lessons: &[Lesson]) -> i64 {
    counted_lessons(student, lessons).len() as i64 + student.manual_adjustment as i64
}

pub fn lesson_detail(student: &Student, lessons: &[Lesson]) -> LessonDetail {
    let counted = counted_lessons(student, lessons);
    let excluded = lessons
        .iter()
        .filter(|lesson| is_confirmed_for(lesson, student.id))
        .filter(|lesson| !in_package_window(student.package_start_date, lesson.date))
        .count() as u32;

    LessonDetail {
        total: counted.len() as i64 + student.manual_adjustment as i64,
        adjustment: student.manual_adjustment,
        start_date: student.package_start_date,
        counted,
        excluded,
    }
}

/// Start date implied by history alone: the first confirmed lesson is a
/// standalone discovery, so the window opens at the second one.
pub fn infer_start_date(student_id: ObjectId, lessons: &[Lesson]) -> Option<NaiveDate> {
    let mut dates: Vec<NaiveDate> = lessons
        .iter()
        .filter(|lesson| is_confirmed_for(lesson, student_id))
        .filter_map(|lesson| lesson.date)
        .collect();
    dates.sort_unstable();

    match dates.len() {
        0 => None,
        1 => Some(dates[0]),
        _ => Some(dates[1]),
    }
}

/// Stored override if present, inferred from history otherwise.
pub fn effective_start_date(student: &Student, lessons: &[Lesson]) -> Option<NaiveDate> {
    if student.package_start_date.is_some() {
        return student.package_start_date;
    }
    infer_start_date(student.id, lessons)
}

fn older_than(date: NaiveDate, months: u32, today: NaiveDate) -> bool {
    date.checked_add_months(Months::new(months))
        .map_or(false, |limit| limit < today)
}

pub fn package_status(student: &Student, lessons: &[Lesson], today: NaiveDate) -> PackageStatus {
    match student.package {
        PackageKind::Member => PackageStatus::Unlimited,
        PackageKind::MemberInactive => PackageStatus::Inactive,
        PackageKind::Contact => PackageStatus::None,
        PackageKind::Discovery => discovery_status(student, lessons, today),
        PackageKind::Pack5 => pack_status(student, lessons, today),
    }
}

fn discovery_status(student: &Student, lessons: &[Lesson], today: NaiveDate) -> PackageStatus {
    let last_past = counted_lessons(student, lessons)
        .into_iter()
        .filter_map(|l| l.date)
        .filter(|date| *date < today)
        .max();

    match last_past {
        None => PackageStatus::Future,
        Some(date) if older_than(date, STALE_AFTER_MONTHS, today) => PackageStatus::Inactive,
        Some(_) => PackageStatus::Finished,
    }
}

fn pack_status(student: &Student, lessons: &[Lesson], today: NaiveDate) -> PackageStatus {
    let past = counted_lessons(student, lessons)
        .iter()
        .filter(|l| l.date.map_or(false, |date| date < today))
        .count() as u32;
    let start = effective_start_date(student, lessons);

    if past >= PACK_LESSONS {
        match start {
            Some(start) if older_than(start, EXPIRED_AFTER_MONTHS, today) => {
                PackageStatus::ExpiredFinished
            }
            _ => PackageStatus::Finished,
        }
    } else {
        match start {
            Some(start) if older_than(start, STALE_AFTER_MONTHS, today) => {
                PackageStatus::ExpiredActive
            }
            _ => PackageStatus::Active,
        }
    }
}

/// Roster rank, ascending. Members lead, actionable students follow,
/// expired and stale ones sink to the bottom.
pub fn sort_priority(student: &Student, lessons: &[Lesson], today: NaiveDate) -> u8 {
    let status = package_status(student, lessons, today);
    match (student.package, status) {
        (PackageKind::Member, _) => 1,
        (PackageKind::Pack5, PackageStatus::ExpiredActive | PackageStatus::ExpiredFinished) => 8,
        (PackageKind::Pack5, PackageStatus::Finished) => {
            if effective_start_date(student, lessons).is_some() {
                2
            } else {
                3
            }
        }
        (PackageKind::Pack5, _) => 3,
        (PackageKind::Discovery, PackageStatus::Inactive) => 9,
        (PackageKind::Discovery, PackageStatus::Finished) => 4,
        (PackageKind::Discovery, _) => 5,
        (PackageKind::Contact, _) => 6,
        (PackageKind::MemberInactive, _) => 7,
    }
}

/// Full ordering for the roster view: rank, then first name.
pub fn roster_key(student: &Student, lessons: &[Lesson], today: NaiveDate) -> (u8, String) {
    (
        sort_priority(student, lessons, today),
        student.first_name.to_lowercase(),
    )
}

/// "2 / 5" style progress column.
pub fn progress_label(student: &Student, lessons: &[Lesson]) -> String {
    match student.package.lesson_limit() {
        Some(limit) => format!("{} / {}", confirmed_lesson_count(student, lessons), limit),
        None if student.package == PackageKind::Member => "unlimited".to_owned(),
        None => "-".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::{Attendance, LessonStudent};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn student(package: PackageKind) -> Student {
        Student::new(
            "John".to_owned(),
            "Doe".to_owned(),
            "john@example.com".to_owned(),
            "fr".to_owned(),
            None,
            package,
        )
    }

    fn lesson(day: Option<NaiveDate>, status: Attendance, student_id: ObjectId) -> Lesson {
        let mut lesson = Lesson::new(date(2000, 1, 1), Slot::SixPm, None);
        lesson.date = day;
        lesson.students.push(LessonStudent {
            student_id,
            status,
            coach_id: None,
        });
        lesson
    }

    #[test]
    fn test_count_only_confirmed_links() {
        let s = student(PackageKind::Pack5);
        let lessons = vec![
            lesson(Some(date(2024, 1, 2)), Attendance::Confirmed, s.id),
            lesson(Some(date(2024, 1, 9)), Attendance::Proposed, s.id),
            lesson(Some(date(2024, 1, 16)), Attendance::Cancelled, s.id),
            lesson(Some(date(2024, 1, 23)), Attendance::Confirmed, ObjectId::new()),
        ];

        assert_eq!(1, confirmed_lesson_count(&s, &lessons));
    }

    #[test]
    fn test_stored_start_date_filters_counting() {
        let mut s = student(PackageKind::Pack5);
        s.package_start_date = Some(date(2024, 2, 1));
        let lessons = vec![
            lesson(Some(date(2024, 1, 5)), Attendance::Confirmed, s.id),
            lesson(Some(date(2024, 2, 1)), Attendance::Confirmed, s.id),
            lesson(Some(date(2024, 2, 8)), Attendance::Confirmed, s.id),
            lesson(None, Attendance::Confirmed, s.id),
        ];

        assert_eq!(2, confirmed_lesson_count(&s, &lessons));
        let detail = lesson_detail(&s, &lessons);
        assert_eq!(2, detail.counted.len());
        // One predates the window, one has no readable date.
        assert_eq!(2, detail.excluded);
    }

    #[test]
    fn test_no_stored_start_date_counts_everything() {
        // The inferred start date never filters the counter itself.
        let s = student(PackageKind::Pack5);
        let lessons = vec![
            lesson(Some(date(2024, 1, 2)), Attendance::Confirmed, s.id),
            lesson(Some(date(2024, 1, 9)), Attendance::Confirmed, s.id),
            lesson(Some(date(2024, 1, 16)), Attendance::Confirmed, s.id),
        ];

        assert_eq!(Some(date(2024, 1, 9)), effective_start_date(&s, &lessons));
        assert_eq!(3, confirmed_lesson_count(&s, &lessons));
    }

    #[test]
    fn test_manual_adjustment_can_go_negative() {
        let mut s = student(PackageKind::Pack5);
        s.manual_adjustment = -2;
        let lessons = vec![lesson(Some(date(2024, 1, 2)), Attendance::Confirmed, s.id)];

        assert_eq!(-1, confirmed_lesson_count(&s, &lessons));
        let detail = lesson_detail(&s, &lessons);
        assert_eq!(detail.total, detail.counted.len() as i64 + detail.adjustment as i64);
    }

    #[test]
    fn test_detail_reconciles_with_count() {
        let mut s = student(PackageKind::Pack5);
        s.manual_adjustment = 3;
        s.package_start_date = Some(date(2024, 1, 10));
        let lessons = vec![
            lesson(Some(date(2024, 1, 5)), Attendance::Confirmed, s.id),
            lesson(Some(date(2024, 1, 12)), Attendance::Confirmed, s.id),
        ];

        let detail = lesson_detail(&s, &lessons);
        assert_eq!(confirmed_lesson_count(&s, &lessons), detail.total);
        assert_eq!(detail.total, detail.counted.len() as i64 + detail.adjustment as i64);
        assert_eq!(Some(date(2024, 1, 10)), detail.start_date);
        assert_eq!(1, detail.excluded);
    }

    #[test]
    fn test_counted_lessons_sorted_by_date_then_slot() {
        let s = student(PackageKind::Member);
        let mut second = lesson(Some(date(2024, 1, 8)), Attendance::Confirmed, s.id);
        second.slot = Slot::SevenPm;
        let lessons = vec![
            second,
            lesson(Some(date(2024, 1, 8)), Attendance::Confirmed, s.id),
            lesson(Some(date(2024, 1, 4)), Attendance::Confirmed, s.id),
        ];

        let counted = counted_lessons(&s, &lessons);
        assert_eq!(
            vec![
                (Some(date(2024, 1, 4)), Slot::SixPm),
                (Some(date(2024, 1, 8)), Slot::SixPm),
                (Some(date(2024, 1, 8)), Slot::SevenPm),
            ],
            counted.into_iter().map(|l| (l.date, l.slot)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_effective_start_date_rules() {
        let s = student(PackageKind::Pack5);

        let two = vec![
            lesson(Some(date(2024, 1, 5)), Attendance::Confirmed, s.id),
            lesson(Some(date(2024, 2, 10)), Attendance::Confirmed, s.id),
        ];
        assert_eq!(Some(date(2024, 2, 10)), effective_start_date(&s, &two));

        let one = vec![lesson(Some(date(2024, 1, 5)), Attendance::Confirmed, s.id)];
        assert_eq!(Some(date(2024, 1, 5)), effective_start_date(&s, &one));

        assert_eq!(None, effective_start_date(&s, &[]));

        let mut overridden = student(PackageKind::Pack5);
        overridden.package_start_date = Some(date(2024, 3, 1));
        assert_eq!(Some(date(2024, 3, 1)), effective_start_date(&overridden, &two));
    }

    #[test]
    fn test_discovery_statuses() {
        let today = date(2024, 6, 15);
        let s = student(PackageKind::Discovery);

        assert_eq!(PackageStatus::Future, package_status(&s, &[], today));

        // Only a future lesson scheduled: still not taken.
        let upcoming = vec![lesson(Some(date(2024, 7, 1)), Attendance::Confirmed, s.id)];
        assert_eq!(PackageStatus::Future, package_status(&s, &upcoming, today));

        let recent = vec![lesson(Some(date(2024, 5, 20)), Attendance::Confirmed, s.id)];
        assert_eq!(PackageStatus::Finished, package_status(&s, &recent, today));

        // Over three months old: stale, not finished.
        let old = vec![lesson(Some(date(2024, 2, 1)), Attendance::Confirmed, s.id)];
        assert_eq!(PackageStatus::Inactive, package_status(&s, &old, today));
    }

    #[test]
    fn test_pack_finished_and_expiry() {
        let today = date(2024, 8, 1);

        let mut s = student(PackageKind::Pack5);
        s.package_start_date = Some(date(2024, 2, 20));
        let five: Vec<Lesson> = (0..5)
            .map(|i| lesson(Some(date(2024, 3, 1 + i)), Attendance::Confirmed, s.id))
            .collect();
        // Started over five months ago.
        assert_eq!(PackageStatus::ExpiredFinished, package_status(&s, &five, today));

        s.package_start_date = Some(date(2024, 4, 1));
        let five: Vec<Lesson> = (0..5)
            .map(|i| lesson(Some(date(2024, 4, 1 + i)), Attendance::Confirmed, s.id))
            .collect();
        // Four months: finished, not expired.
        assert_eq!(PackageStatus::Finished, package_status(&s, &five, today));
    }

    #[test]
    fn test_pack_active_and_stale() {
        let today = date(2024, 8, 1);

        let mut s = student(PackageKind::Pack5);
        s.package_start_date = Some(date(2024, 7, 1));
        let two = vec![
            lesson(Some(date(2024, 7, 4)), Attendance::Confirmed, s.id),
            lesson(Some(date(2024, 7, 11)), Attendance::Confirmed, s.id),
        ];
        assert_eq!(PackageStatus::Active, package_status(&s, &two, today));

        s.package_start_date = Some(date(2024, 4, 1));
        let two = vec![
            lesson(Some(date(2024, 4, 4)), Attendance::Confirmed, s.id),
            lesson(Some(date(2024, 4, 11)), Attendance::Confirmed, s.id),
        ];
        assert_eq!(PackageStatus::ExpiredActive, package_status(&s, &two, today));
    }

    #[test]
    fn test_future_pack_lessons_do_not_finish_it() {
        let today = date(2024, 8, 1);
        let s = student(PackageKind::Pack5);
        let lessons: Vec<Lesson> = (0..5)
            .map(|i| lesson(Some(date(2024, 8, 5 + i)), Attendance::Confirmed, s.id))
            .collect();

        assert_eq!(PackageStatus::Active, package_status(&s, &lessons, today));
    }

    #[test]
    fn test_sort_priority_tiers() {
        let today = date(2024, 8, 1);

        let member = student(PackageKind::Member);

        let mut finished_pack = student(PackageKind::Pack5);
        finished_pack.package_start_date = Some(date(2024, 6, 1));
        let mut pack_lessons: Vec<Lesson> = (0..5)
            .map(|i| lesson(Some(date(2024, 6, 3 + i)), Attendance::Confirmed, finished_pack.id))
            .collect();

        let active_discovery = student(PackageKind::Discovery);
        let contact = student(PackageKind::Contact);

        assert_eq!(1, sort_priority(&member, &pack_lessons, today));
        assert_eq!(2, sort_priority(&finished_pack, &pack_lessons, today));
        assert_eq!(5, sort_priority(&active_discovery, &pack_lessons, today));
        assert_eq!(6, sort_priority(&contact, &pack_lessons, today));

        // An expired pack sinks below every normal tier.
        finished_pack.package_start_date = Some(date(2024, 1, 1));
        for (i, l) in pack_lessons.iter_mut().enumerate() {
            l.date = Some(date(2024, 1, 3 + i as u32));
        }
        assert_eq!(8, sort_priority(&finished_pack, &pack_lessons, today));

        // A stale discovery sinks even lower.
        let stale = student(PackageKind::Discovery);
        let old = vec![lesson(Some(date(2024, 2, 1)), Attendance::Confirmed, stale.id)];
        assert_eq!(9, sort_priority(&stale, &old, today));

        assert_eq!(7, sort_priority(&student(PackageKind::MemberInactive), &[], today));
    }

    #[test]
    fn test_roster_key_breaks_ties_by_first_name() {
        let today = date(2024, 8, 1);
        let mut anna = student(PackageKind::Contact);
        anna.first_name = "anna".to_owned();
        let mut bob = student(PackageKind::Contact);
        bob.first_name = "Bob".to_owned();

        assert!(roster_key(&anna, &[], today) < roster_key(&bob, &[], today));
    }

    #[test]
    fn test_progress_label() {
        let s = student(PackageKind::Pack5);
        let lessons = vec![
            lesson(Some(date(2024, 1, 2)), Attendance::Confirmed, s.id),
            lesson(Some(date(2024, 1, 9)), Attendance::Confirmed, s.id),
        ];
        assert_eq!("2 / 5", progress_label(&s, &lessons));
        assert_eq!("unlimited", progress_label(&student(PackageKind::Member), &[]));
        assert_eq!("-", progress_label(&student(PackageKind::Contact), &[]));
    }
}
