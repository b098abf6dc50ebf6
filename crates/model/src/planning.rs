use std::collections::HashSet;

use bson::oid::ObjectId;
use chrono::NaiveDate;

use crate::{
    lesson::{Attendance, Lesson},
    student::Student,
};

/// One roster entry surfaced by the planning triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriageItem {
    pub student_id: ObjectId,
    pub lesson_id: ObjectId,
}

/// Triage over upcoming lessons. A student appears at most once per tier,
/// earliest lesson first; tiers are independent of each other.
#[derive(Debug, Default, Clone)]
pub struct PlanningTriage {
    /// Flagged students with no scheduled lesson to point at.
    pub awaiting_proposal: Vec<ObjectId>,
    pub awaiting_confirmation: Vec<TriageItem>,
    pub awaiting_coach: Vec<TriageItem>,
    pub confirmed: Vec<TriageItem>,
}

pub fn needs_proposal(students: &[Student]) -> Vec<ObjectId> {
    students
        .iter()
        .filter(|s| s.needs_proposal)
        .map(|s| s.id)
        .collect()
}

pub fn triage(students: &[Student], lessons: &[Lesson], today: NaiveDate) -> PlanningTriage {
    let known: HashSet<ObjectId> = students.iter().map(|s| s.id).collect();

    let mut upcoming: Vec<&Lesson> = lessons
        .iter()
        .filter(|l| l.date.map_or(false, |date| date >= today))
        .collect();
    upcoming.sort_by_key(|l| (l.date, l.slot));

    let mut result = PlanningTriage {
        awaiting_proposal: needs_proposal(students),
        ..Default::default()
    };
    let mut seen_proposed = HashSet::new();
    let mut seen_unassigned = HashSet::new();
    let mut seen_confirmed = HashSet::new();

    for lesson in upcoming {
        for link in &lesson.students {
            // Orphaned link of a deleted student.
            if !known.contains(&link.student_id) {
                continue;
            }
            let item = TriageItem {
                student_id: link.student_id,
                lesson_id: lesson.id,
            };
            match link.status {
                Attendance::Proposed => {
                    if seen_proposed.insert(link.student_id) {
                        result.awaiting_confirmation.push(item);
                    }
                }
                Attendance::Confirmed => {
                    if lesson.coach_for(link).is_none() {
                        if seen_unassigned.insert(link.student_id) {
                            result.awaiting_coach.push(item);
                        }
                    } else if seen_confirmed.insert(link.student_id) {
                        result.confirmed.push(item);
                    }
                }
                Attendance::Cancelled => {}
            }
        }
    }

    result
}
