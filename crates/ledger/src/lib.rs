use service::accounting::Accounting;
use service::calendar::Calendar;
use service::coaches::Coaches;
use service::repair::Repair;
use service::statistics::Statistics;
use service::students::Students;
use storage::{session::Db, Storage};

pub mod service;

#[derive(Clone)]
pub struct Ledger {
    pub db: Db,
    pub students: Students,
    pub coaches: Coaches,
    pub calendar: Calendar,
    pub accounting: Accounting,
    pub repair: Repair,
    pub statistics: Statistics,
}

impl Ledger {
    pub fn new(storage: Storage) -> Self {
        let students = Students::new(storage.students.clone());
        let coaches = Coaches::new(storage.coaches.clone());
        let calendar = Calendar::new(storage.calendar.clone(), storage.students.clone());
        let accounting = Accounting::new(storage.students.clone(), storage.calendar.clone());
        let repair = Repair::new(storage.students.clone(), storage.calendar.clone());
        let statistics = Statistics::new(storage.students.clone(), storage.calendar.clone());

        Ledger {
            db: storage.db,
            students,
            coaches,
            calendar,
            accounting,
            repair,
            statistics,
        }
    }
}
