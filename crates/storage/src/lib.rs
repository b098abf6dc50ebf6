pub mod calendar;
pub mod coach;
pub mod session;
pub mod student;

use calendar::LessonStore;
use coach::CoachStore;
use eyre::Result;
use session::Db;
use student::StudentStore;

const DB_NAME: &str = "academy_db";

#[derive(Clone)]
pub struct Storage {
    pub db: Db,
    pub students: StudentStore,
    pub coaches: CoachStore,
    pub calendar: LessonStore,
}

impl Storage {
    pub async fn new(uri: &str) -> Result<Self> {
        let db = Db::new(uri, DB_NAME).await?;
        let students = StudentStore::new(&db).await?;
        let coaches = CoachStore::new(&db);
        let calendar = LessonStore::new(&db).await?;

        Ok(Storage {
            db,
            students,
            coaches,
            calendar,
        })
    }
}
