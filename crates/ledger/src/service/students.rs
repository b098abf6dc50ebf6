use bson::oid::ObjectId;
use chrono::Local;
use eyre::Result;
use model::{
    errors::LedgerError,
    package::PackageKind,
    session::Session,
    student::{Student, StudentUpdate},
};
use storage::student::StudentStore;
use tx_macro::tx;

#[derive(Clone)]
pub struct Students {
    store: StudentStore,
}

impl Students {
    pub(crate) fn new(store: StudentStore) -> Self {
        Students { store }
    }

    #[tx]
    pub async fn create(
        &self,
        session: &mut Session,
        first_name: String,
        last_name: String,
        email: String,
        language: String,
        main_coach_id: Option<ObjectId>,
        package: PackageKind,
    ) -> Result<ObjectId, LedgerError> {
        if first_name.trim().is_empty() {
            return Err(LedgerError::Validation("first name is empty".to_owned()));
        }
        if email.trim().is_empty() {
            return Err(LedgerError::Validation("email is empty".to_owned()));
        }

        let mut student = Student::new(
            first_name,
            last_name,
            email,
            language,
            main_coach_id,
            package,
        );
        // Buying a pack opens its window today unless a date is set later.
        if package == PackageKind::Pack5 {
            student.package_start_date = Some(Local::now().date_naive());
        }

        let id = student.id;
        self.store.insert(session, student).await?;
        Ok(id)
    }

    #[tx]
    pub async fn update(
        &self,
        session: &mut Session,
        id: ObjectId,
        mut update: StudentUpdate,
    ) -> Result<(), LedgerError> {
        if update.is_empty() {
            return Ok(());
        }
        let student = self
            .store
            .get(session, id)
            .await?
            .ok_or(LedgerError::StudentNotFound(id))?;

        // Switching TO a pack stamps the start date unless the caller
        // supplies one explicitly.
        if update.package == Some(PackageKind::Pack5)
            && student.package != PackageKind::Pack5
            && update.package_start_date.is_none()
        {
            update.package_start_date = Some(Some(Local::now().date_naive()));
        }

        if !self.store.update(session, id, &update).await? {
            return Err(LedgerError::StudentNotFound(id));
        }
        Ok(())
    }

    /// No cascade: roster links referencing the student stay behind and
    /// are filtered by readers.
    #[tx]
    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), LedgerError> {
        if self.store.get(session, id).await?.is_none() {
            return Err(LedgerError::StudentNotFound(id));
        }
        self.store.delete(session, id).await?;
        Ok(())
    }

    #[tx]
    pub async fn set_needs_proposal(
        &self,
        session: &mut Session,
        id: ObjectId,
        flag: bool,
    ) -> Result<(), LedgerError> {
        let update = StudentUpdate {
            needs_proposal: Some(flag),
            ..Default::default()
        };
        if !self.store.update(session, id, &update).await? {
            return Err(LedgerError::StudentNotFound(id));
        }
        Ok(())
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Option<Student>> {
        self.store.get(session, id).await
    }

    pub async fn all(&self, session: &mut Session) -> Result<Vec<Student>> {
        self.store.dump(session).await
    }

    /// Students flagged for manual outreach.
    pub async fn awaiting_proposal(&self, session: &mut Session) -> Result<Vec<Student>> {
        let mut students = self.store.dump(session).await?;
        students.retain(|s| s.needs_proposal);
        Ok(students)
    }
}
