use bson::oid::ObjectId;
use chrono::Weekday;
use eyre::Result;
use model::{coach::Coach, errors::LedgerError, session::Session};
use storage::coach::CoachStore;
use tx_macro::tx;

#[derive(Clone)]
pub struct Coaches {
    store: CoachStore,
}

impl Coaches {
    pub(crate) fn new(store: CoachStore) -> Self {
        Coaches { store }
    }

    #[tx]
    pub async fn create(
        &self,
        session: &mut Session,
        name: String,
        color: String,
    ) -> Result<ObjectId, LedgerError> {
        if name.trim().is_empty() {
            return Err(LedgerError::Validation("coach name is empty".to_owned()));
        }
        let coach = Coach::new(name, color);
        let id = coach.id;
        self.store.insert(session, coach).await?;
        Ok(id)
    }

    #[tx]
    pub async fn rename(
        &self,
        session: &mut Session,
        id: ObjectId,
        name: String,
    ) -> Result<(), LedgerError> {
        if name.trim().is_empty() {
            return Err(LedgerError::Validation("coach name is empty".to_owned()));
        }
        self.require(session, id).await?;
        self.store.set_name(session, id, name).await?;
        Ok(())
    }

    #[tx]
    pub async fn set_color(
        &self,
        session: &mut Session,
        id: ObjectId,
        color: String,
    ) -> Result<(), LedgerError> {
        self.require(session, id).await?;
        self.store.set_color(session, id, color).await?;
        Ok(())
    }

    #[tx]
    pub async fn set_absences(
        &self,
        session: &mut Session,
        id: ObjectId,
        absences: String,
    ) -> Result<(), LedgerError> {
        self.require(session, id).await?;
        self.store.set_absences(session, id, absences).await?;
        Ok(())
    }

    #[tx]
    pub async fn toggle_availability(
        &self,
        session: &mut Session,
        id: ObjectId,
        weekday: Weekday,
    ) -> Result<bool, LedgerError> {
        let mut coach = self.require(session, id).await?;
        let available = !coach.is_available(weekday);
        coach.availability.insert(weekday, available);
        self.store
            .set_availability(session, id, &coach.availability)
            .await?;
        Ok(available)
    }

    /// Lessons referencing the coach keep the dangling id; readers render
    /// them as unknown.
    #[tx]
    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), LedgerError> {
        self.require(session, id).await?;
        self.store.delete(session, id).await?;
        Ok(())
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Option<Coach>> {
        self.store.get(session, id).await
    }

    pub async fn all(&self, session: &mut Session) -> Result<Vec<Coach>> {
        self.store.dump(session).await
    }

    async fn require(&self, session: &mut Session, id: ObjectId) -> Result<Coach, LedgerError> {
        self.store
            .get(session, id)
            .await?
            .ok_or(LedgerError::CoachNotFound(id))
    }
}
