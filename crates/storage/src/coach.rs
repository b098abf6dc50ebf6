use std::collections::HashMap;
use std::sync::Arc;

use bson::{doc, oid::ObjectId, to_bson};
use chrono::Weekday;
use eyre::{eyre, Error, Result};
use futures_util::stream::TryStreamExt as _;
use log::info;
use model::{coach::Coach, session::Session};
use mongodb::Collection;

use crate::session::Db;

const COLLECTION: &str = "coaches";

#[derive(Clone)]
pub struct CoachStore {
    collection: Arc<Collection<Coach>>,
}

impl CoachStore {
    pub(crate) fn new(db: &Db) -> Self {
        CoachStore {
            collection: Arc::new(db.collection(COLLECTION)),
        }
    }

    pub async fn insert(&self, session: &mut Session, coach: Coach) -> Result<(), Error> {
        info!("Inserting coach: {:?}", coach);
        self.collection
            .insert_one(coach)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Option<Coach>, Error> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?)
    }

    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        info!("Deleting coach: {}", id);
        self.collection
            .delete_one(doc! { "_id": id })
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn set_name(&self, session: &mut Session, id: ObjectId, name: String) -> Result<(), Error> {
        self.edit(session, id, doc! { "$set": { "name": name } }).await
    }

    pub async fn set_color(
        &self,
        session: &mut Session,
        id: ObjectId,
        color: String,
    ) -> Result<(), Error> {
        self.edit(session, id, doc! { "$set": { "color": color } }).await
    }

    pub async fn set_absences(
        &self,
        session: &mut Session,
        id: ObjectId,
        absences: String,
    ) -> Result<(), Error> {
        self.edit(session, id, doc! { "$set": { "absences": absences } })
            .await
    }

    pub async fn set_availability(
        &self,
        session: &mut Session,
        id: ObjectId,
        availability: &HashMap<Weekday, bool>,
    ) -> Result<(), Error> {
        self.edit(
            session,
            id,
            doc! { "$set": { "availability": to_bson(availability)? } },
        )
        .await
    }

    async fn edit(
        &self,
        session: &mut Session,
        id: ObjectId,
        mut change: bson::Document,
    ) -> Result<(), Error> {
        change.insert("$inc", doc! { "version": 1 });
        let result = self
            .collection
            .update_one(doc! { "_id": id }, change)
            .session(&mut *session)
            .await?;
        if result.matched_count == 0 {
            return Err(eyre!("Coach not found: {}", id));
        }
        Ok(())
    }

    pub async fn dump(&self, session: &mut Session) -> Result<Vec<Coach>, Error> {
        let mut cursor = self.collection.find(doc! {}).session(&mut *session).await?;
        Ok(cursor.stream(&mut *session).try_collect().await?)
    }
}
