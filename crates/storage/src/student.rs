use std::sync::Arc;

use bson::{doc, oid::ObjectId, to_bson, Document};
use chrono::NaiveDate;
use eyre::{eyre, Error, Result};
use futures_util::stream::TryStreamExt as _;
use log::info;
use model::{
    session::Session,
    student::{Student, StudentUpdate},
};
use mongodb::{Collection, IndexModel};

use crate::session::Db;

const COLLECTION: &str = "students";

#[derive(Clone)]
pub struct StudentStore {
    collection: Arc<Collection<Student>>,
}

impl StudentStore {
    pub(crate) async fn new(db: &Db) -> Result<Self> {
        let collection: Collection<Student> = db.collection(COLLECTION);
        collection
            .create_index(IndexModel::builder().keys(doc! { "email": 1 }).build())
            .await?;
        Ok(StudentStore {
            collection: Arc::new(collection),
        })
    }

    pub async fn insert(&self, session: &mut Session, student: Student) -> Result<(), Error> {
        info!("Inserting student: {:?}", student);
        self.collection
            .insert_one(student)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Option<Student>, Error> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?)
    }

    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        info!("Deleting student: {}", id);
        self.collection
            .delete_one(doc! { "_id": id })
            .session(&mut *session)
            .await?;
        Ok(())
    }

    /// Applies only the supplied fields. Returns false when the student
    /// does not exist.
    pub async fn update(
        &self,
        session: &mut Session,
        id: ObjectId,
        update: &StudentUpdate,
    ) -> Result<bool, Error> {
        let mut set = Document::new();
        let mut unset = Document::new();

        if let Some(first_name) = &update.first_name {
            set.insert("first_name", first_name.clone());
        }
        if let Some(last_name) = &update.last_name {
            set.insert("last_name", last_name.clone());
        }
        if let Some(email) = &update.email {
            set.insert("email", email.clone());
        }
        if let Some(language) = &update.language {
            set.insert("language", language.clone());
        }
        if let Some(main_coach_id) = &update.main_coach_id {
            match main_coach_id {
                Some(coach_id) => set.insert("main_coach_id", *coach_id),
                None => unset.insert("main_coach_id", ""),
            };
        }
        if let Some(package) = &update.package {
            set.insert("package", to_bson(package)?);
        }
        if let Some(date) = &update.package_start_date {
            match date {
                Some(date) => set.insert("package_start_date", to_bson(date)?),
                None => unset.insert("package_start_date", ""),
            };
        }
        if let Some(date) = &update.member_since {
            match date {
                Some(date) => set.insert("member_since", to_bson(date)?),
                None => unset.insert("member_since", ""),
            };
        }
        if let Some(adjustment) = update.manual_adjustment {
            set.insert("manual_adjustment", adjustment);
        }
        if let Some(flag) = update.needs_proposal {
            set.insert("needs_proposal", flag);
        }

        let mut change = doc! { "$inc": { "version": 1 } };
        if !set.is_empty() {
            change.insert("$set", set);
        }
        if !unset.is_empty() {
            change.insert("$unset", unset);
        }

        let result = self
            .collection
            .update_one(doc! { "_id": id }, change)
            .session(&mut *session)
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn set_package_start_date(
        &self,
        session: &mut Session,
        id: ObjectId,
        date: Option<NaiveDate>,
    ) -> Result<(), Error> {
        let change = match date {
            Some(date) => doc! {
                "$set": { "package_start_date": to_bson(&date)? },
                "$inc": { "version": 1 },
            },
            None => doc! {
                "$unset": { "package_start_date": "" },
                "$inc": { "version": 1 },
            },
        };
        let result = self
            .collection
            .update_one(doc! { "_id": id }, change)
            .session(&mut *session)
            .await?;
        if result.matched_count == 0 {
            return Err(eyre!("Student not found: {}", id));
        }
        Ok(())
    }

    pub async fn dump(&self, session: &mut Session) -> Result<Vec<Student>, Error> {
        let mut cursor = self.collection.find(doc! {}).session(&mut *session).await?;
        Ok(cursor.stream(&mut *session).try_collect().await?)
    }
}
