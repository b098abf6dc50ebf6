use std::sync::Arc;

use bson::{doc, oid::ObjectId, to_bson};
use chrono::NaiveDate;
use eyre::{eyre, Error, Result};
use futures_util::stream::TryStreamExt as _;
use log::info;
use model::{
    lesson::{Attendance, Lesson, LessonStudent, Slot},
    session::Session,
};
use mongodb::{options::IndexOptions, Collection, IndexModel};

use crate::session::Db;

const COLLECTION: &str = "lessons";

#[derive(Clone)]
pub struct LessonStore {
    collection: Arc<Collection<Lesson>>,
}

impl LessonStore {
    pub(crate) async fn new(db: &Db) -> Result<Self> {
        let collection: Collection<Lesson> = db.collection(COLLECTION);
        // One lesson per calendar slot.
        let index = IndexModel::builder()
            .keys(doc! { "date": 1, "slot": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection.create_index(index).await?;

        Ok(LessonStore {
            collection: Arc::new(collection),
        })
    }

    pub async fn insert(&self, session: &mut Session, lesson: Lesson) -> Result<(), Error> {
        info!("Inserting lesson: {:?}", lesson);
        self.collection
            .insert_one(lesson)
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn get(&self, session: &mut Session, id: ObjectId) -> Result<Option<Lesson>, Error> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id })
            .session(&mut *session)
            .await?)
    }

    pub async fn get_by_slot(
        &self,
        session: &mut Session,
        date: NaiveDate,
        slot: Slot,
    ) -> Result<Option<Lesson>, Error> {
        Ok(self
            .collection
            .find_one(doc! { "date": to_bson(&date)?, "slot": to_bson(&slot)? })
            .session(&mut *session)
            .await?)
    }

    pub async fn delete(&self, session: &mut Session, id: ObjectId) -> Result<(), Error> {
        info!("Deleting lesson: {}", id);
        self.collection
            .delete_one(doc! { "_id": id })
            .session(&mut *session)
            .await?;
        Ok(())
    }

    pub async fn set_coach(
        &self,
        session: &mut Session,
        id: ObjectId,
        coach_id: Option<ObjectId>,
    ) -> Result<(), Error> {
        let change = match coach_id {
            Some(coach_id) => doc! {
                "$set": { "coach_id": coach_id },
                "$inc": { "version": 1 },
            },
            None => doc! {
                "$unset": { "coach_id": "" },
                "$inc": { "version": 1 },
            },
        };
        self.edit(session, doc! { "_id": id }, change).await
    }

    pub async fn push_student(
        &self,
        session: &mut Session,
        id: ObjectId,
        link: &LessonStudent,
    ) -> Result<(), Error> {
        self.edit(
            session,
            doc! { "_id": id },
            doc! {
                "$push": { "students": to_bson(link)? },
                "$inc": { "version": 1 },
            },
        )
        .await
    }

    pub async fn pull_student(
        &self,
        session: &mut Session,
        id: ObjectId,
        student_id: ObjectId,
    ) -> Result<(), Error> {
        self.edit(
            session,
            doc! { "_id": id },
            doc! {
                "$pull": { "students": { "student_id": student_id } },
                "$inc": { "version": 1 },
            },
        )
        .await
    }

    /// Returns false when the lesson has no such roster entry.
    pub async fn set_student_status(
        &self,
        session: &mut Session,
        id: ObjectId,
        student_id: ObjectId,
        status: Attendance,
    ) -> Result<bool, Error> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id, "students.student_id": student_id },
                doc! {
                    "$set": { "students.$.status": to_bson(&status)? },
                    "$inc": { "version": 1 },
                },
            )
            .session(&mut *session)
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn set_student_coach(
        &self,
        session: &mut Session,
        id: ObjectId,
        student_id: ObjectId,
        coach_id: Option<ObjectId>,
    ) -> Result<bool, Error> {
        let change = match coach_id {
            Some(coach_id) => doc! {
                "$set": { "students.$.coach_id": coach_id },
                "$inc": { "version": 1 },
            },
            None => doc! {
                "$unset": { "students.$.coach_id": "" },
                "$inc": { "version": 1 },
            },
        };
        let result = self
            .collection
            .update_one(doc! { "_id": id, "students.student_id": student_id }, change)
            .session(&mut *session)
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn set_roster(
        &self,
        session: &mut Session,
        id: ObjectId,
        students: &[LessonStudent],
    ) -> Result<(), Error> {
        self.edit(
            session,
            doc! { "_id": id },
            doc! {
                "$set": { "students": to_bson(students)? },
                "$inc": { "version": 1 },
            },
        )
        .await
    }

    pub async fn find_from(
        &self,
        session: &mut Session,
        from: NaiveDate,
    ) -> Result<Vec<Lesson>, Error> {
        let mut cursor = self
            .collection
            .find(doc! { "date": { "$gte": to_bson(&from)? } })
            .session(&mut *session)
            .await?;
        Ok(cursor.stream(&mut *session).try_collect().await?)
    }

    pub async fn dump(&self, session: &mut Session) -> Result<Vec<Lesson>, Error> {
        let mut cursor = self.collection.find(doc! {}).session(&mut *session).await?;
        Ok(cursor.stream(&mut *session).try_collect().await?)
    }

    async fn edit(
        &self,
        session: &mut Session,
        filter: bson::Document,
        change: bson::Document,
    ) -> Result<(), Error> {
        let result = self
            .collection
            .update_one(filter, change)
            .session(&mut *session)
            .await?;
        if result.matched_count == 0 {
            return Err(eyre!("Lesson not found"));
        }
        Ok(())
    }
}
