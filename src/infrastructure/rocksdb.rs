use crate::domain::course::Course;
use crate::domain::ids::{CourseId, LessonId, SessionId, UserId};
use crate::domain::ports::{CompletionStore, CourseCatalog, UserStore};
use crate::domain::progress::{CompletionChange, CompletionRecord};
use crate::domain::user::{CheckoutGrant, PendingCheckout, User};
use crate::error::{EnrollmentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Options, TransactionDB, TransactionDBOptions};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing user enrollment state.
pub const CF_USERS: &str = "users";
/// Column Family for storing catalog entries.
pub const CF_COURSES: &str = "courses";
/// Column Family for storing lesson completion records.
pub const CF_COMPLETIONS: &str = "completions";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for `User`, `Course` and `CompletionRecord` entities using
/// separate Column Families. Read-modify-write operations run inside a
/// pessimistic transaction that locks the record with `get_for_update`, so
/// concurrent updates of the same user serialize instead of overwriting
/// each other.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<TransactionDB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<TransactionDB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_USERS, CF_COURSES, CF_COMPLETIONS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = TransactionDB::open_cf_descriptors(
            &opts,
            &TransactionDBOptions::default(),
            path,
            cfs,
        )?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            EnrollmentError::Storage(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        self.db.put_cf(cf, key, serde_json::to_vec(value)?)?;
        Ok(())
    }

    /// Locks, mutates and writes back one user in a single transaction.
    fn update_user<T>(&self, user_id: &UserId, f: impl FnOnce(&mut User) -> T) -> Result<T> {
        let cf = self.cf(CF_USERS)?;
        let key = user_id.as_str().as_bytes();
        let txn = self.db.transaction();
        let bytes = txn
            .get_for_update_cf(cf, key, true)?
            .ok_or_else(|| EnrollmentError::NotFound(format!("User {user_id}")))?;
        let mut user: User = serde_json::from_slice(&bytes)?;
        let outcome = f(&mut user);
        txn.put_cf(cf, key, serde_json::to_vec(&user)?)?;
        txn.commit()?;
        Ok(outcome)
    }

    fn update_completion(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        f: impl FnOnce(&mut CompletionRecord) -> CompletionChange,
        create: bool,
    ) -> Result<CompletionChange> {
        let cf = self.cf(CF_COMPLETIONS)?;
        let key = completion_key(user_id, course_id)?;
        let txn = self.db.transaction();
        let mut record = match txn.get_for_update_cf(cf, &key, true)? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None if create => CompletionRecord::new(user_id.clone(), course_id.clone()),
            None => return Ok(CompletionChange::Unchanged),
        };
        let change = f(&mut record);
        if change != CompletionChange::Unchanged {
            txn.put_cf(cf, &key, serde_json::to_vec(&record)?)?;
        }
        txn.commit()?;
        Ok(change)
    }
}

fn completion_key(user_id: &UserId, course_id: &CourseId) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&(user_id, course_id))?)
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn store(&self, user: User) -> Result<()> {
        self.write(CF_USERS, user.id.as_str().as_bytes(), &user)
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<User>> {
        self.read(CF_USERS, user_id.as_str().as_bytes())
    }

    async fn add_course(&self, user_id: &UserId, course_id: &CourseId) -> Result<bool> {
        self.update_user(user_id, |user| user.enroll(course_id.clone()))
    }

    async fn set_pending_checkout(&self, user_id: &UserId, pending: PendingCheckout) -> Result<()> {
        self.update_user(user_id, |user| {
            user.begin_checkout(pending);
        })
    }

    async fn complete_checkout(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        course_id: &CourseId,
    ) -> Result<CheckoutGrant> {
        self.update_user(user_id, |user| user.complete_checkout(session_id, course_id))
    }

    async fn get_all(&self) -> Result<Vec<User>> {
        let cf = self.cf(CF_USERS)?;
        let mut users = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            users.push(serde_json::from_slice::<User>(&value)?);
        }
        Ok(users)
    }
}

#[async_trait]
impl CourseCatalog for RocksDBStore {
    async fn store(&self, course: Course) -> Result<()> {
        self.write(CF_COURSES, course.id.as_str().as_bytes(), &course)
    }

    async fn get(&self, course_id: &CourseId) -> Result<Option<Course>> {
        self.read(CF_COURSES, course_id.as_str().as_bytes())
    }

    async fn get_many(&self, course_ids: &[CourseId]) -> Result<Vec<Course>> {
        let mut courses = Vec::with_capacity(course_ids.len());
        for id in course_ids {
            if let Some(course) = self.read::<Course>(CF_COURSES, id.as_str().as_bytes())? {
                courses.push(course);
            }
        }
        courses.sort_by(|a, b| a.id.cmp(&b.id));
        courses.dedup_by(|a, b| a.id == b.id);
        Ok(courses)
    }
}

#[async_trait]
impl CompletionStore for RocksDBStore {
    async fn get(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<CompletionRecord>> {
        self.read(CF_COMPLETIONS, &completion_key(user_id, course_id)?)
    }

    async fn mark(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        lesson_id: LessonId,
    ) -> Result<CompletionChange> {
        self.update_completion(user_id, course_id, |record| record.mark(lesson_id), true)
    }

    async fn unmark(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        lesson_id: &LessonId,
    ) -> Result<CompletionChange> {
        self.update_completion(user_id, course_id, |record| record.unmark(lesson_id), false)
    }
}
