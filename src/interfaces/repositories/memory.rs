//! Process-local stores, used when no database is configured and in tests.
//!
//! Nothing here survives a restart and nothing is shared between processes.

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use parking_lot::RwLock;

use crate::{
    entities::{contact::ContactSubmission, subscription::SubscriptionRecord},
    errors::DatabaseError,
    repositories::{contact::ContactRepository, subscription::SubscriptionStore},
};

#[derive(Debug, Default)]
pub struct InMemorySubscriptionStore {
    records: DashMap<String, SubscriptionRecord>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, identity: &str) -> Option<SubscriptionRecord> {
        self.records.get(identity).map(|r| r.value().clone())
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn check_connection(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn exists(&self, identity: &str) -> Result<bool, DatabaseError> {
        Ok(self.records.contains_key(&identity.to_lowercase()))
    }

    async fn insert(&self, record: &SubscriptionRecord) -> Result<(), DatabaseError> {
        if self.insert_if_absent(record).await? {
            Ok(())
        } else {
            Err(DatabaseError::ConstraintViolation(format!(
                "duplicate identity {}",
                record.identity
            )))
        }
    }

    async fn insert_if_absent(&self, record: &SubscriptionRecord) -> Result<bool, DatabaseError> {
        match self.records.entry(record.identity.to_lowercase()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
                Ok(true)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryContactRepo {
    submissions: RwLock<Vec<ContactSubmission>>,
}

impl InMemoryContactRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepo {
    async fn check_connection(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn create_submission(&self, submission: &ContactSubmission) -> Result<(), DatabaseError> {
        self.submissions.write().push(submission.clone());
        Ok(())
    }

    async fn list_submissions(&self) -> Result<Vec<ContactSubmission>, DatabaseError> {
        let mut submissions = self.submissions.read().clone();
        submissions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(submissions)
    }

    async fn count_submissions(&self) -> Result<i64, DatabaseError> {
        Ok(self.submissions.read().len() as i64)
    }
}
