//! Data-collaborator seams.
//!
//! The assistant never talks to storage directly; it goes through these
//! traits, always naming the user partition explicitly.

use async_trait::async_trait;
use std::sync::Arc;

use crate::finance::{
    Expense, ExpensePatch, Goal, NewExpense, NewGoal, ProfilePatch, UserId, UserProfile,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not signed in")]
    NotSignedIn,
    #[error("Expense {id} was not found")]
    NotFound { id: String },
    #[error("Expense {id} belongs to another account")]
    PermissionDenied { id: String },
    #[error("Goal {id} was not found")]
    GoalNotFound { id: String },
    #[error("Goal {id} belongs to another account")]
    GoalPermissionDenied { id: String },
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Store a new expense, returning its id
    async fn add_expense(&self, user: &UserId, expense: NewExpense) -> StoreResult<String>;

    /// Update fields of an existing expense owned by `user`
    async fn update_expense(&self, user: &UserId, id: &str, patch: ExpensePatch)
    -> StoreResult<()>;

    /// Delete an expense owned by `user`.
    /// Fails with `NotFound` for unknown ids and `PermissionDenied` for foreign ones.
    async fn delete_expense(&self, user: &UserId, id: &str) -> StoreResult<()>;

    /// Most recent expenses, newest first, at most `max`
    async fn fetch_recent_expenses(&self, user: &UserId, max: usize) -> StoreResult<Vec<Expense>>;
}

#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn add_goal(&self, user: &UserId, goal: NewGoal) -> StoreResult<String>;

    /// The user's goals, newest first
    async fn fetch_goals(&self, user: &UserId) -> StoreResult<Vec<Goal>>;

    /// Fails with `GoalNotFound` for unknown ids and `GoalPermissionDenied` for foreign ones.
    async fn delete_goal(&self, user: &UserId, id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Merge `patch` into the user's profile, creating it if needed
    async fn upsert_user_profile(&self, user: &UserId, patch: ProfilePatch) -> StoreResult<()>;

    /// `None` until the first upsert
    async fn fetch_user_profile(&self, user: &UserId) -> StoreResult<Option<UserProfile>>;
}

/// Handles to every collaborator the assistant may call.
#[derive(Clone)]
pub struct Collaborators {
    pub expenses: Arc<dyn ExpenseStore>,
    pub goals: Arc<dyn GoalStore>,
    pub profiles: Arc<dyn ProfileStore>,
}

impl Collaborators {
    pub fn new(
        expenses: Arc<dyn ExpenseStore>,
        goals: Arc<dyn GoalStore>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            expenses,
            goals,
            profiles,
        }
    }

    /// Use one backend for all three roles.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: ExpenseStore + GoalStore + ProfileStore + 'static,
    {
        Self {
            expenses: store.clone(),
            goals: store.clone(),
            profiles: store,
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_messages() {
        let e = StoreError::NotFound { id: "e9".to_string() };
        assert_eq!(e.to_string(), "Expense e9 was not found");

        let e = StoreError::PermissionDenied { id: "e9".to_string() };
        assert_eq!(e.to_string(), "Expense e9 belongs to another account");

        let e = StoreError::GoalNotFound { id: "g1".to_string() };
        assert_eq!(e.to_string(), "Goal g1 was not found");

        let e: StoreError = anyhow::anyhow!("disk full").into();
        assert_eq!(e.to_string(), "disk full");
    }

    #[test]
    fn test_store_error_survives_anyhow() {
        let e: anyhow::Error = StoreError::NotSignedIn.into();
        assert_eq!(e.to_string(), "Not signed in");
        assert!(matches!(e.downcast_ref::<StoreError>(), Some(StoreError::NotSignedIn)));
    }
}
