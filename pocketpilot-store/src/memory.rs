//! In-memory collaborator backend.

use async_trait::async_trait;
use chrono::Utc;
use pocketpilot_core::{
    Expense, ExpensePatch, ExpenseStore, Goal, GoalStore, NewExpense, NewGoal, ProfilePatch,
    ProfileStore, StoreResult, UserId, UserProfile,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::activity::ActivityEntry;
use crate::state::StoreState;

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: StoreState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Insert a fully-formed expense (fixtures, imports).
    pub async fn seed_expense(&self, expense: Expense) {
        self.state.write().await.seed_expense(expense);
    }

    pub async fn goals(&self, user: &UserId) -> Vec<Goal> {
        self.state.read().await.goals_for(user)
    }

    pub async fn profile(&self, user: &UserId) -> Option<UserProfile> {
        self.state.read().await.profile(user)
    }

    pub async fn recent_activity(&self, user: &UserId, limit: usize) -> Vec<ActivityEntry> {
        self.state.read().await.recent_activity(user, limit)
    }

    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn add_expense(&self, user: &UserId, expense: NewExpense) -> StoreResult<String> {
        let id = self.state.write().await.add_expense(user, expense, Utc::now())?;
        info!(user = %user, expense_id = %id, "expense added");
        Ok(id)
    }

    async fn update_expense(
        &self,
        user: &UserId,
        id: &str,
        patch: ExpensePatch,
    ) -> StoreResult<()> {
        self.state.write().await.update_expense(user, id, patch)?;
        info!(user = %user, expense_id = %id, "expense updated");
        Ok(())
    }

    async fn delete_expense(&self, user: &UserId, id: &str) -> StoreResult<()> {
        self.state.write().await.delete_expense(user, id)?;
        info!(user = %user, expense_id = %id, "expense deleted");
        Ok(())
    }

    async fn fetch_recent_expenses(&self, user: &UserId, max: usize) -> StoreResult<Vec<Expense>> {
        let expenses = self.state.read().await.recent_expenses(user, max)?;
        debug!(user = %user, count = expenses.len(), max, "fetched recent expenses");
        Ok(expenses)
    }
}

#[async_trait]
impl GoalStore for MemoryStore {
    async fn add_goal(&self, user: &UserId, goal: NewGoal) -> StoreResult<String> {
        let id = self.state.write().await.add_goal(user, goal, Utc::now())?;
        info!(user = %user, goal_id = %id, "goal added");
        Ok(id)
    }

    async fn fetch_goals(&self, user: &UserId) -> StoreResult<Vec<Goal>> {
        self.state.read().await.fetch_goals(user)
    }

    async fn delete_goal(&self, user: &UserId, id: &str) -> StoreResult<()> {
        self.state.write().await.delete_goal(user, id)?;
        info!(user = %user, goal_id = %id, "goal deleted");
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn upsert_user_profile(&self, user: &UserId, patch: ProfilePatch) -> StoreResult<()> {
        self.state.write().await.upsert_profile(user, patch, Utc::now())?;
        info!(user = %user, "profile updated");
        Ok(())
    }

    async fn fetch_user_profile(&self, user: &UserId) -> StoreResult<Option<UserProfile>> {
        self.state.read().await.fetch_profile(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketpilot_core::{Currency, StoreError};

    #[tokio::test]
    async fn test_add_then_fetch() {
        let store = MemoryStore::new();
        let user = UserId::from("u1");
        let id = store
            .add_expense(&user, NewExpense::new(45.0).with_category(Some("Groceries".into())))
            .await
            .unwrap();

        let recent = store.fetch_recent_expenses(&user, 120).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, id);
        assert!(recent[0].created_at.is_some());
    }

    #[tokio::test]
    async fn test_partitions_are_per_user() {
        let store = MemoryStore::new();
        let a = UserId::from("a");
        let b = UserId::from("b");
        store.add_expense(&a, NewExpense::new(1.0)).await.unwrap();
        assert!(store.fetch_recent_expenses(&b, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_expense() {
        let store = MemoryStore::new();
        let err = store
            .update_expense(&UserId::from("u1"), "missing", ExpensePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_profile_upsert() {
        let store = MemoryStore::new();
        let user = UserId::from("u1");
        store
            .upsert_user_profile(
                &user,
                ProfilePatch { monthly_income: Some(5000.0), currency: Some(Currency::Usd) },
            )
            .await
            .unwrap();
        let profile = store.profile(&user).await.unwrap();
        assert_eq!(profile.monthly_income, Some(5000.0));
    }
}
