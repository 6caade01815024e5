//! JSON-file collaborator backend: the whole store lives in one file that is
//! rewritten after every mutation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use pocketpilot_core::{
    Expense, ExpensePatch, ExpenseStore, Goal, GoalStore, NewExpense, NewGoal, ProfilePatch,
    ProfileStore, StoreResult, UserId, UserProfile,
};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::activity::ActivityEntry;
use crate::state::StoreState;

#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl JsonStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let s = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?
        } else {
            StoreState::default()
        };
        debug!(path = %path.display(), expenses = state.expenses.len(), "opened json store");
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn recent_activity(&self, user: &UserId, limit: usize) -> Vec<ActivityEntry> {
        self.state.read().await.recent_activity(user, limit)
    }

    /// Write to a sibling temp file, then rename over the target.
    fn persist(&self, state: &StoreState) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(state).context("serialize store")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("rename {} -> {}", tmp.display(), self.path.display()))?;
        Ok(())
    }

    /// Apply `op` to a copy of the state and keep it only once it is on disk.
    async fn mutate<T>(&self, op: impl FnOnce(&mut StoreState) -> StoreResult<T>) -> StoreResult<T> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let out = op(&mut next)?;
        self.persist(&next)?;
        *state = next;
        Ok(out)
    }
}

#[async_trait]
impl ExpenseStore for JsonStore {
    async fn add_expense(&self, user: &UserId, expense: NewExpense) -> StoreResult<String> {
        let now = Utc::now();
        let id = self.mutate(|s| s.add_expense(user, expense, now)).await?;
        info!(user = %user, expense_id = %id, "expense added");
        Ok(id)
    }

    async fn update_expense(
        &self,
        user: &UserId,
        id: &str,
        patch: ExpensePatch,
    ) -> StoreResult<()> {
        self.mutate(|s| s.update_expense(user, id, patch)).await?;
        info!(user = %user, expense_id = %id, "expense updated");
        Ok(())
    }

    async fn delete_expense(&self, user: &UserId, id: &str) -> StoreResult<()> {
        self.mutate(|s| s.delete_expense(user, id)).await?;
        info!(user = %user, expense_id = %id, "expense deleted");
        Ok(())
    }

    async fn fetch_recent_expenses(&self, user: &UserId, max: usize) -> StoreResult<Vec<Expense>> {
        self.state.read().await.recent_expenses(user, max)
    }
}

#[async_trait]
impl GoalStore for JsonStore {
    async fn add_goal(&self, user: &UserId, goal: NewGoal) -> StoreResult<String> {
        let now = Utc::now();
        let id = self.mutate(|s| s.add_goal(user, goal, now)).await?;
        info!(user = %user, goal_id = %id, "goal added");
        Ok(id)
    }

    async fn fetch_goals(&self, user: &UserId) -> StoreResult<Vec<Goal>> {
        self.state.read().await.fetch_goals(user)
    }

    async fn delete_goal(&self, user: &UserId, id: &str) -> StoreResult<()> {
        self.mutate(|s| s.delete_goal(user, id)).await?;
        info!(user = %user, goal_id = %id, "goal deleted");
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for JsonStore {
    async fn upsert_user_profile(&self, user: &UserId, patch: ProfilePatch) -> StoreResult<()> {
        let now = Utc::now();
        self.mutate(|s| s.upsert_profile(user, patch, now)).await?;
        info!(user = %user, "profile updated");
        Ok(())
    }

    async fn fetch_user_profile(&self, user: &UserId) -> StoreResult<Option<UserProfile>> {
        self.state.read().await.fetch_profile(user)
    }
}
