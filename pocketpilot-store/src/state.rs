//! Plain in-process store state shared by the memory and JSON backends.
//!
//! Every operation takes the user explicitly and the current instant as an
//! argument, so the rules here stay deterministic under test.

use chrono::{DateTime, Utc};
use pocketpilot_core::{
    Expense, ExpensePatch, Goal, NewExpense, NewGoal, ProfilePatch, StoreError, StoreResult,
    UserId, UserProfile,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::activity::{ActivityEntry, ActivityKind};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreState {
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub profiles: BTreeMap<UserId, UserProfile>,
    #[serde(default)]
    pub activity: Vec<ActivityEntry>,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn signed_in(user: &UserId) -> StoreResult<()> {
    if user.is_anonymous() {
        Err(StoreError::NotSignedIn)
    } else {
        Ok(())
    }
}

fn check_amount(amount: f64, what: &str) -> StoreResult<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(StoreError::Invalid(format!("{what} must be a positive amount")))
    }
}

impl StoreState {
    pub fn add_expense(
        &mut self,
        user: &UserId,
        input: NewExpense,
        now: DateTime<Utc>,
    ) -> StoreResult<String> {
        signed_in(user)?;
        check_amount(input.amount, "Expense amount")?;

        let id = new_id();
        let title = input
            .category
            .clone()
            .unwrap_or_else(|| "Expense".to_string());
        self.expenses.push(Expense {
            id: id.clone(),
            user_id: user.clone(),
            amount: input.amount,
            total_amount: input.total_amount,
            category: input.category,
            note: input.note,
            splits: input.splits,
            created_at: Some(now),
        });
        self.record_activity(user, ActivityKind::Expense, &id, title, input.amount, now);
        Ok(id)
    }

    /// Insert a fully-formed record as is (imports, fixtures).
    pub fn seed_expense(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    fn owned_expense_mut(&mut self, user: &UserId, id: &str) -> StoreResult<&mut Expense> {
        let expense = self
            .expenses
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        if &expense.user_id != user {
            return Err(StoreError::PermissionDenied { id: id.to_string() });
        }
        Ok(expense)
    }

    pub fn update_expense(
        &mut self,
        user: &UserId,
        id: &str,
        patch: ExpensePatch,
    ) -> StoreResult<()> {
        signed_in(user)?;
        if let Some(amount) = patch.amount {
            check_amount(amount, "Expense amount")?;
        }
        let expense = self.owned_expense_mut(user, id)?;
        patch.apply(expense);
        Ok(())
    }

    pub fn delete_expense(&mut self, user: &UserId, id: &str) -> StoreResult<()> {
        signed_in(user)?;
        self.owned_expense_mut(user, id)?;
        self.expenses.retain(|e| e.id != id);
        Ok(())
    }

    /// Newest first; records without a timestamp sort last.
    pub fn recent_expenses(&self, user: &UserId, max: usize) -> StoreResult<Vec<Expense>> {
        signed_in(user)?;
        let mut owned: Vec<Expense> = self
            .expenses
            .iter()
            .filter(|e| &e.user_id == user)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        owned.truncate(max);
        Ok(owned)
    }

    pub fn add_goal(&mut self, user: &UserId, input: NewGoal, now: DateTime<Utc>) -> StoreResult<String> {
        signed_in(user)?;
        check_amount(input.target_amount, "Goal target")?;
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(StoreError::Invalid("Goal title cannot be empty".to_string()));
        }

        let id = new_id();
        self.goals.push(Goal {
            id: id.clone(),
            user_id: user.clone(),
            title: title.clone(),
            target_amount: input.target_amount,
            deadline: input.deadline,
            category: input.category.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            created_at: now,
        });
        self.record_activity(user, ActivityKind::Goal, &id, title, input.target_amount, now);
        Ok(id)
    }

    /// Newest first.
    pub fn goals_for(&self, user: &UserId) -> Vec<Goal> {
        let mut owned: Vec<Goal> = self.goals.iter().filter(|g| &g.user_id == user).cloned().collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        owned
    }

    pub fn fetch_goals(&self, user: &UserId) -> StoreResult<Vec<Goal>> {
        signed_in(user)?;
        Ok(self.goals_for(user))
    }

    pub fn delete_goal(&mut self, user: &UserId, id: &str) -> StoreResult<()> {
        signed_in(user)?;
        let goal = self
            .goals
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| StoreError::GoalNotFound { id: id.to_string() })?;
        if &goal.user_id != user {
            return Err(StoreError::GoalPermissionDenied { id: id.to_string() });
        }
        self.goals.retain(|g| g.id != id);
        Ok(())
    }

    pub fn upsert_profile(
        &mut self,
        user: &UserId,
        patch: ProfilePatch,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        signed_in(user)?;
        if let Some(income) = patch.monthly_income {
            check_amount(income, "Monthly income")?;
        }
        let profile = self.profiles.entry(user.clone()).or_default();
        patch.apply(profile, now);
        Ok(())
    }

    pub fn profile(&self, user: &UserId) -> Option<UserProfile> {
        self.profiles.get(user).cloned()
    }

    pub fn fetch_profile(&self, user: &UserId) -> StoreResult<Option<UserProfile>> {
        signed_in(user)?;
        Ok(self.profile(user))
    }

    fn record_activity(
        &mut self,
        user: &UserId,
        kind: ActivityKind,
        reference_id: &str,
        title: String,
        amount: f64,
        now: DateTime<Utc>,
    ) {
        self.activity.push(ActivityEntry {
            id: new_id(),
            user_id: user.clone(),
            kind,
            reference_id: reference_id.to_string(),
            title,
            amount,
            created_at: now,
        });
    }

    pub fn recent_activity(&self, user: &UserId, limit: usize) -> Vec<ActivityEntry> {
        let mut entries: Vec<ActivityEntry> = self
            .activity
            .iter()
            .filter(|a| &a.user_id == user)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_recent_expenses_newest_first() {
        let mut state = StoreState::default();
        let user = UserId::from("u1");
        state.add_expense(&user, NewExpense::new(10.0), t0()).unwrap();
        state.add_expense(&user, NewExpense::new(20.0), t0() + Duration::hours(1)).unwrap();
        state.seed_expense(Expense {
            id: "undated".to_string(),
            user_id: user.clone(),
            amount: 5.0,
            total_amount: None,
            category: None,
            note: None,
            splits: None,
            created_at: None,
        });

        let recent = state.recent_expenses(&user, 10).unwrap();
        let amounts: Vec<f64> = recent.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![20.0, 10.0, 5.0]);

        assert_eq!(state.recent_expenses(&user, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_distinguishes_missing_and_foreign() {
        let mut state = StoreState::default();
        let owner = UserId::from("owner");
        let other = UserId::from("other");
        let id = state.add_expense(&owner, NewExpense::new(12.0), t0()).unwrap();

        assert!(matches!(
            state.delete_expense(&owner, "nope"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            state.delete_expense(&other, &id),
            Err(StoreError::PermissionDenied { .. })
        ));
        state.delete_expense(&owner, &id).unwrap();
        assert!(state.recent_expenses(&owner, 10).unwrap().is_empty());
    }

    #[test]
    fn test_anonymous_user_is_rejected() {
        let mut state = StoreState::default();
        let anon = UserId::from("");
        assert!(matches!(
            state.add_expense(&anon, NewExpense::new(1.0), t0()),
            Err(StoreError::NotSignedIn)
        ));
    }

    #[test]
    fn test_add_goal_logs_activity() {
        let mut state = StoreState::default();
        let user = UserId::from("u1");
        let id = state.add_goal(&user, NewGoal::new("  Vacation ", 1200.0), t0()).unwrap();

        let goals = state.goals_for(&user);
        assert_eq!(goals[0].title, "Vacation");

        let activity = state.recent_activity(&user, 5);
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].kind, ActivityKind::Goal);
        assert_eq!(activity[0].reference_id, id);
    }

    #[test]
    fn test_goals_newest_first_and_delete_checks_owner() {
        let mut state = StoreState::default();
        let owner = UserId::from("owner");
        let other = UserId::from("other");
        let older = state.add_goal(&owner, NewGoal::new("Laptop", 900.0), t0()).unwrap();
        let newer = state
            .add_goal(&owner, NewGoal::new("Trip", 1500.0), t0() + Duration::days(1))
            .unwrap();

        let titles: Vec<String> = state.fetch_goals(&owner).unwrap().into_iter().map(|g| g.title).collect();
        assert_eq!(titles, vec!["Trip", "Laptop"]);

        assert!(matches!(
            state.delete_goal(&owner, "nope"),
            Err(StoreError::GoalNotFound { .. })
        ));
        assert!(matches!(
            state.delete_goal(&other, &newer),
            Err(StoreError::GoalPermissionDenied { .. })
        ));
        state.delete_goal(&owner, &newer).unwrap();
        let left = state.fetch_goals(&owner).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, older);
        assert!(matches!(state.fetch_goals(&UserId::from("")), Err(StoreError::NotSignedIn)));
    }

    #[test]
    fn test_non_positive_amounts_rejected() {
        let mut state = StoreState::default();
        let user = UserId::from("u1");
        assert!(matches!(
            state.add_goal(&user, NewGoal::new("Fund", 0.0), t0()),
            Err(StoreError::Invalid(_))
        ));
        assert!(matches!(
            state.upsert_profile(
                &user,
                ProfilePatch { monthly_income: Some(-1.0), currency: None },
                t0()
            ),
            Err(StoreError::Invalid(_))
        ));
    }
}
