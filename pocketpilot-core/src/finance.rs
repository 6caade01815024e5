//! Expense, goal and profile records exchanged with the data collaborators.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::Currency;

/// Authenticated user whose partition every collaborator call targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty ids stand for "not signed in".
    pub fn is_anonymous(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One labelled portion of a split expense ("Me", "Alex", ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitShare {
    pub label: String,
    pub amount: f64,
}

impl SplitShare {
    pub fn new(label: impl Into<String>, amount: f64) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// A stored expense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    /// Unique identifier for this record
    pub id: String,
    /// Owner of the record
    pub user_id: UserId,
    /// The user's own share
    pub amount: f64,
    /// Whole bill when the expense was split; equal to `amount` otherwise
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    /// Ordered shares, starting with "Me", when a split happened
    #[serde(default)]
    pub splits: Option<Vec<SplitShare>>,
    /// Creation instant; records without one cannot be placed on a day
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Expense {
    /// Total bill, falling back to the user's share.
    pub fn total(&self) -> f64 {
        self.total_amount.unwrap_or(self.amount)
    }

    pub fn is_split(&self) -> bool {
        self.splits.as_ref().is_some_and(|s| s.len() > 1)
    }
}

/// Input for `ExpenseStore::add_expense`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewExpense {
    pub amount: f64,
    pub total_amount: Option<f64>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub splits: Option<Vec<SplitShare>>,
}

impl NewExpense {
    pub fn new(amount: f64) -> Self {
        Self {
            amount,
            total_amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|n| !n.trim().is_empty());
        self
    }
}

/// Partial update for `ExpenseStore::update_expense`; `None` leaves a field as is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub total_amount: Option<f64>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub splits: Option<Vec<SplitShare>>,
}

impl ExpensePatch {
    pub fn apply(self, expense: &mut Expense) {
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(total) = self.total_amount {
            expense.total_amount = Some(total);
        }
        if let Some(category) = self.category {
            expense.category = Some(category);
        }
        if let Some(note) = self.note {
            expense.note = Some(note);
        }
        if let Some(splits) = self.splits {
            expense.splits = Some(splits);
        }
    }
}

/// A savings goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: String,
    pub user_id: UserId,
    pub title: String,
    pub target_amount: f64,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for `GoalStore::add_goal`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewGoal {
    pub title: String,
    pub target_amount: f64,
    pub deadline: Option<NaiveDate>,
    pub category: Option<String>,
}

impl NewGoal {
    pub fn new(title: impl Into<String>, target_amount: f64) -> Self {
        Self {
            title: title.into(),
            target_amount,
            deadline: None,
            category: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UserProfile {
    #[serde(default)]
    pub monthly_income: Option<f64>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Merge-update for `ProfileStore::upsert_user_profile`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProfilePatch {
    pub monthly_income: Option<f64>,
    pub currency: Option<Currency>,
}

impl ProfilePatch {
    pub fn apply(self, profile: &mut UserProfile, now: DateTime<Utc>) {
        if let Some(income) = self.monthly_income {
            profile.monthly_income = Some(income);
        }
        if let Some(currency) = self.currency {
            profile.currency = Some(currency);
        }
        profile.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_expense() -> Expense {
        Expense {
            id: "exp-001".to_string(),
            user_id: UserId::from("u1"),
            amount: 60.0,
            total_amount: Some(100.0),
            category: Some("Dining Out".to_string()),
            note: None,
            splits: Some(vec![SplitShare::new("Me", 60.0), SplitShare::new("Alex", 40.0)]),
            created_at: Some(Utc.with_ymd_and_hms(2024, 6, 12, 18, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_expense_totals() {
        let e = sample_expense();
        assert_eq!(e.total(), 100.0);
        assert!(e.is_split());

        let plain = Expense {
            total_amount: None,
            splits: None,
            ..e
        };
        assert_eq!(plain.total(), 60.0);
        assert!(!plain.is_split());
    }

    #[test]
    fn test_expense_patch_only_touches_given_fields() {
        let mut e = sample_expense();
        ExpensePatch {
            amount: Some(75.0),
            total_amount: Some(75.0),
            ..ExpensePatch::default()
        }
        .apply(&mut e);
        assert_eq!(e.amount, 75.0);
        assert_eq!(e.total_amount, Some(75.0));
        assert_eq!(e.category.as_deref(), Some("Dining Out"));
    }

    #[test]
    fn test_profile_patch_merges() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut profile = UserProfile {
            monthly_income: Some(4000.0),
            currency: Some(Currency::Eur),
            updated_at: None,
        };
        ProfilePatch {
            monthly_income: Some(5000.0),
            currency: None,
        }
        .apply(&mut profile, now);
        assert_eq!(profile.monthly_income, Some(5000.0));
        assert_eq!(profile.currency, Some(Currency::Eur));
        assert_eq!(profile.updated_at, Some(now));
    }

    #[test]
    fn test_expense_json_tolerates_missing_optionals() {
        let json = r#"{"id":"e1","user_id":"u1","amount":12.5}"#;
        let e: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(e.user_id.as_str(), "u1");
        assert_eq!(e.created_at, None);
        assert_eq!(e.total(), 12.5);
    }

    #[test]
    fn test_new_expense_drops_blank_note() {
        let e = NewExpense::new(45.0).with_note(Some("  ".to_string()));
        assert_eq!(e.note, None);
        assert_eq!(e.total_amount, Some(45.0));
    }
}
