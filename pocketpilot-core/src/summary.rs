//! Monthly spending summaries, month-over-month history and goal progress.
//!
//! Everything here is a pure function over stored records. Months are keyed
//! "YYYY-MM" and an expense belongs to the month of its calendar day in the
//! configured timezone; undated records are left out.

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use std::collections::BTreeMap;

use crate::amount::round_cents;
use crate::finance::{Expense, Goal};
use crate::time::calendar_day_in;

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// `None` for expenses logged without a category
    pub category: Option<String>,
    pub total: f64,
}

impl CategoryTotal {
    pub fn label(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub month: String,
    pub total_spent: f64,
    pub monthly_income: f64,
    /// Income minus spend; negative when over budget
    pub remaining_budget: f64,
    pub transactions: usize,
    /// Largest first
    pub by_category: Vec<CategoryTotal>,
}

impl MonthlySummary {
    /// A month with no expenses.
    pub fn empty(month: impl Into<String>, monthly_income: f64) -> Self {
        Self {
            month: month.into(),
            total_spent: 0.0,
            monthly_income,
            remaining_budget: round_cents(monthly_income),
            transactions: 0,
            by_category: Vec::new(),
        }
    }

    /// Share of the month's spend in `entry`, 0.0 when nothing was spent.
    pub fn share_of(&self, entry: &CategoryTotal) -> f64 {
        if self.total_spent > 0.0 {
            entry.total / self.total_spent
        } else {
            0.0
        }
    }
}

pub fn month_key(day: NaiveDate) -> String {
    format!("{:04}-{:02}", day.year(), day.month())
}

/// Validate "2024-06" (or "2024-6") into the canonical key.
pub fn parse_month_key(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .ok()
        .map(month_key)
}

/// "2024-06" -> "June 2024"; unparseable keys come back unchanged.
pub fn month_label(key: &str) -> String {
    NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d")
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|_| key.to_string())
}

fn expense_month(expense: &Expense, tz: Tz) -> Option<String> {
    expense
        .created_at
        .map(|at| month_key(calendar_day_in(at, tz)))
}

fn summarize(month: &str, items: &[&Expense], monthly_income: f64) -> MonthlySummary {
    // Grouped case-insensitively; the first spelling seen names the group.
    let mut groups: Vec<CategoryTotal> = Vec::new();
    for expense in items {
        let category = expense
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let slot = groups.iter_mut().find(|g| match (&g.category, category) {
            (Some(have), Some(want)) => have.eq_ignore_ascii_case(want),
            (None, None) => true,
            _ => false,
        });
        match slot {
            Some(group) => group.total += expense.amount,
            None => groups.push(CategoryTotal {
                category: category.map(str::to_string),
                total: expense.amount,
            }),
        }
    }
    for group in &mut groups {
        group.total = round_cents(group.total);
    }
    groups.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.label().cmp(b.label()))
    });

    let total_spent = round_cents(items.iter().map(|e| e.amount).sum());
    MonthlySummary {
        month: month.to_string(),
        total_spent,
        monthly_income,
        remaining_budget: round_cents(monthly_income - total_spent),
        transactions: items.len(),
        by_category: groups,
    }
}

/// Spend in `month` (own shares), against `monthly_income`.
pub fn summarize_month(
    expenses: &[Expense],
    month: &str,
    monthly_income: f64,
    tz: Tz,
) -> MonthlySummary {
    let items: Vec<&Expense> = expenses
        .iter()
        .filter(|e| expense_month(e, tz).as_deref() == Some(month))
        .collect();
    summarize(month, &items, monthly_income)
}

/// One summary per month that has expenses, newest month first. The current
/// income is used for every month.
pub fn monthly_history(expenses: &[Expense], monthly_income: f64, tz: Tz) -> Vec<MonthlySummary> {
    let mut by_month: BTreeMap<String, Vec<&Expense>> = BTreeMap::new();
    for expense in expenses {
        if let Some(month) = expense_month(expense, tz) {
            by_month.entry(month).or_default().push(expense);
        }
    }
    by_month
        .iter()
        .rev()
        .map(|(month, items)| summarize(month, items, monthly_income))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryTotals {
    pub months: usize,
    pub average_spent: f64,
    pub lifetime_spent: f64,
    /// Month with the most budget left over
    pub best_cushion: Option<String>,
}

pub fn history_totals(history: &[MonthlySummary]) -> HistoryTotals {
    let lifetime_spent = round_cents(history.iter().map(|m| m.total_spent).sum());
    let average_spent = if history.is_empty() {
        0.0
    } else {
        round_cents(lifetime_spent / history.len() as f64)
    };
    let best_cushion = history
        .iter()
        .reduce(|best, m| if m.remaining_budget > best.remaining_budget { m } else { best })
        .map(|m| m.month.clone());
    HistoryTotals {
        months: history.len(),
        average_spent,
        lifetime_spent,
        best_cushion,
    }
}

/// The category a goal tracks: its category, else its title.
pub fn goal_category_label(goal: &Goal) -> String {
    [goal.category.as_deref(), Some(goal.title.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(UNCATEGORIZED)
        .to_string()
}

/// Spend counted against `goal` this month.
///
/// A goal with an explicit category only counts that category. A goal named
/// only by its title counts the matching category when there is one, and the
/// whole month otherwise.
pub fn goal_spent(goal: &Goal, summary: &MonthlySummary) -> f64 {
    let has_category = goal.category.as_deref().is_some_and(|c| !c.trim().is_empty());
    let has_title = !goal.title.trim().is_empty();
    if !has_category && !has_title {
        return summary.total_spent;
    }

    let label = goal_category_label(goal);
    let found = if label.eq_ignore_ascii_case(UNCATEGORIZED) {
        summary.by_category.iter().find(|c| c.category.is_none())
    } else {
        summary
            .by_category
            .iter()
            .find(|c| c.category.as_deref().is_some_and(|have| have.eq_ignore_ascii_case(&label)))
    };

    match found {
        Some(entry) => entry.total,
        None if has_category => 0.0,
        None => summary.total_spent,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    pub goal: Goal,
    pub spent: f64,
    /// Never negative
    pub remaining: f64,
    pub completed: bool,
}

impl GoalProgress {
    pub fn fraction(&self) -> f64 {
        if self.goal.target_amount > 0.0 {
            (self.spent / self.goal.target_amount).min(1.0)
        } else {
            1.0
        }
    }
}

/// Active goals first, then completed ones; each group keeps its input order.
pub fn goal_progress(goals: Vec<Goal>, summary: &MonthlySummary) -> Vec<GoalProgress> {
    let (completed, active): (Vec<GoalProgress>, Vec<GoalProgress>) = goals
        .into_iter()
        .map(|goal| {
            let spent = goal_spent(&goal, summary);
            GoalProgress {
                remaining: round_cents((goal.target_amount - spent).max(0.0)),
                completed: spent >= goal.target_amount,
                spent,
                goal,
            }
        })
        .partition(|p| p.completed);
    active.into_iter().chain(completed).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::UserId;
    use chrono::{TimeZone, Utc};

    fn spend(amount: f64, category: Option<&str>, (m, d, h): (u32, u32, u32)) -> Expense {
        Expense {
            id: format!("e-{m}-{d}-{h}-{amount}"),
            user_id: UserId::from("u1"),
            amount,
            total_amount: None,
            category: category.map(str::to_string),
            note: None,
            splits: None,
            created_at: Some(Utc.with_ymd_and_hms(2024, m, d, h, 0, 0).unwrap()),
        }
    }

    fn goal(title: &str, category: Option<&str>, target: f64) -> Goal {
        Goal {
            id: title.to_lowercase(),
            user_id: UserId::from("u1"),
            title: title.to_string(),
            target_amount: target,
            deadline: None,
            category: category.map(str::to_string),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn june() -> Vec<Expense> {
        vec![
            spend(45.0, Some("Groceries"), (6, 12, 18)),
            spend(20.5, Some("groceries "), (6, 14, 12)),
            spend(30.0, Some("Dining Out"), (6, 15, 20)),
            spend(12.0, None, (6, 20, 9)),
            spend(99.0, Some("Rent"), (5, 31, 12)),
        ]
    }

    #[test]
    fn test_month_keys() {
        assert_eq!(parse_month_key("2024-6"), Some("2024-06".to_string()));
        assert_eq!(parse_month_key("2024-13"), None);
        assert_eq!(parse_month_key("June"), None);
        assert_eq!(month_label("2024-06"), "June 2024");
    }

    #[test]
    fn test_month_summary_groups_categories() {
        let summary = summarize_month(&june(), "2024-06", 1000.0, chrono_tz::UTC);
        assert_eq!(summary.transactions, 4);
        assert_eq!(summary.total_spent, 107.5);
        assert_eq!(summary.remaining_budget, 892.5);

        let labels: Vec<(&str, f64)> =
            summary.by_category.iter().map(|c| (c.label(), c.total)).collect();
        assert_eq!(
            labels,
            vec![("Groceries", 65.5), ("Dining Out", 30.0), ("Uncategorized", 12.0)]
        );
    }

    #[test]
    fn test_month_follows_timezone() {
        // 2024-06-01 03:00 UTC is still May 31 in Chicago.
        let expenses = vec![spend(10.0, None, (6, 1, 3))];
        let chicago: Tz = "America/Chicago".parse().unwrap();
        assert_eq!(summarize_month(&expenses, "2024-06", 0.0, chrono_tz::UTC).transactions, 1);
        assert_eq!(summarize_month(&expenses, "2024-05", 0.0, chicago).transactions, 1);
    }

    #[test]
    fn test_history_newest_first_with_totals() {
        let history = monthly_history(&june(), 500.0, chrono_tz::UTC);
        let months: Vec<&str> = history.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2024-06", "2024-05"]);

        let totals = history_totals(&history);
        assert_eq!(totals.months, 2);
        assert_eq!(totals.lifetime_spent, 206.5);
        assert_eq!(totals.average_spent, 103.25);
        assert_eq!(totals.best_cushion.as_deref(), Some("2024-05"));

        assert_eq!(history_totals(&[]).best_cushion, None);
    }

    #[test]
    fn test_goal_spent_matching() {
        let summary = summarize_month(&june(), "2024-06", 1000.0, chrono_tz::UTC);

        assert_eq!(goal_spent(&goal("Food", Some("groceries"), 100.0), &summary), 65.5);
        assert_eq!(goal_spent(&goal("Travel", Some("Travel"), 100.0), &summary), 0.0);
        assert_eq!(goal_spent(&goal("Dining out", None, 100.0), &summary), 30.0);
        // Title-only goal without a matching category tracks the whole month.
        assert_eq!(goal_spent(&goal("Vacation", None, 100.0), &summary), 107.5);
        assert_eq!(goal_spent(&goal("Misc", Some("Uncategorized"), 100.0), &summary), 12.0);
    }

    #[test]
    fn test_goal_progress_orders_active_first() {
        let summary = summarize_month(&june(), "2024-06", 1000.0, chrono_tz::UTC);
        let progress = goal_progress(
            vec![
                goal("Food", Some("Groceries"), 50.0),
                goal("Going out", Some("Dining Out"), 120.0),
            ],
            &summary,
        );
        assert_eq!(progress[0].goal.title, "Going out");
        assert_eq!(progress[0].remaining, 90.0);
        assert!(!progress[0].completed);
        assert_eq!(progress[0].fraction(), 0.25);

        assert_eq!(progress[1].goal.title, "Food");
        assert!(progress[1].completed);
        assert_eq!(progress[1].remaining, 0.0);
        assert_eq!(progress[1].fraction(), 1.0);
    }
}
