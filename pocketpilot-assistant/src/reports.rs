//! Read-only overviews: this month's spend, month-by-month history and goal
//! progress, computed from the collaborators on demand.

use anyhow::{Result, bail};
use pocketpilot_core::{
    GoalProgress, HistoryTotals, MonthlySummary, UserId, goal_progress, history_totals,
    month_key, monthly_history, parse_month_key, summarize_month,
};
use tracing::{debug, info};

use crate::assistant::Assistant;

/// Expenses read per report.
const REPORT_WINDOW: usize = 5_000;

#[derive(Debug, Clone, PartialEq)]
pub struct History {
    /// Newest month first
    pub months: Vec<MonthlySummary>,
    pub totals: HistoryTotals,
}

impl Assistant {
    /// "YYYY-MM" of today in the configured timezone.
    pub fn current_month(&self) -> String {
        month_key(self.today())
    }

    fn month_or_current(&self, month: Option<&str>) -> Result<String> {
        match month {
            None => Ok(self.current_month()),
            Some(raw) => match parse_month_key(raw) {
                Some(key) => Ok(key),
                None => bail!("Month should look like 2024-06, got {raw:?}"),
            },
        }
    }

    async fn monthly_income(&self, user: &UserId) -> Result<f64> {
        let profile = self.collaborators.profiles.fetch_user_profile(user).await?;
        Ok(profile.and_then(|p| p.monthly_income).unwrap_or(0.0))
    }

    pub async fn monthly_summary(&self, user: &UserId, month: Option<&str>) -> Result<MonthlySummary> {
        let month = self.month_or_current(month)?;
        let income = self.monthly_income(user).await?;
        let expenses = self
            .collaborators
            .expenses
            .fetch_recent_expenses(user, REPORT_WINDOW)
            .await?;
        let summary = summarize_month(&expenses, &month, income, self.settings.timezone);
        debug!(user = %user, month = %month, transactions = summary.transactions, "monthly summary");
        Ok(summary)
    }

    pub async fn history(&self, user: &UserId) -> Result<History> {
        let income = self.monthly_income(user).await?;
        let expenses = self
            .collaborators
            .expenses
            .fetch_recent_expenses(user, REPORT_WINDOW)
            .await?;
        let months = monthly_history(&expenses, income, self.settings.timezone);
        let totals = history_totals(&months);
        Ok(History { months, totals })
    }

    /// Every goal with its progress against `month` (default: this month).
    pub async fn goal_overview(&self, user: &UserId, month: Option<&str>) -> Result<Vec<GoalProgress>> {
        let summary = self.monthly_summary(user, month).await?;
        let goals = self.collaborators.goals.fetch_goals(user).await?;
        Ok(goal_progress(goals, &summary))
    }

    pub async fn delete_goal(&self, user: &UserId, id: &str) -> Result<()> {
        self.collaborators.goals.delete_goal(user, id).await?;
        info!(user = %user, goal_id = %id, "goal removed");
        Ok(())
    }
}
