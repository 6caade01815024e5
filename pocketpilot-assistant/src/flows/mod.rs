//! Flow engine: one explicit state machine per flow kind.
//!
//! `advance_flow` consumes the current state and returns the next one (or
//! `None` once the flow is finished). Invalid input hands the state back
//! unchanged together with a corrective prompt; only terminal transitions
//! commit to a collaborator.

pub mod edit;
pub mod expense;
pub mod goal;
pub mod income;

use anyhow::Result;
use pocketpilot_core::UserId;
use std::fmt;
use tracing::{debug, info};

use crate::assistant::Assistant;

pub use edit::{DeleteExpenseFlow, DeleteStep, UpdateExpenseFlow, UpdateStep};
pub use expense::{ExpenseDraft, ExpenseFlow, ExpenseStep, SplitParticipant};
pub use goal::{GoalFlow, GoalStep};
pub use income::IncomeFlow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    Expense,
    Income,
    Goal,
    DeleteExpense,
    UpdateExpense,
}

impl FlowKind {
    pub const ALL: [FlowKind; 5] = [
        FlowKind::Expense,
        FlowKind::Income,
        FlowKind::Goal,
        FlowKind::DeleteExpense,
        FlowKind::UpdateExpense,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::Expense => "expense",
            FlowKind::Income => "income",
            FlowKind::Goal => "goal",
            FlowKind::DeleteExpense => "delete_expense",
            FlowKind::UpdateExpense => "update_expense",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    Expense(ExpenseFlow),
    Income(IncomeFlow),
    Goal(GoalFlow),
    DeleteExpense(DeleteExpenseFlow),
    UpdateExpense(UpdateExpenseFlow),
}

impl FlowState {
    pub fn kind(&self) -> FlowKind {
        match self {
            FlowState::Expense(_) => FlowKind::Expense,
            FlowState::Income(_) => FlowKind::Income,
            FlowState::Goal(_) => FlowKind::Goal,
            FlowState::DeleteExpense(_) => FlowKind::DeleteExpense,
            FlowState::UpdateExpense(_) => FlowKind::UpdateExpense,
        }
    }

    /// Current step, for logs.
    pub fn step_name(&self) -> &'static str {
        match self {
            FlowState::Expense(f) => f.step.as_str(),
            FlowState::Income(_) => "await_amount",
            FlowState::Goal(f) => f.step.as_str(),
            FlowState::DeleteExpense(f) => f.step.as_str(),
            FlowState::UpdateExpense(f) => f.step.as_str(),
        }
    }
}

/// Outcome of one flow step.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowAdvanceResult {
    pub messages: Vec<String>,
    pub next_state: Option<FlowState>,
}

impl FlowAdvanceResult {
    /// Re-prompt without advancing.
    pub(crate) fn stay(state: FlowState, message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
            next_state: Some(state),
        }
    }

    pub(crate) fn next(state: FlowState, messages: Vec<String>) -> Self {
        Self {
            messages,
            next_state: Some(state),
        }
    }

    pub(crate) fn finish(messages: Vec<String>) -> Self {
        Self {
            messages,
            next_state: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.next_state.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowInit {
    pub state: FlowState,
    pub intro: String,
}

/// Fresh state and opening prompt for `kind`.
pub fn start_flow(kind: FlowKind) -> FlowInit {
    let (state, intro) = match kind {
        FlowKind::Expense => (
            FlowState::Expense(ExpenseFlow::new()),
            "Let's log an expense. How much was the total?",
        ),
        FlowKind::Income => (
            FlowState::Income(IncomeFlow::new()),
            "Sure! What is your monthly income right now?",
        ),
        FlowKind::Goal => (
            FlowState::Goal(GoalFlow::new()),
            "Happy to help with a goal. What would you like to call this goal?",
        ),
        FlowKind::DeleteExpense => (
            FlowState::DeleteExpense(DeleteExpenseFlow::new()),
            "Which expense should I delete? Tell me the date (like 2024-06-12), the category, or say \"recent\".",
        ),
        FlowKind::UpdateExpense => (
            FlowState::UpdateExpense(UpdateExpenseFlow::new()),
            "Which expense should I update? Tell me the date (like 2024-06-12), the category, or say \"recent\".",
        ),
    };
    debug!(flow = %kind, "flow initialised");
    FlowInit {
        state,
        intro: intro.to_string(),
    }
}

impl Assistant {
    /// Feed one in-flow turn to the active state machine.
    pub async fn advance_flow(
        &self,
        user: &UserId,
        state: FlowState,
        input: &str,
    ) -> Result<FlowAdvanceResult> {
        let kind = state.kind();
        debug!(user = %user, flow = %kind, step = state.step_name(), "advancing flow");

        let result = match state {
            FlowState::Expense(flow) => self.advance_expense(user, flow, input).await?,
            FlowState::Income(flow) => self.advance_income(user, flow, input).await?,
            FlowState::Goal(flow) => self.advance_goal(user, flow, input).await?,
            FlowState::DeleteExpense(flow) => self.advance_delete(user, flow, input).await?,
            FlowState::UpdateExpense(flow) => self.advance_update(user, flow, input).await?,
        };

        if result.is_finished() {
            info!(user = %user, flow = %kind, "flow finished");
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_flow_matches_kind() {
        for kind in FlowKind::ALL {
            let init = start_flow(kind);
            assert_eq!(init.state.kind(), kind);
            assert!(!init.intro.is_empty());
        }
    }

    #[test]
    fn test_initial_steps() {
        assert_eq!(start_flow(FlowKind::Expense).state.step_name(), "await_amount");
        assert_eq!(start_flow(FlowKind::Goal).state.step_name(), "await_title");
        assert_eq!(start_flow(FlowKind::DeleteExpense).state.step_name(), "await_date");
        assert_eq!(start_flow(FlowKind::UpdateExpense).state.step_name(), "await_date");
    }
}
