//! Quick replies for the current turn.

use pocketpilot_core::{AMOUNT_TOLERANCE, STANDARD_CATEGORIES, format_plain_amount, round_cents};
use std::collections::HashSet;

use crate::flows::{DeleteStep, ExpenseStep, FlowState, GoalStep, UpdateStep};

/// Offered while no flow is active.
pub const DEFAULT_SUGGESTIONS: [&str; 5] = [
    "Add expense 25 groceries",
    "Set income 5000",
    "Add goal vacation 1200",
    "Update expense",
    "Delete expense",
];

const EXPENSE_AMOUNTS: [&str; 4] = ["10", "25", "50", "100"];
const INCOME_AMOUNTS: [&str; 4] = ["3000", "4000", "5000", "6000"];
const GOAL_TITLES: [&str; 3] = ["Emergency fund", "Vacation", "New laptop"];
const GOAL_AMOUNTS: [&str; 4] = ["500", "1000", "2500", "5000"];
const LOOKUP_HINTS: [&str; 5] = ["Recent", "Today", "Yesterday", "Groceries", "Dining Out"];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Step-specific quick replies, or the defaults when idle. Never repeats an entry.
pub fn suggestions(state: Option<&FlowState>) -> Vec<String> {
    let raw = match state {
        None => owned(&DEFAULT_SUGGESTIONS),
        Some(FlowState::Expense(flow)) => match flow.step {
            ExpenseStep::AwaitAmount => owned(&EXPENSE_AMOUNTS),
            ExpenseStep::AwaitSelfShare => match flow.draft.total_amount {
                Some(total) => vec![format_plain_amount(total), format_plain_amount(total / 2.0)],
                None => owned(&EXPENSE_AMOUNTS),
            },
            ExpenseStep::AwaitSplitDecision => owned(&["Yes", "No"]),
            ExpenseStep::AwaitParticipant => {
                let left = flow.draft.unassigned();
                if left > AMOUNT_TOLERANCE {
                    vec![format_plain_amount(left), "Done".to_string()]
                } else {
                    vec!["Done".to_string()]
                }
            }
            ExpenseStep::AwaitCategory => {
                let mut items = owned(&STANDARD_CATEGORIES);
                items.push("Skip".to_string());
                items
            }
            ExpenseStep::AwaitNote => owned(&["Skip"]),
        },
        Some(FlowState::Income(_)) => owned(&INCOME_AMOUNTS),
        Some(FlowState::Goal(flow)) => match flow.step {
            GoalStep::AwaitTitle => owned(&GOAL_TITLES),
            GoalStep::AwaitAmount => owned(&GOAL_AMOUNTS),
        },
        Some(FlowState::DeleteExpense(flow)) => match flow.step {
            DeleteStep::AwaitDate => owned(&LOOKUP_HINTS),
            DeleteStep::AwaitSelection => indices(flow.candidates.len()),
        },
        Some(FlowState::UpdateExpense(flow)) => match flow.step {
            UpdateStep::AwaitDate => owned(&LOOKUP_HINTS),
            UpdateStep::AwaitSelection => indices(flow.candidates.len()),
            UpdateStep::AwaitNewAmount => match &flow.selected {
                Some(selected) => {
                    let current = selected.expense.amount;
                    vec![
                        format_plain_amount(current),
                        format_plain_amount(round_cents(current * 1.1)),
                        format_plain_amount(round_cents(current * 0.9)),
                    ]
                }
                None => owned(&EXPENSE_AMOUNTS),
            },
        },
    };
    dedupe(raw)
}

fn indices(count: usize) -> Vec<String> {
    (1..=count).map(|i| i.to_string()).collect()
}

fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}
