//! Delete and update flows: find an expense by loose date/category text,
//! let the user pick one by number, then act on it.

use anyhow::Result;
use pocketpilot_core::{ExpensePatch, UserId, parse_positive_amount};
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

use super::{FlowAdvanceResult, FlowState};
use crate::assistant::Assistant;
use crate::lookup::{ExpenseLookupFilters, ExpenseWithMeta};

static SELECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?(\d+)\.?$").expect("valid selection regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStep {
    AwaitDate,
    AwaitSelection,
}

impl DeleteStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteStep::AwaitDate => "await_date",
            DeleteStep::AwaitSelection => "await_selection",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStep {
    AwaitDate,
    AwaitSelection,
    AwaitNewAmount,
}

impl UpdateStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateStep::AwaitDate => "await_date",
            UpdateStep::AwaitSelection => "await_selection",
            UpdateStep::AwaitNewAmount => "await_new_amount",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteExpenseFlow {
    pub step: DeleteStep,
    pub filters: ExpenseLookupFilters,
    /// The list shown to the user; selection indexes into it
    pub candidates: Vec<ExpenseWithMeta>,
}

impl Default for DeleteExpenseFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl DeleteExpenseFlow {
    pub fn new() -> Self {
        Self {
            step: DeleteStep::AwaitDate,
            filters: ExpenseLookupFilters::default(),
            candidates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpenseFlow {
    pub step: UpdateStep,
    pub filters: ExpenseLookupFilters,
    pub candidates: Vec<ExpenseWithMeta>,
    pub selected: Option<ExpenseWithMeta>,
}

impl Default for UpdateExpenseFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateExpenseFlow {
    pub fn new() -> Self {
        Self {
            step: UpdateStep::AwaitDate,
            filters: ExpenseLookupFilters::default(),
            candidates: Vec::new(),
            selected: None,
        }
    }
}

/// 1-based pick into `count` listed items: "2", "#2", "2.".
pub fn parse_selection(input: &str, count: usize) -> Option<usize> {
    let caps = SELECTION.captures(input.trim())?;
    let n: usize = caps[1].parse().ok()?;
    (1..=count).contains(&n).then(|| n - 1)
}

/// What a lookup turned up for the date step.
enum Candidates {
    /// Nothing in the recent window at all
    None,
    Found {
        filters: ExpenseLookupFilters,
        candidates: Vec<ExpenseWithMeta>,
        messages: Vec<String>,
    },
}

fn selection_prompt(count: usize) -> String {
    if count == 1 {
        "Reply with 1 to pick it.".to_string()
    } else {
        format!("Pick a number between 1 and {count}.")
    }
}

impl Assistant {
    async fn find_candidates(&self, user: &UserId, input: &str, verb: &str) -> Result<Candidates> {
        let filters = self.resolve_filters(input);
        let result = self.lookup(user, &filters).await?;
        if result.is_empty() {
            return Ok(Candidates::None);
        }

        let (header, candidates) = if filters.is_empty() {
            ("Here are your most recent expenses:".to_string(), result.recent_fallback)
        } else if result.matches.is_empty() {
            (
                format!(
                    "I couldn't find any expenses{}, so here are your most recent ones:",
                    filters.describe()
                ),
                result.recent_fallback,
            )
        } else {
            (format!("Here's what I found{}:", filters.describe()), result.matches)
        };

        let listing = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {} ({})", i + 1, c.summary, c.display_date))
            .collect::<Vec<_>>()
            .join("\n");

        let messages = vec![
            header,
            listing,
            format!("Which one should I {verb}? {}", selection_prompt(candidates.len())),
        ];
        Ok(Candidates::Found {
            filters,
            candidates,
            messages,
        })
    }

    pub(crate) async fn advance_delete(
        &self,
        user: &UserId,
        flow: DeleteExpenseFlow,
        input: &str,
    ) -> Result<FlowAdvanceResult> {
        match flow.step {
            DeleteStep::AwaitDate => match self.find_candidates(user, input, "delete").await? {
                Candidates::None => Ok(FlowAdvanceResult::finish(vec![
                    "I couldn't find any recent expenses to delete.".to_string(),
                ])),
                Candidates::Found {
                    filters,
                    candidates,
                    messages,
                } => Ok(FlowAdvanceResult::next(
                    FlowState::DeleteExpense(DeleteExpenseFlow {
                        step: DeleteStep::AwaitSelection,
                        filters,
                        candidates,
                    }),
                    messages,
                )),
            },
            DeleteStep::AwaitSelection => {
                let Some(index) = parse_selection(input, flow.candidates.len()) else {
                    let prompt = selection_prompt(flow.candidates.len());
                    return Ok(FlowAdvanceResult::stay(FlowState::DeleteExpense(flow), prompt));
                };
                let chosen = &flow.candidates[index];
                self.collaborators.expenses.delete_expense(user, chosen.id()).await?;
                info!(user = %user, expense_id = %chosen.id(), "expense deleted via flow");

                Ok(FlowAdvanceResult::finish(vec![
                    format!(
                        "Deleted {} from {} ({}).",
                        chosen.display_amount,
                        chosen.category_label(),
                        chosen.display_date
                    ),
                    "Anything else?".to_string(),
                ]))
            }
        }
    }

    pub(crate) async fn advance_update(
        &self,
        user: &UserId,
        flow: UpdateExpenseFlow,
        input: &str,
    ) -> Result<FlowAdvanceResult> {
        match flow.step {
            UpdateStep::AwaitDate => match self.find_candidates(user, input, "update").await? {
                Candidates::None => Ok(FlowAdvanceResult::finish(vec![
                    "I couldn't find any recent expenses to update.".to_string(),
                ])),
                Candidates::Found {
                    filters,
                    candidates,
                    messages,
                } => Ok(FlowAdvanceResult::next(
                    FlowState::UpdateExpense(UpdateExpenseFlow {
                        step: UpdateStep::AwaitSelection,
                        filters,
                        candidates,
                        selected: None,
                    }),
                    messages,
                )),
            },
            UpdateStep::AwaitSelection => {
                let Some(index) = parse_selection(input, flow.candidates.len()) else {
                    let prompt = selection_prompt(flow.candidates.len());
                    return Ok(FlowAdvanceResult::stay(FlowState::UpdateExpense(flow), prompt));
                };
                let chosen = flow.candidates[index].clone();
                let message = format!(
                    "That one is {} right now. What should the new amount be?",
                    chosen.display_amount
                );
                Ok(FlowAdvanceResult::next(
                    FlowState::UpdateExpense(UpdateExpenseFlow {
                        step: UpdateStep::AwaitNewAmount,
                        selected: Some(chosen),
                        ..flow
                    }),
                    vec![message],
                ))
            }
            UpdateStep::AwaitNewAmount => {
                let Some(amount) = parse_positive_amount(input) else {
                    return Ok(FlowAdvanceResult::stay(
                        FlowState::UpdateExpense(flow),
                        "Enter the new amount as a positive number.",
                    ));
                };
                let Some(selected) = flow.selected else {
                    return Ok(FlowAdvanceResult::finish(vec![
                        "Let’s start over.".to_string(),
                    ]));
                };

                let patch = ExpensePatch {
                    amount: Some(amount),
                    total_amount: Some(amount),
                    ..ExpensePatch::default()
                };
                self.collaborators
                    .expenses
                    .update_expense(user, selected.id(), patch)
                    .await?;
                info!(user = %user, expense_id = %selected.id(), "expense updated via flow");

                Ok(FlowAdvanceResult::finish(vec![
                    format!(
                        "Updated! That {} expense is now {}.",
                        selected.category_label(),
                        self.money(amount)
                    ),
                    "Anything else?".to_string(),
                ]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1", 3), Some(0));
        assert_eq!(parse_selection(" #3 ", 3), Some(2));
        assert_eq!(parse_selection("2.", 3), Some(1));
        assert_eq!(parse_selection("0", 3), None);
        assert_eq!(parse_selection("4", 3), None);
        assert_eq!(parse_selection("two", 3), None);
        assert_eq!(parse_selection("1", 0), None);
    }

    #[test]
    fn test_selection_prompt() {
        assert_eq!(selection_prompt(1), "Reply with 1 to pick it.");
        assert_eq!(selection_prompt(4), "Pick a number between 1 and 4.");
    }
}
