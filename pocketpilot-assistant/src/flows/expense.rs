//! Expense flow with optional bill splitting.
//!
//! total -> own share -> split? -> participants* -> category -> note -> commit.
//! Once splitting finishes, own share plus every participant share equals the
//! total within one cent.

use anyhow::Result;
use pocketpilot_core::{
    AMOUNT_TOLERANCE, NewExpense, SplitShare, UserId, is_done, is_no, is_skip, is_yes,
    normalize_category_label, parse_amount, parse_positive_amount, round_cents,
};
use tracing::info;

use super::{FlowAdvanceResult, FlowState};
use crate::assistant::Assistant;

pub(crate) const CATEGORY_PROMPT: &str =
    "Which category should I file this under? Say “skip” to leave it uncategorized.";

const NOTE_PROMPT: &str = "Any note you’d like to add? You can also say “skip”.";

const PARTICIPANT_HINT: &str =
    "Tell me who and how much, like “Alex 20”. Say “done” when everyone is added.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseStep {
    AwaitAmount,
    AwaitSelfShare,
    AwaitSplitDecision,
    AwaitParticipant,
    AwaitCategory,
    AwaitNote,
}

impl ExpenseStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseStep::AwaitAmount => "await_amount",
            ExpenseStep::AwaitSelfShare => "await_self_share",
            ExpenseStep::AwaitSplitDecision => "await_split_decision",
            ExpenseStep::AwaitParticipant => "await_participant",
            ExpenseStep::AwaitCategory => "await_category",
            ExpenseStep::AwaitNote => "await_note",
        }
    }
}

/// Someone else's part of a split bill.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitParticipant {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseDraft {
    pub total_amount: Option<f64>,
    pub self_share: Option<f64>,
    /// Total minus own share, never negative
    pub remainder: f64,
    pub participants: Vec<SplitParticipant>,
    pub category: Option<String>,
}

impl ExpenseDraft {
    pub fn allocated(&self) -> f64 {
        self.participants.iter().map(|p| p.amount).sum()
    }

    /// Amount still waiting for a participant; negative when over-assigned.
    pub fn unassigned(&self) -> f64 {
        self.remainder - self.allocated()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFlow {
    pub step: ExpenseStep,
    pub draft: ExpenseDraft,
}

impl Default for ExpenseFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseFlow {
    pub fn new() -> Self {
        Self {
            step: ExpenseStep::AwaitAmount,
            draft: ExpenseDraft::default(),
        }
    }

    fn at(step: ExpenseStep, draft: ExpenseDraft) -> FlowState {
        FlowState::Expense(Self { step, draft })
    }
}

/// "Alex 40" -> ("Alex", 40). The amount is the last whitespace-delimited
/// token; a missing name becomes "Person N".
pub fn parse_participant(input: &str, position: usize) -> Option<SplitParticipant> {
    let trimmed = input.trim();
    let (name, token) = match trimmed.rsplit_once(char::is_whitespace) {
        Some((name, token)) => (name.trim().trim_end_matches(':').trim(), token),
        None => ("", trimmed),
    };
    if !token.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let amount = parse_amount(token)?;
    let name = if name.is_empty() {
        format!("Person {position}")
    } else {
        name.to_string()
    };
    Some(SplitParticipant { name, amount })
}

impl Assistant {
    pub(crate) async fn advance_expense(
        &self,
        user: &UserId,
        flow: ExpenseFlow,
        input: &str,
    ) -> Result<FlowAdvanceResult> {
        let trimmed = input.trim();
        let ExpenseFlow { step, draft } = flow;

        match step {
            ExpenseStep::AwaitAmount => {
                let Some(total) = parse_positive_amount(trimmed) else {
                    return Ok(FlowAdvanceResult::stay(
                        ExpenseFlow::at(step, draft),
                        "I need a positive amount. For example, “25.60”.",
                    ));
                };
                Ok(FlowAdvanceResult::next(
                    ExpenseFlow::at(
                        ExpenseStep::AwaitSelfShare,
                        ExpenseDraft {
                            total_amount: Some(total),
                            ..draft
                        },
                    ),
                    vec![
                        format!("Got it, {} in total.", self.money(total)),
                        "How much of that was your share? Say the full amount if it was all yours."
                            .to_string(),
                    ],
                ))
            }

            ExpenseStep::AwaitSelfShare => {
                let total = draft.total_amount.unwrap_or_default();
                let Some(share) = parse_positive_amount(trimmed) else {
                    return Ok(FlowAdvanceResult::stay(
                        ExpenseFlow::at(step, draft),
                        "Your share needs to be a positive amount, e.g. “20”.",
                    ));
                };
                if share - total > AMOUNT_TOLERANCE {
                    return Ok(FlowAdvanceResult::stay(
                        ExpenseFlow::at(step, draft),
                        format!("Your share can't be more than the total of {}.", self.money(total)),
                    ));
                }

                let remainder = round_cents((total - share).max(0.0));
                let mut messages = vec![format!("Your share is {}.", self.money(share))];
                if remainder > AMOUNT_TOLERANCE {
                    messages.push(format!("That leaves {} for others.", self.money(remainder)));
                }
                messages.push("Did you split this with anyone? (yes/no)".to_string());

                Ok(FlowAdvanceResult::next(
                    ExpenseFlow::at(
                        ExpenseStep::AwaitSplitDecision,
                        ExpenseDraft {
                            self_share: Some(share),
                            remainder,
                            ..draft
                        },
                    ),
                    messages,
                ))
            }

            ExpenseStep::AwaitSplitDecision => {
                if is_yes(trimmed) {
                    if draft.remainder <= AMOUNT_TOLERANCE {
                        return Ok(FlowAdvanceResult::next(
                            ExpenseFlow::at(ExpenseStep::AwaitCategory, draft),
                            vec![
                                "Nothing is left to split since your share covers the total."
                                    .to_string(),
                                CATEGORY_PROMPT.to_string(),
                            ],
                        ));
                    }
                    let remaining = self.money(draft.remainder);
                    return Ok(FlowAdvanceResult::next(
                        ExpenseFlow::at(ExpenseStep::AwaitParticipant, draft),
                        vec![
                            "Who did you split with? Add one person at a time, like “Alex 20”."
                                .to_string(),
                            format!("Say “done” once {remaining} is fully assigned."),
                        ],
                    ));
                }
                if is_no(trimmed) || is_skip(trimmed) {
                    return Ok(FlowAdvanceResult::next(
                        ExpenseFlow::at(
                            ExpenseStep::AwaitCategory,
                            ExpenseDraft {
                                participants: Vec::new(),
                                ..draft
                            },
                        ),
                        vec![CATEGORY_PROMPT.to_string()],
                    ));
                }
                Ok(FlowAdvanceResult::stay(
                    ExpenseFlow::at(step, draft),
                    "Please answer yes or no. Did you split this with anyone?",
                ))
            }

            ExpenseStep::AwaitParticipant => {
                if is_done(trimmed) {
                    let discrepancy = round_cents(draft.allocated() - draft.remainder);
                    if discrepancy.abs() > AMOUNT_TOLERANCE {
                        let message = if discrepancy < 0.0 {
                            format!(
                                "The split doesn't add up yet ({}). {} still needs to be assigned.",
                                self.signed_money(discrepancy),
                                self.money(-discrepancy)
                            )
                        } else {
                            format!(
                                "The split doesn't add up yet ({}). The shares exceed what's left to split.",
                                self.signed_money(discrepancy)
                            )
                        };
                        return Ok(FlowAdvanceResult::stay(ExpenseFlow::at(step, draft), message));
                    }
                    return Ok(FlowAdvanceResult::next(
                        ExpenseFlow::at(ExpenseStep::AwaitCategory, draft),
                        vec![
                            "Great, the split adds up.".to_string(),
                            CATEGORY_PROMPT.to_string(),
                        ],
                    ));
                }

                let position = draft.participants.len() + 1;
                let Some(participant) = parse_participant(trimmed, position) else {
                    return Ok(FlowAdvanceResult::stay(ExpenseFlow::at(step, draft), PARTICIPANT_HINT));
                };
                if participant.amount <= 0.0 {
                    return Ok(FlowAdvanceResult::stay(
                        ExpenseFlow::at(step, draft),
                        "Each share needs to be a positive amount.",
                    ));
                }

                let over = round_cents(draft.allocated() + participant.amount - draft.remainder);
                if over > AMOUNT_TOLERANCE {
                    let left = self.money(draft.unassigned().max(0.0));
                    return Ok(FlowAdvanceResult::stay(
                        ExpenseFlow::at(step, draft),
                        format!(
                            "That would put the split over by {} ({}). Only {left} is left to assign.",
                            self.money(over),
                            self.signed_money(over)
                        ),
                    ));
                }

                let added = format!("Added {} for {}.", participant.name, self.money(participant.amount));
                let mut next = draft;
                next.participants.push(participant);

                let left = round_cents(next.unassigned());
                let status = if left > AMOUNT_TOLERANCE {
                    format!("{} left to assign.", self.money(left))
                } else {
                    "Everything is assigned. Say “done” to continue.".to_string()
                };
                Ok(FlowAdvanceResult::next(
                    ExpenseFlow::at(step, next),
                    vec![format!("{added} {status}")],
                ))
            }

            ExpenseStep::AwaitCategory => {
                let category = if is_skip(trimmed) {
                    None
                } else {
                    normalize_category_label(trimmed)
                };
                Ok(FlowAdvanceResult::next(
                    ExpenseFlow::at(ExpenseStep::AwaitNote, ExpenseDraft { category, ..draft }),
                    vec![NOTE_PROMPT.to_string()],
                ))
            }

            ExpenseStep::AwaitNote => {
                let note = (!is_skip(trimmed) && !trimmed.is_empty()).then(|| trimmed.to_string());
                self.commit_expense(user, draft, note).await
            }
        }
    }

    async fn commit_expense(
        &self,
        user: &UserId,
        draft: ExpenseDraft,
        note: Option<String>,
    ) -> Result<FlowAdvanceResult> {
        let (Some(total), Some(share)) = (draft.total_amount, draft.self_share) else {
            return Ok(FlowAdvanceResult::finish(vec!["Let’s start over.".to_string()]));
        };

        let split = !draft.participants.is_empty();
        let splits = split.then(|| {
            std::iter::once(SplitShare::new("Me", share))
                .chain(
                    draft
                        .participants
                        .iter()
                        .map(|p| SplitShare::new(p.name.clone(), p.amount)),
                )
                .collect::<Vec<_>>()
        });

        let expense = NewExpense {
            amount: share,
            total_amount: Some(if split { total } else { share }),
            category: draft.category.clone(),
            note,
            splits,
        };
        let id = self.collaborators.expenses.add_expense(user, expense).await?;
        info!(user = %user, expense_id = %id, split, "expense flow committed");

        let mut messages = vec!["All set! I logged that expense for you.".to_string()];
        if split {
            let names: Vec<&str> = draft.participants.iter().map(|p| p.name.as_str()).collect();
            messages.push(format!(
                "Your share is {} of {}, split with {}.",
                self.money(share),
                self.money(total),
                names.join(", ")
            ));
        }
        messages.push("Need anything else?".to_string());
        Ok(FlowAdvanceResult::finish(messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_participant() {
        let p = parse_participant("Alex 40", 1).unwrap();
        assert_eq!(p.name, "Alex");
        assert_eq!(p.amount, 40.0);

        let p = parse_participant("Mary Jane: $12.50", 2).unwrap();
        assert_eq!(p.name, "Mary Jane");
        assert_eq!(p.amount, 12.5);

        let p = parse_participant("15", 3).unwrap();
        assert_eq!(p.name, "Person 3");

        assert_eq!(parse_participant("Alex", 1), None);
        assert_eq!(parse_participant("", 1), None);
    }

    #[test]
    fn test_draft_arithmetic() {
        let draft = ExpenseDraft {
            total_amount: Some(100.0),
            self_share: Some(60.0),
            remainder: 40.0,
            participants: vec![SplitParticipant {
                name: "Alex".to_string(),
                amount: 25.0,
            }],
            category: None,
        };
        assert_eq!(draft.allocated(), 25.0);
        assert_eq!(draft.unassigned(), 15.0);
    }
}
