//! Single-shot command interpreter for idle turns.
//!
//! Classification is a prefix test on the lowercased input, first match wins.
//! When the utterance already carries every required field the command is
//! committed on the spot; otherwise the caller is asked to start a flow.

use anyhow::Result;
use pocketpilot_core::{
    NewExpense, NewGoal, ProfilePatch, UserId, normalize_category_label, parse_positive_amount,
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

use crate::assistant::Assistant;
use crate::flows::FlowKind;

pub const COMMAND_HELP: &str = r#"Try commands like "add expense 45 groceries", "delete expense groceries", "update expense June 12", or "set income 5000"."#;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-?\d+[\d.,]*)").expect("valid number regex"));

/// " note " between two words; a leading "note" stays part of the category.
static NOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\snote\s+").expect("valid note regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    AddExpense,
    SetIncome,
    AddGoal,
    DeleteExpense,
    UpdateExpense,
    Help,
    Unknown,
}

/// Classify a raw utterance. Empty input counts as a request for help.
pub fn classify(input: &str) -> Intent {
    let lower = input.trim().to_lowercase();
    let starts = |prefixes: &[&str]| prefixes.iter().any(|p| lower.starts_with(p));

    if lower.is_empty() {
        Intent::Help
    } else if starts(&["set income", "update income"]) {
        Intent::SetIncome
    } else if starts(&["add expense", "log expense"]) {
        Intent::AddExpense
    } else if starts(&["delete expense", "remove expense"]) {
        Intent::DeleteExpense
    } else if starts(&["update expense", "edit expense"]) {
        Intent::UpdateExpense
    } else if starts(&["add goal", "create goal"]) {
        Intent::AddGoal
    } else if lower == "help" || lower.contains("what can you do") {
        Intent::Help
    } else {
        Intent::Unknown
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub intent: Intent,
    pub message: String,
    pub start_flow: Option<FlowKind>,
    /// Text following the command keyword, handed to the new flow as its
    /// first reply ("delete expense groceries" -> "groceries").
    pub flow_input: Option<String>,
}

impl CommandResult {
    fn reply(intent: Intent, message: impl Into<String>) -> Self {
        Self {
            intent,
            message: message.into(),
            start_flow: None,
            flow_input: None,
        }
    }

    fn flow(intent: Intent, message: impl Into<String>, kind: FlowKind) -> Self {
        Self {
            start_flow: Some(kind),
            ..Self::reply(intent, message)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpense {
    pub amount: f64,
    pub category: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGoal {
    pub title: String,
    pub target: f64,
}

/// Tokens after the first one equal to `keyword`; every token when it is absent.
fn payload_after<'a>(input: &'a str, keyword: &str) -> Vec<&'a str> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let start = tokens
        .iter()
        .position(|t| t.eq_ignore_ascii_case(keyword))
        .map_or(0, |i| i + 1);
    tokens[start..].to_vec()
}

/// "set income 5000" -> 5000. `None` when no positive amount is present.
pub fn parse_income_command(input: &str) -> Option<f64> {
    FIRST_NUMBER
        .find(input)
        .and_then(|m| parse_positive_amount(m.as_str()))
}

/// "add expense 45 groceries note dinner with Sam".
///
/// The first token carrying a digit is the amount; the rest is the category,
/// optionally followed by `note <text>`.
pub fn parse_expense_command(input: &str) -> Option<ParsedExpense> {
    let payload = payload_after(input, "expense");
    let amount_index = payload.iter().position(|t| t.chars().any(|c| c.is_ascii_digit()))?;
    let amount = parse_positive_amount(payload[amount_index])?;

    let rest = payload
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != amount_index)
        .map(|(_, t)| *t)
        .collect::<Vec<_>>()
        .join(" ");

    let (category, note) = match NOTE_MARKER.find(&rest) {
        Some(m) => (&rest[..m.start()], Some(rest[m.end()..].trim())),
        None => (rest.as_str(), None),
    };

    Some(ParsedExpense {
        amount,
        category: normalize_category_label(category),
        note: note.filter(|n| !n.is_empty()).map(str::to_string),
    })
}

/// "add goal emergency fund 2000": the last token is the target, everything
/// before it the title. Titles may contain numbers of their own.
pub fn parse_goal_command(input: &str) -> Option<ParsedGoal> {
    let payload = payload_after(input, "goal");
    let (last, title) = payload.split_last()?;
    let target = parse_positive_amount(last)?;
    let title = title.join(" ");
    let title = if title.trim().is_empty() {
        "New goal".to_string()
    } else {
        title.trim().to_string()
    };
    Some(ParsedGoal { title, target })
}

impl Assistant {
    /// Interpret one idle-mode turn, committing immediately when possible.
    pub async fn interpret(&self, user: &UserId, input: &str) -> Result<CommandResult> {
        let normalized = input.trim();
        if normalized.is_empty() {
            return Ok(CommandResult::reply(
                Intent::Help,
                format!("I didn't catch that. {COMMAND_HELP}"),
            ));
        }

        let intent = classify(normalized);
        info!(user = %user, ?intent, "interpreting command");

        match intent {
            Intent::SetIncome => match parse_income_command(normalized) {
                Some(amount) => {
                    let patch = ProfilePatch {
                        monthly_income: Some(amount),
                        currency: Some(self.settings.currency),
                    };
                    self.collaborators.profiles.upsert_user_profile(user, patch).await?;
                    Ok(CommandResult::reply(
                        intent,
                        format!("Got it! I set your monthly income to {}.", self.money(amount)),
                    ))
                }
                None => Ok(CommandResult::flow(
                    intent,
                    "Let me walk you through updating income.",
                    FlowKind::Income,
                )),
            },
            Intent::AddExpense => match parse_expense_command(normalized) {
                Some(parsed) => {
                    let expense = NewExpense::new(parsed.amount)
                        .with_category(parsed.category.clone())
                        .with_note(parsed.note);
                    self.collaborators.expenses.add_expense(user, expense).await?;
                    let under = parsed
                        .category
                        .map(|c| format!(" under {c}"))
                        .unwrap_or_default();
                    Ok(CommandResult::reply(
                        intent,
                        format!("Logged {}{under}. Need anything else?", self.money(parsed.amount)),
                    ))
                }
                None => Ok(CommandResult::flow(
                    intent,
                    "Let's capture that expense step-by-step.",
                    FlowKind::Expense,
                )),
            },
            Intent::DeleteExpense => Ok(CommandResult {
                flow_input: filter_text(normalized),
                ..CommandResult::flow(intent, "Let me help delete that expense.", FlowKind::DeleteExpense)
            }),
            Intent::UpdateExpense => Ok(CommandResult {
                flow_input: filter_text(normalized),
                ..CommandResult::flow(intent, "Sure, let's update that expense.", FlowKind::UpdateExpense)
            }),
            Intent::AddGoal => match parse_goal_command(normalized) {
                Some(goal) => {
                    self.collaborators
                        .goals
                        .add_goal(user, NewGoal::new(goal.title.clone(), goal.target))
                        .await?;
                    Ok(CommandResult::reply(
                        intent,
                        format!(
                            "Created the goal \"{}\" with a target of {}.",
                            goal.title,
                            self.money(goal.target)
                        ),
                    ))
                }
                None if payload_after(normalized, "goal").is_empty() => Ok(CommandResult::flow(
                    intent,
                    "Let me help you set that goal.",
                    FlowKind::Goal,
                )),
                None => Ok(CommandResult::flow(
                    intent,
                    "I can guide you through creating that goal.",
                    FlowKind::Goal,
                )),
            },
            Intent::Help => Ok(CommandResult::reply(intent, COMMAND_HELP)),
            Intent::Unknown => Ok(CommandResult::reply(
                intent,
                format!("I'm not sure how to help with that yet. {COMMAND_HELP}"),
            )),
        }
    }
}

/// Whatever follows "expense" in a delete/update command, if anything.
fn filter_text(input: &str) -> Option<String> {
    let rest = payload_after(input, "expense").join(" ");
    let rest = rest.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}
