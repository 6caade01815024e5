//! Goal flow: title, then target amount.

use anyhow::Result;
use pocketpilot_core::{NewGoal, UserId, parse_positive_amount};
use tracing::info;

use super::{FlowAdvanceResult, FlowState};
use crate::assistant::Assistant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStep {
    AwaitTitle,
    AwaitAmount,
}

impl GoalStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStep::AwaitTitle => "await_title",
            GoalStep::AwaitAmount => "await_amount",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalFlow {
    pub step: GoalStep,
    pub title: Option<String>,
}

impl Default for GoalFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl GoalFlow {
    pub fn new() -> Self {
        Self {
            step: GoalStep::AwaitTitle,
            title: None,
        }
    }
}

impl Assistant {
    pub(crate) async fn advance_goal(
        &self,
        user: &UserId,
        flow: GoalFlow,
        input: &str,
    ) -> Result<FlowAdvanceResult> {
        let trimmed = input.trim();

        match flow.step {
            GoalStep::AwaitTitle => {
                if trimmed.is_empty() {
                    return Ok(FlowAdvanceResult::stay(
                        FlowState::Goal(flow),
                        "Give the goal a name to help track it.",
                    ));
                }
                Ok(FlowAdvanceResult::next(
                    FlowState::Goal(GoalFlow {
                        step: GoalStep::AwaitAmount,
                        title: Some(trimmed.to_string()),
                    }),
                    vec!["Great! What amount are you aiming for?".to_string()],
                ))
            }
            GoalStep::AwaitAmount => {
                let Some(target) = parse_positive_amount(trimmed) else {
                    return Ok(FlowAdvanceResult::stay(
                        FlowState::Goal(flow),
                        "Enter the savings target as a positive number.",
                    ));
                };
                let title = flow.title.unwrap_or_else(|| "New goal".to_string());
                let id = self
                    .collaborators
                    .goals
                    .add_goal(user, NewGoal::new(title.clone(), target))
                    .await?;
                info!(user = %user, goal_id = %id, "goal flow committed");

                Ok(FlowAdvanceResult::finish(vec![
                    format!("Goal “{title}” set for {}.", self.money(target)),
                    "Happy to help with another goal or expense!".to_string(),
                ]))
            }
        }
    }
}
