//! Income flow: a single amount step.

use anyhow::Result;
use pocketpilot_core::{ProfilePatch, UserId, parse_positive_amount};
use tracing::info;

use super::{FlowAdvanceResult, FlowState};
use crate::assistant::Assistant;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomeFlow;

impl IncomeFlow {
    pub fn new() -> Self {
        Self
    }
}

impl Assistant {
    pub(crate) async fn advance_income(
        &self,
        user: &UserId,
        flow: IncomeFlow,
        input: &str,
    ) -> Result<FlowAdvanceResult> {
        let Some(amount) = parse_positive_amount(input) else {
            return Ok(FlowAdvanceResult::stay(
                FlowState::Income(flow),
                "Enter a positive amount, e.g. “5400”.",
            ));
        };

        let patch = ProfilePatch {
            monthly_income: Some(amount),
            currency: Some(self.settings.currency),
        };
        self.collaborators.profiles.upsert_user_profile(user, patch).await?;
        info!(user = %user, "monthly income updated");

        Ok(FlowAdvanceResult::finish(vec![
            format!("Done! Monthly income updated to {}.", self.money(amount)),
            "Anything else I can do?".to_string(),
        ]))
    }
}
