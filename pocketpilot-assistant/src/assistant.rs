//! The assistant handle: collaborators plus the settings every turn needs.

use chrono::NaiveDate;
use chrono_tz::Tz;
use pocketpilot_core::{Collaborators, Currency, format_currency, today_in};

/// How much expense history the lookup flows may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupLimits {
    /// Most recent records fetched per lookup
    pub window: usize,
    /// Unfiltered entries offered when nothing matches
    pub fallback: usize,
}

impl Default for LookupLimits {
    fn default() -> Self {
        Self {
            window: 120,
            fallback: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssistantSettings {
    /// Currency used for formatting and for profile writes
    pub currency: Currency,
    /// Zone that decides which calendar day an expense falls on
    pub timezone: Tz,
    pub lookup: LookupLimits,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            currency: Currency::Usd,
            timezone: chrono_tz::UTC,
            lookup: LookupLimits::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Assistant {
    pub(crate) collaborators: Collaborators,
    pub(crate) settings: AssistantSettings,
}

impl Assistant {
    pub fn new(collaborators: Collaborators) -> Self {
        Self::with_settings(collaborators, AssistantSettings::default())
    }

    pub fn with_settings(collaborators: Collaborators, settings: AssistantSettings) -> Self {
        Self {
            collaborators,
            settings,
        }
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Format an amount in the configured currency.
    pub fn money(&self, amount: f64) -> String {
        format_currency(amount, self.settings.currency)
    }

    /// Money with an explicit sign: "+$10.00", "-$4.50".
    pub(crate) fn signed_money(&self, amount: f64) -> String {
        if amount >= 0.0 {
            format!("+{}", self.money(amount))
        } else {
            self.money(amount)
        }
    }

    pub(crate) fn today(&self) -> NaiveDate {
        today_in(self.settings.timezone)
    }
}
