//! pocketpilot-assistant: command interpreter, flow engine, expense lookup,
//! quick-reply suggestions and spending reports for the PocketPilot chat assistant.

pub mod assistant;
pub mod flows;
pub mod interpreter;
pub mod lookup;
pub mod reports;
pub mod session;
pub mod suggestions;

pub use assistant::{Assistant, AssistantSettings, LookupLimits};
pub use flows::{FlowAdvanceResult, FlowInit, FlowKind, FlowState, start_flow};
pub use interpreter::{COMMAND_HELP, CommandResult, Intent, classify};
pub use lookup::{
    ExpenseLookupFilters, ExpenseWithMeta, LookupResult, resolve_filters_at,
};
pub use reports::History;
pub use session::{Session, Turn};
pub use suggestions::{DEFAULT_SUGGESTIONS, suggestions};

/// Opening line hosts show before the first turn.
pub const GREETING: &str =
    "Hi! I can log expenses, set your monthly income, or create savings goals. Tell me what you need.";
