//! pocketpilot-core: primitives, records and collaborator traits for the PocketPilot assistant

pub mod amount;
pub mod category;
pub mod currency;
pub mod finance;
pub mod intents;
pub mod store;
pub mod summary;
pub mod time;

pub use amount::{
    AMOUNT_TOLERANCE, format_plain_amount, parse_amount, parse_positive_amount, round_cents,
};
pub use category::{STANDARD_CATEGORIES, normalize_category_label};
pub use currency::{Currency, format_currency};
pub use finance::{
    Expense, ExpensePatch, Goal, NewExpense, NewGoal, ProfilePatch, SplitShare, UserId,
    UserProfile,
};
pub use intents::{is_done, is_exit, is_no, is_skip, is_yes};
pub use store::{
    Collaborators, ExpenseStore, GoalStore, ProfileStore, StoreError, StoreResult,
};
pub use summary::{
    CategoryTotal, GoalProgress, HistoryTotals, MonthlySummary, UNCATEGORIZED, goal_category_label,
    goal_progress, goal_spent, history_totals, month_key, month_label, monthly_history,
    parse_month_key, summarize_month,
};
pub use time::{
    calendar_day_in, format_display_date, parse_calendar_day, parse_calendar_day_at,
    parse_naive_day, parse_timezone, to_iso_day, today_in,
};
