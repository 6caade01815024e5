//! Expense lookup: resolve loose filter text to a day and/or category, then
//! narrow a bounded window of recent expenses to the matches.

use anyhow::Result;
use chrono::NaiveDate;
use pocketpilot_core::{
    Expense, UserId, calendar_day_in, format_display_date, is_skip, normalize_category_label,
    parse_calendar_day_at, parse_naive_day, to_iso_day,
};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::assistant::Assistant;

static ISO_IN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("valid ISO day regex"));

/// "June 12, 2024", "Jun. 12th 2024" or "12 June 2024" inside longer text.
static MONTH_DATE_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:[a-z]{3,9}\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}|\d{1,2}(?:st|nd|rd|th)?\s+[a-z]{3,9}\.?,?\s+\d{4})\b",
    )
    .expect("valid month date regex")
});

static SEGMENT_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[,;]|\s+and\s+").expect("valid segment regex"));

/// Words that mean "no filter, just show me recent ones".
const UNFILTERED_WORDS: &[&str] = &["recent", "any", "all", "latest", "show all", "most recent"];

/// Connectives dropped before treating leftover text as a category.
const FILLER_WORDS: &[&str] = &["on", "from", "at", "for", "in", "dated", "the", "of", "my"];

/// Longest run of words tried as a date ("Tuesday June 12 2024").
const MAX_DATE_WORDS: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseLookupFilters {
    pub date_iso: Option<String>,
    pub category: Option<String>,
}

impl ExpenseLookupFilters {
    pub fn is_empty(&self) -> bool {
        self.date_iso.is_none() && self.category.is_none()
    }

    /// " in Groceries on Jun 12, 2024", or "" when unfiltered.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        if let Some(category) = &self.category {
            out.push_str(&format!(" in {category}"));
        }
        if let Some(iso) = &self.date_iso {
            let shown = NaiveDate::parse_from_str(iso, "%Y-%m-%d")
                .map(format_display_date)
                .unwrap_or_else(|_| iso.clone());
            out.push_str(&format!(" on {shown}"));
        }
        out
    }
}

/// An expense decorated for listing and numeric selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseWithMeta {
    pub expense: Expense,
    pub display_date: String,
    pub display_amount: String,
    pub date_iso: String,
    /// "amount | category | note"
    pub summary: String,
}

impl ExpenseWithMeta {
    pub fn id(&self) -> &str {
        &self.expense.id
    }

    pub fn category_label(&self) -> &str {
        self.expense.category.as_deref().unwrap_or("Uncategorized")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupResult {
    /// Window entries satisfying every filter, newest first
    pub matches: Vec<ExpenseWithMeta>,
    /// Unfiltered head of the window
    pub recent_fallback: Vec<ExpenseWithMeta>,
}

impl LookupResult {
    /// Nothing in the window at all.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.recent_fallback.is_empty()
    }
}

/// Resolve free text such as "groceries on 2024-06-12", "June 12" or
/// "Dining Out" into lookup filters.
pub fn resolve_filters_at(raw: &str, today: NaiveDate) -> ExpenseLookupFilters {
    let text = raw.trim();
    let lower = text.to_lowercase();
    if text.is_empty() || is_skip(text) || UNFILTERED_WORDS.contains(&lower.as_str()) {
        return ExpenseLookupFilters::default();
    }

    let mut date_iso = None;
    let mut date_token: Option<String> = None;

    if let Some(m) = ISO_IN_TEXT.find(text) {
        if let Some(iso) = parse_calendar_day_at(m.as_str(), today) {
            date_iso = Some(iso);
            date_token = Some(m.as_str().to_string());
        }
    }

    // A dated month-name form must be read before segments split it on its comma.
    if date_iso.is_none() {
        if let Some((iso, span)) = MONTH_DATE_IN_TEXT.find_iter(text).find_map(|m| {
            parse_calendar_day_at(&m.as_str().replace('.', ""), today)
                .map(|iso| (iso, m.as_str().to_string()))
        }) {
            date_iso = Some(iso);
            date_token = Some(span);
        }
    }

    // The whole utterance may be one date that contains a comma.
    if date_iso.is_none() {
        if let Some(iso) = parse_calendar_day_at(text, today) {
            return ExpenseLookupFilters {
                date_iso: Some(iso),
                category: None,
            };
        }
    }

    let mut category = None;
    for segment in SEGMENT_SPLIT.split(text).map(str::trim).filter(|s| !s.is_empty()) {
        if date_iso.is_none() {
            if let Some((iso, span)) = find_date_span(segment, today) {
                date_iso = Some(iso);
                date_token = Some(span);
            }
        }
        if category.is_none() {
            category = category_from(segment, date_token.as_deref());
        }
    }

    if category.is_none() {
        category = category_from(text, date_token.as_deref());
    }

    ExpenseLookupFilters { date_iso, category }
}

/// First contiguous run of words that parses as a day, longest runs first.
fn find_date_span(segment: &str, today: NaiveDate) -> Option<(String, String)> {
    let words: Vec<&str> = segment.split_whitespace().collect();
    for len in (1..=words.len().min(MAX_DATE_WORDS)).rev() {
        for window in words.windows(len) {
            let span = window.join(" ");
            if let Some(day) = parse_naive_day(&span, today) {
                return Some((to_iso_day(day), span));
            }
        }
    }
    None
}

/// Leftover text after dropping the date token and filler words, if it reads
/// like a category (non-empty, no digits).
fn category_from(segment: &str, date_token: Option<&str>) -> Option<String> {
    let without_date = match date_token {
        Some(token) => segment.replacen(token, " ", 1),
        None => segment.to_string(),
    };
    let words: Vec<&str> = without_date
        .split_whitespace()
        .filter(|w| !FILLER_WORDS.contains(&w.to_lowercase().as_str()))
        .collect();
    let candidate = words.join(" ");
    if candidate.is_empty() || candidate.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    normalize_category_label(&candidate)
}

impl Assistant {
    /// [`resolve_filters_at`] against today in the configured timezone.
    pub fn resolve_filters(&self, raw: &str) -> ExpenseLookupFilters {
        resolve_filters_at(raw, self.today())
    }

    /// Decorate a stored expense; records without a timestamp are skipped.
    pub fn describe_expense(&self, expense: Expense) -> Option<ExpenseWithMeta> {
        let created = expense.created_at?;
        let day = calendar_day_in(created, self.settings.timezone);
        let display_amount = self.money(expense.amount);

        let mut parts = vec![
            display_amount.clone(),
            expense
                .category
                .clone()
                .unwrap_or_else(|| "Uncategorized".to_string()),
        ];
        if let Some(note) = expense.note.as_deref().filter(|n| !n.trim().is_empty()) {
            parts.push(note.trim().to_string());
        }

        Some(ExpenseWithMeta {
            summary: parts.join(" | "),
            display_date: format_display_date(day),
            date_iso: to_iso_day(day),
            display_amount,
            expense,
        })
    }

    /// Fetch the recent window and narrow it to `filters`.
    pub async fn lookup(&self, user: &UserId, filters: &ExpenseLookupFilters) -> Result<LookupResult> {
        let limits = self.settings.lookup;
        let recent = self
            .collaborators
            .expenses
            .fetch_recent_expenses(user, limits.window)
            .await?;

        let window: Vec<ExpenseWithMeta> = recent
            .into_iter()
            .filter_map(|e| self.describe_expense(e))
            .collect();

        let matches: Vec<ExpenseWithMeta> = window
            .iter()
            .filter(|m| filters.date_iso.as_ref().is_none_or(|d| &m.date_iso == d))
            .filter(|m| {
                filters.category.as_ref().is_none_or(|c| {
                    m.expense
                        .category
                        .as_ref()
                        .is_some_and(|have| have.eq_ignore_ascii_case(c))
                })
            })
            .cloned()
            .collect();

        let recent_fallback: Vec<ExpenseWithMeta> =
            window.into_iter().take(limits.fallback).collect();

        debug!(
            user = %user,
            date = ?filters.date_iso,
            category = ?filters.category,
            matches = matches.len(),
            fallback = recent_fallback.len(),
            "expense lookup"
        );

        Ok(LookupResult {
            matches,
            recent_fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
    }

    fn filters(date: Option<&str>, category: Option<&str>) -> ExpenseLookupFilters {
        ExpenseLookupFilters {
            date_iso: date.map(str::to_string),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn test_category_and_iso_day() {
        assert_eq!(
            resolve_filters_at("groceries on 2024-06-12", today()),
            filters(Some("2024-06-12"), Some("Groceries"))
        );
    }

    #[test]
    fn test_iso_day_only() {
        assert_eq!(
            resolve_filters_at("2024-06-12", today()),
            filters(Some("2024-06-12"), None)
        );
    }

    #[test]
    fn test_category_only() {
        assert_eq!(
            resolve_filters_at("Dining out", today()),
            filters(None, Some("Dining Out"))
        );
    }

    #[test]
    fn test_month_name_dates() {
        assert_eq!(
            resolve_filters_at("June 12", today()),
            filters(Some("2024-06-12"), None)
        );
        assert_eq!(
            resolve_filters_at("June 12, 2023", today()),
            filters(Some("2023-06-12"), None)
        );
        assert_eq!(
            resolve_filters_at("rent on June 1", today()),
            filters(Some("2024-06-01"), Some("Rent"))
        );
    }

    #[test]
    fn test_dated_month_name_keeps_its_year() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let expected = ExpenseLookupFilters {
            date_iso: Some("2024-06-12".to_string()),
            category: Some("Groceries".to_string()),
        };
        assert_eq!(resolve_filters_at("groceries on June 12, 2024", today), expected);
        assert_eq!(resolve_filters_at("June 12, 2024 groceries", today), expected);
        assert_eq!(resolve_filters_at("groceries 12 June 2024", today), expected);
        assert_eq!(resolve_filters_at("Jun. 12th, 2024, groceries", today), expected);
    }

    #[test]
    fn test_segments_split_on_and() {
        assert_eq!(
            resolve_filters_at("yesterday and dining out", today()),
            filters(Some("2024-06-19"), Some("Dining Out"))
        );
    }

    #[test]
    fn test_unfiltered_words() {
        assert!(resolve_filters_at("skip", today()).is_empty());
        assert!(resolve_filters_at("recent", today()).is_empty());
        assert!(resolve_filters_at("  ", today()).is_empty());
    }

    #[test]
    fn test_numbers_never_become_a_category() {
        assert!(resolve_filters_at("45", today()).is_empty());
    }

    #[test]
    fn test_describe() {
        assert_eq!(filters(None, None).describe(), "");
        assert_eq!(
            filters(Some("2024-06-12"), Some("Groceries")).describe(),
            " in Groceries on Jun 12, 2024"
        );
    }
}
