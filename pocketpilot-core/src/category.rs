//! Expense category labels.

/// Canonical labels offered as quick replies and matched case-insensitively.
pub const STANDARD_CATEGORIES: [&str; 10] = [
    "Groceries",
    "Dining Out",
    "Rent",
    "Utilities",
    "Transportation",
    "Entertainment",
    "Shopping",
    "Health",
    "Travel",
    "Other",
];

/// Normalize a free-text category.
///
/// Known labels come back in their canonical casing; anything else is
/// title-cased word by word ("coffee shop" -> "Coffee Shop").
pub fn normalize_category_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lowered = trimmed.to_lowercase();
    if let Some(known) = STANDARD_CATEGORIES
        .iter()
        .find(|label| label.to_lowercase() == lowered)
    {
        return Some(known.to_string());
    }

    Some(title_case(&lowered))
}

/// Uppercase the first character of every word; a word starts after any
/// non-alphanumeric character.
fn title_case(lowered: &str) -> String {
    let mut out = String::with_capacity(lowered.len());
    let mut at_word_start = true;
    for ch in lowered.chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_label_gets_canonical_casing() {
        assert_eq!(normalize_category_label("groceries"), Some("Groceries".to_string()));
        assert_eq!(normalize_category_label("  DINING OUT "), Some("Dining Out".to_string()));
    }

    #[test]
    fn test_unknown_label_is_title_cased() {
        assert_eq!(normalize_category_label("coffee shop"), Some("Coffee Shop".to_string()));
        assert_eq!(normalize_category_label("pet-care"), Some("Pet-Care".to_string()));
        assert_eq!(normalize_category_label("2nd hand"), Some("2nd Hand".to_string()));
    }

    #[test]
    fn test_empty_label() {
        assert_eq!(normalize_category_label(""), None);
        assert_eq!(normalize_category_label("   "), None);
    }
}
