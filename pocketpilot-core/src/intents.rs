//! Lexical intent checks for short replies.
//!
//! These are membership tests against fixed vocabularies, nothing more.
//! A word can belong to several sets ("no" is both skip and no); the caller's
//! current step decides what it means.

const SKIP_WORDS: &[&str] = &["skip", "no", "none", "nah", "n/a"];

const EXIT_WORDS: &[&str] = &["exit", "close", "cancel", "stop", "bye", "goodbye"];

const EXIT_PHRASES: &[&str] = &[
    "no thanks",
    "no thank you",
    "no help needed",
    "nothing else",
    "that is all",
    "that will be all",
    "all good",
    "im good",
    "i'm good",
    "all set",
];

const YES_WORDS: &[&str] = &["yes", "y", "sure", "yeah", "yep", "ok", "okay", "affirmative"];

const NO_WORDS: &[&str] = &["no", "n", "nope", "nah"];

const DONE_WORDS: &[&str] = &[
    "done",
    "finished",
    "all done",
    "no more",
    "complete",
    "none",
    "that is all",
    "that's all",
    "thats all",
];

fn normalized(input: &str) -> String {
    input.trim().to_lowercase()
}

fn is_one_of(input: &str, words: &[&str]) -> bool {
    let n = normalized(input);
    !n.is_empty() && words.contains(&n.as_str())
}

pub fn is_skip(input: &str) -> bool {
    is_one_of(input, SKIP_WORDS)
}

/// Single exit words, or any utterance containing a closing phrase.
pub fn is_exit(input: &str) -> bool {
    let n = normalized(input);
    if n.is_empty() {
        return false;
    }
    EXIT_WORDS.contains(&n.as_str()) || EXIT_PHRASES.iter().any(|p| n.contains(p))
}

pub fn is_yes(input: &str) -> bool {
    is_one_of(input, YES_WORDS)
}

pub fn is_no(input: &str) -> bool {
    is_one_of(input, NO_WORDS)
}

pub fn is_done(input: &str) -> bool {
    is_one_of(input, DONE_WORDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_vocabulary() {
        for w in ["skip", "No", " NONE ", "nah", "n/a"] {
            assert!(is_skip(w), "{w:?} should skip");
        }
        assert!(!is_skip("groceries"));
        assert!(!is_skip(""));
    }

    #[test]
    fn test_exit_words_and_phrases() {
        assert!(is_exit("Cancel"));
        assert!(is_exit("ok, no thanks!"));
        assert!(is_exit("I'm good for now"));
        assert!(!is_exit("no"));
        assert!(!is_exit("stop the rent expense"));
        assert!(!is_exit("   "));
    }

    #[test]
    fn test_yes_no() {
        assert!(is_yes("Yep"));
        assert!(is_yes("ok"));
        assert!(!is_yes("yes please"));
        assert!(is_no("nope"));
        assert!(is_no("N"));
        assert!(!is_no("skip"));
    }

    #[test]
    fn test_done_vocabulary() {
        assert!(is_done("done"));
        assert!(is_done("That's all"));
        assert!(is_done("no more"));
        assert!(!is_done("Alex 40"));
    }

    #[test]
    fn test_no_overlaps_skip_and_decline() {
        // "no" means skip in note/category steps and decline in yes/no steps.
        assert!(is_skip("no"));
        assert!(is_no("no"));
        assert!(!is_exit("no"));
    }
}
