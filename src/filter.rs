//! Content filter for post bodies
//!
//! Rejects bodies that are plainly disrespectful or that aim a put-down at
//! a role. Matching is whole-word and case-insensitive, so "doghouse" or
//! "hateful" pass while "dog" and "hate" do not. The role rule only fires
//! when the role and the put-down share a line.

use regex::Regex;
use std::sync::LazyLock;

const DISRESPECT_TOKENS: [&str; 7] =
    ["sucks", "hate", "stupid", "idiot", "trash", "useless", "dog"];
const ROLE_TOKENS: [&str; 5] = ["hr", "admin", "finance", "manager", "it"];
const ROLE_PUT_DOWNS: [&str; 4] = ["sucks", "lazy", "idiot", "trash"];

static DISRESPECT: LazyLock<Regex> = LazyLock::new(|| word_alternation(&DISRESPECT_TOKENS));

static ROLE_TARGETED: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"\b({})\b.*\b({})\b",
        ROLE_TOKENS.join("|"),
        ROLE_PUT_DOWNS.join("|")
    );
    Regex::new(&pattern).expect("role pattern is valid")
});

fn word_alternation(words: &[&str]) -> Regex {
    Regex::new(&format!(r"\b({})\b", words.join("|"))).expect("word pattern is valid")
}

/// Outcome of filtering one body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Disrespectful { token: String },
    TargetsRole { role: String, token: String },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

pub fn check(text: &str) -> Verdict {
    let lowered = text.to_lowercase();

    if let Some(m) = DISRESPECT.find(&lowered) {
        return Verdict::Disrespectful {
            token: m.as_str().to_string(),
        };
    }

    if let Some(caps) = ROLE_TARGETED.captures(&lowered) {
        return Verdict::TargetsRole {
            role: caps[1].to_string(),
            token: caps[2].to_string(),
        };
    }

    Verdict::Accepted
}

pub fn is_acceptable(text: &str) -> bool {
    check(text).is_accepted()
}
