//! Intent Classifier
//!
//! Maps free text to one of five fixed intents with an ordered list of
//! (intent, pattern) rules. The first rule whose pattern matches anywhere in
//! the lowercased text wins, so ties resolve purely by declaration order.

use crate::models::Intent;
use once_cell::sync::Lazy;
use regex::Regex;

/// Rule table in evaluation order
const INTENT_PATTERNS: &[(Intent, &[&str])] = &[
    (
        Intent::RevenueVsBudget,
        &[
            r"revenue.*vs.*budget",
            r"revenue.*budget",
            r"actual.*budget.*revenue",
            r"budget.*revenue",
        ],
    ),
    (
        Intent::GrossMarginTrend,
        &[
            r"gross\s+margin.*trend",
            r"margin.*trend",
            r"gross\s+margin.*last.*months?",
            r"margin.*last.*months?",
        ],
    ),
    (
        Intent::OpexBreakdown,
        &[
            r"opex.*breakdown",
            r"opex.*category",
            r"operating.*expense.*breakdown",
            r"break.*down.*opex",
        ],
    ),
    (
        Intent::Ebitda,
        &[r"ebitda", r"earnings.*before", r"operating.*profit"],
    ),
    (
        Intent::CashRunway,
        &[r"cash.*runway", r"runway", r"cash.*burn", r"how.*long.*cash"],
    ),
];

/// Intent used when no rule matches
pub const DEFAULT_INTENT: Intent = Intent::RevenueVsBudget;

struct IntentRule {
    intent: Intent,
    pattern: Regex,
}

static RULES: Lazy<Vec<IntentRule>> = Lazy::new(|| {
    INTENT_PATTERNS
        .iter()
        .flat_map(|(intent, patterns)| {
            patterns.iter().map(move |p| IntentRule {
                intent: *intent,
                pattern: Regex::new(p).expect("intent patterns are valid regexes"),
            })
        })
        .collect()
});

/// Intent classifier
pub struct IntentClassifier;

impl IntentClassifier {
    /// Classify a query; never fails, falls back to revenue vs budget
    pub fn classify(text: &str) -> Intent {
        let lowered = text.to_lowercase();

        RULES
            .iter()
            .find(|rule| rule.pattern.is_match(&lowered))
            .map(|rule| rule.intent)
            .unwrap_or(DEFAULT_INTENT)
    }
}
