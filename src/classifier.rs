//! Keyword classifier — maps inbound message text to a canned reply.
//!
//! Rules are evaluated in order and the first keyword contained in the
//! normalized text wins. Containment is plain substring search, so "dose"
//! also matches "dosage" and "overdose". When no rule matches, one of the
//! fallback prompts is picked at random.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

/// A single keyword rule.
#[derive(Debug, Clone)]
pub struct ReplyRule {
    /// Lowercase keyword, matched as a substring of the normalized text.
    pub keyword: &'static str,
    /// Canned reply returned when the keyword is present.
    pub reply: &'static str,
}

/// Generic prompts used when no keyword rule matches.
const FALLBACK_PROMPTS: &[&str] = &[
    "💡 You can ask me about side effects, dose, or storage.",
    "👩‍⚕️ For medical advice, please consult your healthcare provider.",
    "📞 In case of emergency, contact your doctor immediately.",
];

/// Keyword-to-reply decision function.
///
/// Pure and total: no state, no I/O, never panics on any input. The rule
/// path is deterministic; only the fallback consumes the RNG.
pub struct Classifier {
    rules: Vec<ReplyRule>,
    fallbacks: Vec<&'static str>,
}

impl Classifier {
    /// Create a classifier with the standard rule table.
    ///
    /// Order matters: "side effect" must be checked before "dose" so that a
    /// message mentioning both gets the side-effect warning.
    pub fn default_rules() -> Self {
        let rules = vec![
            ReplyRule {
                keyword: "side effect",
                reply: "🤒 Common side effects: nausea, vomiting, constipation. \
                        Try small meals + hydration.",
            },
            ReplyRule {
                keyword: "dose",
                reply: "💉 Wegovy is taken once weekly as prescribed. \
                        Don’t change dose without consulting your doctor.",
            },
            ReplyRule {
                keyword: "storage",
                reply: "🧊 Store in refrigerator (2–8°C). Keep away from light. \
                        Do not freeze.",
            },
            ReplyRule {
                keyword: "doctor",
                reply: "👩‍⚕️ I can’t give personal medical advice. \
                        Please reach out to your doctor or pharmacist directly.",
            },
        ];

        Self {
            rules,
            fallbacks: FALLBACK_PROMPTS.to_vec(),
        }
    }

    /// Create a classifier with a custom rule table (for testing).
    ///
    /// An empty `fallbacks` list is tolerated: the first standard prompt is
    /// used so `classify` stays total.
    pub fn new(rules: Vec<ReplyRule>, fallbacks: Vec<&'static str>) -> Self {
        Self { rules, fallbacks }
    }

    /// Classify a message using the thread-local RNG for the fallback pick.
    pub fn classify(&self, text: Option<&str>) -> &'static str {
        self.classify_with(text, &mut rand::thread_rng())
    }

    /// Classify a message with an injected RNG.
    ///
    /// A missing message is treated as empty text. The text is trimmed and
    /// lowercased before matching; rules are checked in order and the first
    /// match wins.
    pub fn classify_with<R: Rng + ?Sized>(&self, text: Option<&str>, rng: &mut R) -> &'static str {
        let normalized = text.unwrap_or("").trim().to_lowercase();

        for rule in &self.rules {
            if normalized.contains(rule.keyword) {
                debug!(keyword = rule.keyword, "Message matched reply rule");
                return rule.reply;
            }
        }

        self.fallbacks
            .choose(rng)
            .copied()
            .unwrap_or(FALLBACK_PROMPTS[0])
    }

    /// The fixed fallback prompt set.
    pub fn fallbacks(&self) -> &[&'static str] {
        &self.fallbacks
    }
}
