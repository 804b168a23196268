//! A small ordered rule engine for line classification.
//!
//! A [`RuleSet`] is a list of named predicates, each paired with a verdict.
//! The first predicate that matches decides the line; when none match, the
//! set's default verdict applies.

use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

/// A line prepared for rule evaluation
#[derive(Debug, Clone)]
pub struct Line<'a> {
    pub text: &'a str,
    pub lower: String,
}

impl<'a> Line<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lower: text.to_lowercase(),
        }
    }

    /// Number of characters, not bytes
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// First whitespace-separated word, lowercased, with trailing punctuation removed
    pub fn first_word(&self) -> &str {
        self.lower
            .split_whitespace()
            .next()
            .map(|word| word.trim_end_matches(|c: char| !c.is_alphanumeric()))
            .unwrap_or("")
    }
}

pub struct Rule {
    pub name: &'static str,
    pub verdict: Verdict,
    pub matches: fn(&Line) -> bool,
}

/// Result of running a line through a [`RuleSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    /// Name of the rule that fired, `None` when the default applied
    pub rule: Option<&'static str>,
}

impl Decision {
    pub fn accepted(&self) -> bool {
        self.verdict == Verdict::Accept
    }
}

pub struct RuleSet {
    name: &'static str,
    rules: Vec<Rule>,
    default: Verdict,
}

impl RuleSet {
    pub fn new(name: &'static str, default: Verdict) -> Self {
        Self {
            name,
            rules: Vec::new(),
            default,
        }
    }

    pub fn rule(mut self, name: &'static str, verdict: Verdict, matches: fn(&Line) -> bool) -> Self {
        self.rules.push(Rule {
            name,
            verdict,
            matches,
        });
        self
    }

    pub fn evaluate(&self, text: &str) -> Decision {
        let line = Line::new(text);
        let decision = self
            .rules
            .iter()
            .find(|rule| (rule.matches)(&line))
            .map(|rule| Decision {
                verdict: rule.verdict,
                rule: Some(rule.name),
            })
            .unwrap_or(Decision {
                verdict: self.default,
                rule: None,
            });

        trace!(
            "{}: {:?} by {} for '{}'",
            self.name,
            decision.verdict,
            decision.rule.unwrap_or("default"),
            text
        );
        decision
    }

    pub fn accepts(&self, text: &str) -> bool {
        self.evaluate(text).accepted()
    }

    /// Rule names in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name).collect()
    }
}
