use crate::errors::Result;
use regex::Regex;
use std::borrow::Cow;

/// A pure text-to-text function applied to entry names or file lines.
///
/// Implementations must not touch the filesystem. Returning `Cow::Borrowed`
/// (or any output equal to the input) tells the caller there is nothing to do.
pub trait Transform {
    /// Applies the transform to `input`.
    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

/// A single literal substitution: every occurrence of `old` becomes `new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub old: String,
    pub new: String,
}

impl Rule {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

/// An ordered list of literal substitutions.
///
/// Rules run in order and each one replaces globally before the next starts,
/// so a later rule can match text introduced by an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ruleset {
    rules: Vec<Rule>,
}

impl Ruleset {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Builds a ruleset from `(old, new)` pairs.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, S)>) -> Self {
        pairs.into_iter().collect()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule over `text`.
    ///
    /// Borrows the input untouched when no rule's `old` occurs. An empty `old`
    /// never matches.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(text);
        for rule in &self.rules {
            if rule.old.is_empty() || !current.contains(rule.old.as_str()) {
                continue;
            }
            current = Cow::Owned(current.replace(rule.old.as_str(), &rule.new));
        }
        current
    }
}

impl<S: Into<String>> FromIterator<(S, S)> for Ruleset {
    fn from_iter<I: IntoIterator<Item = (S, S)>>(iter: I) -> Self {
        Self {
            rules: iter
                .into_iter()
                .map(|(old, new)| Rule::new(old, new))
                .collect(),
        }
    }
}

impl Transform for Ruleset {
    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        Ruleset::apply(self, input)
    }
}

/// A regex substitution with `$1`-style capture expansion in the replacement.
#[derive(Debug, Clone)]
pub struct RegexRule {
    regex: Regex,
    replacement: String,
}

impl RegexRule {
    /// Compiles `pattern`. Fails before any file is touched if it is invalid.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }
}

impl Transform for RegexRule {
    fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.regex.replace_all(input, self.replacement.as_str())
    }
}

/// Builds the transform for a single command-line `old`/`new` pair.
///
/// With `regex` set, `old` is a regular expression and `new` may refer to
/// its capture groups. Otherwise both are taken literally.
pub fn build_transform(old: &str, new: &str, regex: bool) -> Result<Box<dyn Transform>> {
    if regex {
        Ok(Box::new(RegexRule::new(old, new)?))
    } else {
        Ok(Box::new(Ruleset::from_pairs([(old, new)])))
    }
}
