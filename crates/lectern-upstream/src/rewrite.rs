//! Brand rewriting of upstream payloads.
//!
//! Substitutions are applied to every string value in a record, at any
//! depth. Object keys, numbers and booleans are never touched.

use std::borrow::Cow;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::record::Record;

/// Default replacement brand.
pub const DEFAULT_BRAND: &str = "Smartrz";

/// Player prefix the upstream wraps around stream links.
const PLAYER_PREFIX: &str = "https://www.rolexcoderz.xyz/Player/?url=";

/// A case-insensitive literal substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Pattern, stored ASCII-lowercased.
    pattern: String,
    replacement: String,
}

impl Substitution {
    /// Creates a substitution of `pattern` (matched ignoring ASCII case) by
    /// `replacement`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `pattern` is empty.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        if pattern.is_empty() {
            return Err(Error::InvalidConfig(
                "substitution pattern must not be empty".to_string(),
            ));
        }

        Ok(Self {
            pattern: pattern.to_ascii_lowercase(),
            replacement: replacement.into(),
        })
    }

    /// Applies the substitution to every non-overlapping match, left to
    /// right.
    #[must_use]
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        // ASCII folding keeps byte offsets, so indices found in `folded` are
        // char boundaries in `text` as well.
        let folded = text.to_ascii_lowercase();
        let mut matches = folded.match_indices(self.pattern.as_str()).peekable();
        if matches.peek().is_none() {
            return Cow::Borrowed(text);
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for (start, _) in matches {
            out.push_str(&text[last..start]);
            out.push_str(&self.replacement);
            last = start + self.pattern.len();
        }
        out.push_str(&text[last..]);
        Cow::Owned(out)
    }
}

/// Ordered list of substitutions applied to upstream records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewriter {
    rules: Vec<Substitution>,
}

impl Rewriter {
    /// Creates a rewriter from explicit rules, applied in order.
    #[must_use]
    pub const fn new(rules: Vec<Substitution>) -> Self {
        Self { rules }
    }

    /// The observed upstream branding, replaced by `brand`.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in patterns; the `Result` comes from
    /// [`Substitution::new`].
    pub fn with_brand(brand: &str) -> Result<Self> {
        Ok(Self::new(vec![
            Substitution::new(PLAYER_PREFIX, "")?,
            Substitution::new("rolex coderz", brand)?,
            Substitution::new("rolexcoderz.xyz", brand)?,
            Substitution::new("rolexcoderz", brand)?,
        ]))
    }

    /// A rewriter that leaves everything untouched.
    #[must_use]
    pub const fn passthrough() -> Self {
        Self::new(Vec::new())
    }

    /// Returns the rules in application order.
    #[must_use]
    pub fn rules(&self) -> &[Substitution] {
        &self.rules
    }

    /// Applies all rules to one string.
    #[must_use]
    pub fn rewrite_str(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, rule| match rule.apply(&acc) {
                Cow::Borrowed(_) => acc,
                Cow::Owned(changed) => changed,
            })
    }

    /// Rewrites every string value inside `value` in place.
    pub fn rewrite_value(&self, value: &mut Value) {
        match value {
            Value::String(text) => {
                let rewritten = self.rewrite_str(text);
                *text = rewritten;
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.rewrite_value(item)),
            Value::Object(map) => map.values_mut().for_each(|item| self.rewrite_value(item)),
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    /// Rewrites a decoded payload into records.
    ///
    /// Anything other than a JSON array yields an empty list.
    #[must_use]
    pub fn transform_value(&self, value: Value) -> Vec<Record> {
        match value {
            Value::Array(items) => self.transform(items.into_iter().map(Record::new).collect()),
            _ => Vec::new(),
        }
    }

    /// Rewrites a list of records.
    #[must_use]
    pub fn transform(&self, records: Vec<Record>) -> Vec<Record> {
        records
            .into_iter()
            .map(|record| {
                let mut value = record.into_value();
                self.rewrite_value(&mut value);
                Record::new(value)
            })
            .collect()
    }
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::with_brand(DEFAULT_BRAND).unwrap_or_else(|_| Self::passthrough())
    }
}
