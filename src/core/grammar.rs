/// Discourse grammar runtime — template parsing, loading, and expansion.
///
/// This is the rendering side of the engine: it turns a verb plus a set of
/// string bindings into prose. It knows nothing about nouns or relations.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Expansion depth at which a rule is assumed to recurse forever.
const MAX_DEPTH: usize = 32;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("template parse error: {0}")]
    TemplateParse(String),
    #[error("rule not found: {0}")]
    RuleNotFound(String),
    #[error("expansion of '{0}' exceeded the recursion limit")]
    RecursionLimit(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A text transform applied to an expanded reference: `{key.capitalize}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    /// Uppercase the first character.
    Capitalize,
    /// Uppercase the first character of every word.
    CapitalizeAll,
    /// Prefix an indefinite article.
    A,
    /// Naive English plural.
    S,
    /// Naive English past tense.
    Ed,
}

impl FromStr for Modifier {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "capitalize" => Ok(Self::Capitalize),
            "capitalizeAll" => Ok(Self::CapitalizeAll),
            "a" => Ok(Self::A),
            "s" => Ok(Self::S),
            "ed" => Ok(Self::Ed),
            _ => Err(GrammarError::TemplateParse(format!(
                "unknown modifier '{}'",
                s
            ))),
        }
    }
}

impl Modifier {
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Capitalize => capitalize(text),
            Self::CapitalizeAll => text
                .split(' ')
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
            Self::A => {
                let vowel = text
                    .chars()
                    .next()
                    .is_some_and(|c| "aeiouAEIOU".contains(c));
                if vowel {
                    format!("an {}", text)
                } else {
                    format!("a {}", text)
                }
            }
            Self::S => pluralize(text),
            Self::Ed => past_tense(text),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_alphabetic() && !"aeiouAEIOU".contains(c)
}

fn pluralize(word: &str) -> String {
    let mut rev = word.chars().rev();
    let last = rev.next();
    let before = rev.next();
    match last {
        Some('s' | 'x' | 'z') => format!("{}es", word),
        Some('h') if matches!(before, Some('s' | 'c')) => format!("{}es", word),
        Some('y') if before.is_some_and(is_consonant) => {
            format!("{}ies", &word[..word.len() - 1])
        }
        _ => format!("{}s", word),
    }
}

fn past_tense(word: &str) -> String {
    let mut rev = word.chars().rev();
    let last = rev.next();
    let before = rev.next();
    match last {
        Some('e') => format!("{}d", word),
        Some('y') if before.is_some_and(is_consonant) => {
            format!("{}ied", &word[..word.len() - 1])
        }
        _ => format!("{}ed", word),
    }
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// Reference to a binding or another rule: `{key}` or `{key.mod}`.
    Ref { key: String, modifiers: Vec<Modifier> },
}

/// A parsed template — a sequence of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse a template string into a sequence of segments.
    ///
    /// Syntax:
    /// - `{key}` → `Ref` with no modifiers
    /// - `{key.capitalize.s}` → `Ref` with modifiers applied left to right
    /// - `{{` / `}}` → literal braces
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<Template, GrammarError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            if chars[i] == '{' {
                // Escaped brace
                if i + 1 < len && chars[i + 1] == '{' {
                    literal_buf.push('{');
                    i += 2;
                    continue;
                }

                if !literal_buf.is_empty() {
                    segments.push(TemplateSegment::Literal(std::mem::take(&mut literal_buf)));
                }

                let start = i + 1;
                let mut end = start;
                while end < len && chars[end] != '}' {
                    if chars[end] == '{' {
                        return Err(GrammarError::TemplateParse(
                            "nested braces are not allowed".to_string(),
                        ));
                    }
                    end += 1;
                }

                if end == len {
                    return Err(GrammarError::TemplateParse("unclosed brace".to_string()));
                }

                let content: String = chars[start..end].iter().collect();
                segments.push(Self::parse_ref(&content)?);
                i = end + 1;
            } else if chars[i] == '}' {
                if i + 1 < len && chars[i + 1] == '}' {
                    literal_buf.push('}');
                    i += 2;
                    continue;
                }
                return Err(GrammarError::TemplateParse(
                    "unmatched closing brace".to_string(),
                ));
            } else {
                literal_buf.push(chars[i]);
                i += 1;
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }

        Ok(Template { segments })
    }

    fn parse_ref(content: &str) -> Result<TemplateSegment, GrammarError> {
        let mut parts = content.split('.');
        let key = parts.next().unwrap_or_default().trim();
        if key.is_empty() {
            return Err(GrammarError::TemplateParse("empty braces".to_string()));
        }
        let modifiers = parts.map(str::parse::<Modifier>).collect::<Result<Vec<_>, _>>()?;
        Ok(TemplateSegment::Ref {
            key: key.to_string(),
            modifiers,
        })
    }
}

/// A named discourse rule: alternative templates chosen uniformly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarRule {
    pub name: String,
    pub alternatives: Vec<Template>,
}

/// Verb-keyed discourse rules, plus any auxiliary rules they reference.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GrammarSet {
    pub rules: HashMap<String, GrammarRule>,
}

impl GrammarSet {
    /// Load a grammar set from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<GrammarSet, GrammarError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a grammar set from a RON map of rule name to template list:
    /// `{ "take": ["{subject} took {object}."] }`.
    pub fn parse_ron(input: &str) -> Result<GrammarSet, GrammarError> {
        let raw: HashMap<String, Vec<String>> = ron::from_str(input)?;
        let mut gs = GrammarSet::default();
        for (name, texts) in raw {
            let texts: Vec<&str> = texts.iter().map(String::as_str).collect();
            gs.add_rule(&name, &texts)?;
        }
        Ok(gs)
    }

    /// Add or replace a rule from raw template strings.
    pub fn add_rule(&mut self, name: &str, texts: &[&str]) -> Result<(), GrammarError> {
        let alternatives = texts
            .iter()
            .map(|t| Template::parse(t))
            .collect::<Result<Vec<_>, _>>()?;
        self.rules.insert(
            name.to_string(),
            GrammarRule {
                name: name.to_string(),
                alternatives,
            },
        );
        Ok(())
    }

    /// Merge another grammar set into this one. Rules from `other`
    /// override rules in `self` with the same name.
    pub fn merge(&mut self, other: GrammarSet) {
        self.rules.extend(other.rules);
    }

    /// Expand `rule` with the given bindings.
    ///
    /// A reference resolves to a binding first and a rule second. Bound
    /// text is inserted verbatim; rule text is expanded recursively.
    pub fn expand<R: Rng + ?Sized>(
        &self,
        rule: &str,
        bindings: &HashMap<String, String>,
        rng: &mut R,
    ) -> Result<String, GrammarError> {
        self.expand_rule(rule, bindings, rng, 0)
    }

    fn expand_rule<R: Rng + ?Sized>(
        &self,
        name: &str,
        bindings: &HashMap<String, String>,
        rng: &mut R,
        depth: usize,
    ) -> Result<String, GrammarError> {
        if depth > MAX_DEPTH {
            return Err(GrammarError::RecursionLimit(name.to_string()));
        }
        let rule = self
            .rules
            .get(name)
            .ok_or_else(|| GrammarError::RuleNotFound(name.to_string()))?;
        let Some(template) = rule.alternatives.choose(rng) else {
            return Ok(String::new());
        };

        let mut out = String::new();
        for segment in &template.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Ref { key, modifiers } => {
                    let mut text = match bindings.get(key) {
                        Some(bound) => bound.clone(),
                        None => self.expand_rule(key, bindings, rng, depth + 1)?,
                    };
                    for modifier in modifiers {
                        text = modifier.apply(&text);
                    }
                    out.push_str(&text);
                }
            }
        }
        Ok(out)
    }
}
