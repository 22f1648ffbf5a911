//! Named string-shape checks usable by any string property.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern must compile")
});

static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("uuid pattern must compile")
});

// One compiled alternation per distinct value set.
static ENUM_PATTERNS: Lazy<Mutex<HashMap<Vec<String>, Arc<Regex>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

#[derive(Debug, Clone)]
pub enum Format {
    Identifier,
    Uuid,
    OneOf(EnumFormat),
    Pattern(NamedPattern),
}

impl Format {
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Format::OneOf(EnumFormat::new(values))
    }

    /// Name shown in error messages; `None` for anonymous formats.
    pub fn name(&self) -> Option<&str> {
        match self {
            Format::Identifier => Some("identifier"),
            Format::Uuid => Some("uuid"),
            Format::OneOf(_) => None,
            Format::Pattern(pattern) => Some(pattern.name()),
        }
    }

    pub fn validate(&self, value: &str) -> bool {
        match self {
            Format::Identifier => IDENTIFIER.is_match(value),
            Format::Uuid => UUID.is_match(value),
            Format::OneOf(values) => values.matches(value),
            Format::Pattern(pattern) => pattern.regex.is_match(value),
        }
    }
}

pub fn validate(format: &Format, value: &str) -> bool {
    format.validate(value)
}

/// Anchored alternation of literal values, e.g. `^(postgres|mysql)$`.
#[derive(Debug, Clone)]
pub struct EnumFormat {
    values: Arc<[String]>,
    regex: Arc<Regex>,
}

impl EnumFormat {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let regex = enum_regex(&values);
        Self {
            values: values.into(),
            regex,
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    /// An empty value set accepts nothing.
    pub fn matches(&self, value: &str) -> bool {
        !self.values.is_empty() && self.regex.is_match(value)
    }
}

fn enum_regex(values: &[String]) -> Arc<Regex> {
    let mut cache = ENUM_PATTERNS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(regex) = cache.get(values) {
        return Arc::clone(regex);
    }
    let alternatives = values
        .iter()
        .map(|value| regex::escape(value))
        .collect::<Vec<_>>()
        .join("|");
    let regex = Arc::new(
        Regex::new(&format!("^({alternatives})$")).expect("escaped literals must compile"),
    );
    cache.insert(values.to_vec(), Arc::clone(&regex));
    regex
}

/// User-supplied regular expression reported under its own name.
#[derive(Debug, Clone)]
pub struct NamedPattern {
    name: String,
    regex: Arc<Regex>,
}

impl NamedPattern {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            regex: Arc::new(Regex::new(pattern)?),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
