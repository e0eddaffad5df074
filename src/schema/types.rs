use regex::Regex;
use std::{fmt, sync::LazyLock};

/// JSON kind a field value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
}

impl FieldKind {
    pub fn json_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_type())
    }
}

/// A declarative check applied to a string field once its kind is known.
#[derive(Debug)]
pub enum Constraint {
    MinLength {
        min: usize,
        message: &'static str,
    },
    Pattern {
        regex: &'static LazyLock<Regex>,
        message: &'static str,
    },
}

impl Constraint {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinLength { .. } => "min_length",
            Self::Pattern { .. } => "pattern",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::MinLength { message, .. } | Self::Pattern { message, .. } => message,
        }
    }

    pub fn is_satisfied_by(&self, value: &str) -> bool {
        match self {
            Self::MinLength { min, .. } => value.chars().count() >= *min,
            Self::Pattern { regex, .. } => regex.is_match(value),
        }
    }
}

#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
    pub constraints: &'static [Constraint],
}

/// Constraint table for one JSON object shape.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [Field],
}
