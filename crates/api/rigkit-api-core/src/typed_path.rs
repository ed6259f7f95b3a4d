//! TypedPath parsing and formatting.
//!
//! Grammar:
//!   namespace/.../target.field.subfield
//! - '/' separates namespace segments
//! - the last segment holds the `target` and optional `.`-separated fields
//!
//! Examples:
//!   "rig/arm_L/ikChain.startLength" -> namespaces=["rig","arm_L"], target="ikChain", fields=["startLength"]
//!   "rig/arm_L/shoulder.worldMatrix" -> namespaces=["rig","arm_L"], target="shoulder", fields=["worldMatrix"]
//!
//! Hosts resolve paths to their own attribute handles; rigkit only compares and prints them.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("invalid typed path: empty {0} segment")]
    EmptySegment(&'static str),
    #[error("invalid typed path: {0} contains whitespace")]
    Whitespace(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypedPath {
    pub namespaces: Vec<String>,
    pub target: String,
    pub fields: Vec<String>,
}

fn check_segment(seg: &str, what: &'static str) -> Result<(), PathError> {
    if seg.is_empty() {
        return Err(PathError::EmptySegment(what));
    }
    if seg.chars().any(char::is_whitespace) {
        return Err(PathError::Whitespace(what));
    }
    Ok(())
}

impl TypedPath {
    pub fn new(namespaces: Vec<String>, target: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            namespaces,
            target: target.into(),
            fields,
        }
    }

    /// Parse a path string according to the grammar described above.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let mut namespaces: Vec<String> = Vec::new();
        let mut segments = s.split('/').peekable();
        let mut last = "";
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                last = seg;
                break;
            }
            check_segment(seg, "namespace")?;
            namespaces.push(seg.to_string());
        }

        let mut parts = last.split('.');
        let target = parts.next().unwrap_or_default();
        check_segment(target, "target")?;

        let mut fields = Vec::new();
        for field in parts {
            check_segment(field, "field")?;
            fields.push(field.to_string());
        }

        Ok(TypedPath {
            namespaces,
            target: target.to_string(),
            fields,
        })
    }

    pub fn target_name(&self) -> &str {
        &self.target
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(|s| s.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|s| s.as_str())
    }

    /// Same namespaces and target with `field` appended. Used to address one output port of a
    /// node that publishes several.
    pub fn with_field(&self, field: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.fields.push(field.into());
        next
    }
}

impl fmt::Display for TypedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ns in &self.namespaces {
            write!(f, "{ns}/")?;
        }
        f.write_str(&self.target)?;
        for field in &self.fields {
            write!(f, ".{field}")?;
        }
        Ok(())
    }
}

impl FromStr for TypedPath {
    type Err = PathError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypedPath::parse(s)
    }
}

impl Serialize for TypedPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypedPath {
    fn deserialize<D>(deserializer: D) -> Result<TypedPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TypedPath::parse(&s).map_err(de::Error::custom)
    }
}
