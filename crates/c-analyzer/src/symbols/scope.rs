use std::fmt;

use serde::{Deserialize, Serialize};

pub const SCOPE_SEPARATOR: &str = "::";
pub const ANON_PREFIX: &str = "__anon";

/// A `::`-separated scope path such as `Point::x` or `S::__anon0::i`.
///
/// Parsed once when a record is ingested; resolution works on segments
/// instead of re-slicing the flattened string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ScopePath {
    segments: Vec<String>,
}

impl ScopePath {
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split(SCOPE_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        Self {
            segments,
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Final segment, the bare name.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<ScopePath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn child(
        &self,
        segment: &str,
    ) -> ScopePath {
        let mut segments = self.segments.clone();
        segments.extend(ScopePath::parse(segment).segments);
        Self {
            segments,
        }
    }

    pub fn join(
        &self,
        other: &ScopePath,
    ) -> ScopePath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self {
            segments,
        }
    }

    /// Segment-wise prefix test: `S::__anon1` is not a prefix of `S::__anon10`.
    pub fn starts_with(
        &self,
        prefix: &ScopePath,
    ) -> bool {
        self.segments.len() >= prefix.segments.len() && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    /// Segments after `prefix`, if `prefix` is a segment-wise prefix.
    pub fn strip_prefix(
        &self,
        prefix: &ScopePath,
    ) -> Option<&[String]> {
        self.starts_with(prefix).then(|| &self.segments[prefix.segments.len()..])
    }

    pub fn is_anonymous(&self) -> bool {
        self.last().is_some_and(is_anonymous_segment)
    }

    /// Flattened query form with a trailing separator, e.g. `Point::`.
    pub fn member_prefix(&self) -> String {
        format!("{self}{SCOPE_SEPARATOR}")
    }
}

pub fn is_anonymous_segment(segment: &str) -> bool {
    segment.starts_with(ANON_PREFIX)
}

impl fmt::Display for ScopePath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.segments.join(SCOPE_SEPARATOR))
    }
}

impl From<String> for ScopePath {
    fn from(raw: String) -> Self {
        ScopePath::parse(&raw)
    }
}

impl From<&str> for ScopePath {
    fn from(raw: &str) -> Self {
        ScopePath::parse(raw)
    }
}

impl From<ScopePath> for String {
    fn from(path: ScopePath) -> Self {
        path.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateTag {
    Struct,
    Union,
    Class,
    Enum,
}

impl AggregateTag {
    pub fn keyword(self) -> &'static str {
        match self {
            AggregateTag::Struct => "struct",
            AggregateTag::Union => "union",
            AggregateTag::Class => "class",
            AggregateTag::Enum => "enum",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "struct" => Some(AggregateTag::Struct),
            "union" => Some(AggregateTag::Union),
            "class" => Some(AggregateTag::Class),
            "enum" => Some(AggregateTag::Enum),
            _ => None,
        }
    }

    /// Tags whose members are reachable with `.` / `->`.
    pub fn has_members(self) -> bool {
        !matches!(self, AggregateTag::Enum)
    }
}

/// Reference from a record to the type it names, e.g. `struct:Foo` or `Foo::bar`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub tag: Option<AggregateTag>,
    pub path: ScopePath,
}

impl TypeRef {
    pub fn new(
        tag: Option<AggregateTag>,
        path: ScopePath,
    ) -> Self {
        Self {
            tag,
            path,
        }
    }

    /// Parse the flattened form. `typename:` prefixes carry no tag.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some((prefix, rest)) = raw.split_once(':')
            && !rest.starts_with(':')
        {
            if let Some(tag) = AggregateTag::from_keyword(prefix) {
                return Self::new(Some(tag), ScopePath::parse(rest));
            }
            if prefix == "typename" {
                return Self::new(None, ScopePath::parse(rest));
            }
        }
        Self::new(None, ScopePath::parse(raw))
    }

    /// Whether this reference claims an aggregate scope (struct/union/class).
    pub fn claims_scope(&self) -> bool {
        self.tag.is_some_and(AggregateTag::has_members)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.tag {
            Some(tag) => write!(f, "{}:{}", tag.keyword(), self.path),
            None => write!(f, "{}", self.path),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/symbols/scope_tests.rs"]
mod tests;
