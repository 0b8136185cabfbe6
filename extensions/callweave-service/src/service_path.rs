use crate::{PATH_SEPARATOR, route_id_hash};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("a service path needs a root and a method segment, got {0} segment(s)")]
    TooFewSegments(usize),

    #[error("segment {0} of the service path is empty")]
    EmptySegment(usize),
}

/// Route of a call: root service, sub-service chain, method.
///
/// Always holds at least two non-empty segments. Equality is positional and
/// case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServicePath {
    segments: Vec<String>,
}

impl ServicePath {
    pub fn new<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();

        if segments.len() < 2 {
            return Err(PathError::TooFewSegments(segments.len()));
        }

        if let Some(index) = segments.iter().position(String::is_empty) {
            return Err(PathError::EmptySegment(index));
        }

        Ok(Self { segments })
    }

    /// Parses the formatted form, e.g. `SuperService/Trivial/DoSomething`.
    pub fn parse(formatted: &str) -> Result<Self, PathError> {
        Self::new(formatted.split(PATH_SEPARATOR))
    }

    /// Appends `method` to a root-plus-sub-services prefix.
    pub fn for_method(prefix: &[String], method: &str) -> Result<Self, PathError> {
        Self::new(prefix.iter().map(String::as_str).chain([method]))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    pub fn method(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// The interior segments, naming the sub-service chain.
    pub fn subservices(&self) -> &[String] {
        &self.segments[1..self.segments.len() - 1]
    }

    pub fn format(&self) -> String {
        self.segments.join(&PATH_SEPARATOR.to_string())
    }

    /// xxh3 hash of the formatted path; equal to `route_id!` of the same text.
    pub fn route_id(&self) -> u64 {
        route_id_hash(&self.format())
    }
}

impl fmt::Display for ServicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
