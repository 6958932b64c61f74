//! Path templates with single-segment placeholders, e.g. `/user/:id/orders`.

use std::collections::BTreeMap;

use super::ContractError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    path: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(path: &str) -> Result<Self, ContractError> {
        let invalid = |reason: &str| ContractError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let rest = path.strip_prefix('/').ok_or_else(|| invalid("path must start with '/'"))?;
        if path.contains(['?', '#']) {
            return Err(invalid("path must not contain query or fragment"));
        }

        let mut segments = Vec::new();
        for segment in rest.split('/') {
            let Some(name) = segment.strip_prefix(':') else {
                segments.push(Segment::Literal(segment.to_string()));
                continue;
            };

            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(invalid("path param name must be alphanumeric"));
            }
            if segments.iter().any(|s| matches!(s, Segment::Variable(v) if v == name)) {
                return Err(invalid("path param name must be unique"));
            }
            segments.push(Segment::Variable(name.to_string()));
        }

        Ok(Self {
            path: path.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Placeholder names, in path order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables().any(|variable| variable == name)
    }

    /// Substitutes every placeholder, returning the unencoded path segments.
    ///
    /// Encoding is left to the URL builder, which escapes each segment on its own.
    /// Values the builder would drop or collapse (empty, `.`, `..`) are rejected.
    pub fn resolve(&self, values: &BTreeMap<String, String>) -> Result<Vec<String>, ContractError> {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => Ok(text.clone()),
                Segment::Variable(name) => self.resolve_variable(name, values),
            })
            .collect()
    }

    fn resolve_variable(&self, name: &str, values: &BTreeMap<String, String>) -> Result<String, ContractError> {
        let value = values.get(name).ok_or_else(|| ContractError::UnresolvedPlaceholder {
            path: self.path.clone(),
            name: name.to_string(),
        })?;
        if matches!(value.as_str(), "" | "." | "..") {
            return Err(ContractError::InvalidPathValue {
                path: self.path.clone(),
                name: name.to_string(),
                value: value.clone(),
            });
        }
        Ok(value.clone())
    }
}
