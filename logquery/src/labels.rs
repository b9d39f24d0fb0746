//! LogQL building blocks: label names, stream selectors and line filters.

use crate::selection::Service;
use std::fmt;

pub const ENVIRONMENT: &str = "environment";
pub const REGION: &str = "region";
pub const SERVICE: &str = "service";
pub const APP: &str = "app";
pub const CONTAINER: &str = "container";

/// Quotes a value as a LogQL double-quoted string.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// `{environment="..", region="..", service="..", ...}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamSelector {
    matchers: Vec<(&'static str, String)>,
}

impl StreamSelector {
    pub fn new(environment: &str, region: &str, service: Service) -> Self {
        StreamSelector {
            matchers: vec![
                (ENVIRONMENT, environment.to_string()),
                (REGION, region.to_string()),
                (SERVICE, service.as_str().to_string()),
            ],
        }
    }

    pub fn with(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.matchers.push((label, value.into()));
        self
    }

    #[cfg(test)]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.matchers
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for StreamSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (label, value)) in self.matchers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{label}={}", quote(value))?;
        }
        f.write_str("}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineFilter {
    Contains(String),
    NotContains(String),
    Matches(String),
}

impl fmt::Display for LineFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineFilter::Contains(value) => write!(f, "|= {}", quote(value)),
            LineFilter::NotContains(value) => write!(f, "!= {}", quote(value)),
            LineFilter::Matches(pattern) => write!(f, "|~ {}", quote(pattern)),
        }
    }
}

/// Renders a selector followed by its line filters.
pub fn render(selector: &StreamSelector, filters: &[LineFilter]) -> String {
    let mut query = selector.to_string();
    for filter in filters {
        query.push(' ');
        query.push_str(&filter.to_string());
    }
    query
}
