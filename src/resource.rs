//! Resource string parsing.

use crate::error::{Result, SnapshotError};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// The only project placeholder the event system emits for database events.
pub const PROJECT_PLACEHOLDER: &str = "_";

fn resource_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^projects/([^/]+)/instances/([^/]+)(?:/refs(/.*)?)?$")
            .expect("resource pattern is valid")
    })
}

/// A parsed `projects/<project>/instances/<instance>/refs/<path>` resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourcePath {
    pub project: String,
    pub instance: String,
    /// Absolute path inside the instance, always starting with `/`.
    pub path: String,
}

impl ResourcePath {
    pub fn parse(resource: &str) -> Result<Self> {
        let captures = resource_pattern().captures(resource).ok_or_else(|| {
            tracing::warn!(resource, "rejecting malformed resource");
            SnapshotError::Format(format!("Unexpected resource string: {}", resource))
        })?;

        let project = &captures[1];
        if project != PROJECT_PLACEHOLDER {
            tracing::warn!(resource, project, "rejecting resource for unexpected project");
            return Err(SnapshotError::Format(format!(
                "Expected project placeholder '{}', got '{}'",
                PROJECT_PLACEHOLDER, project
            )));
        }

        let path = captures
            .get(3)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        Ok(Self {
            project: project.to_string(),
            instance: captures[2].to_string(),
            path,
        })
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/instances/{}/refs{}",
            self.project, self.instance, self.path
        )
    }
}
