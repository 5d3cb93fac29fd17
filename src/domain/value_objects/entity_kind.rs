use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of entity kinds that can appear in the sync queue.
/// Kept closed so push dispatch stays an exhaustive match.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Plot,
    Tree,
    Photo,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::Plot => "plot",
            EntityKind::Tree => "tree",
            EntityKind::Photo => "photo",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "project" => Ok(EntityKind::Project),
            "plot" => Ok(EntityKind::Plot),
            "tree" => Ok(EntityKind::Tree),
            "photo" => Ok(EntityKind::Photo),
            other => Err(format!("unknown entity kind: {other}")),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
