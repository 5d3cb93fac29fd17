use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotoKind {
    Crown,
    Trunk,
    Defect,
    Site,
    Unknown(String),
}

impl PhotoKind {
    pub fn as_str(&self) -> &str {
        match self {
            PhotoKind::Crown => "crown",
            PhotoKind::Trunk => "trunk",
            PhotoKind::Defect => "defect",
            PhotoKind::Site => "site",
            PhotoKind::Unknown(value) => value.as_str(),
        }
    }
}

impl fmt::Display for PhotoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for PhotoKind {
    fn from(value: &str) -> Self {
        match value {
            "crown" => PhotoKind::Crown,
            "trunk" => PhotoKind::Trunk,
            "defect" => PhotoKind::Defect,
            "site" => PhotoKind::Site,
            other => PhotoKind::Unknown(other.to_string()),
        }
    }
}
