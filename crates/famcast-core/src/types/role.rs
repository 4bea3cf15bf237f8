//! Device role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// The two sides of a pairing.
///
/// A parent device issues playback commands; a child device executes them
/// and reports status back. Exactly one of each per pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRole {
    /// Controlling side of a pairing.
    Parent,
    /// Controlled side of a pairing.
    Child,
}

impl DeviceRole {
    /// Return the opposite side of the pairing.
    pub fn counterpart(&self) -> Self {
        match self {
            Self::Parent => Self::Child,
            Self::Child => Self::Parent,
        }
    }

    /// Check if this role is the parent side.
    pub fn is_parent(&self) -> bool {
        matches!(self, Self::Parent)
    }

    /// Check if this role is the child side.
    pub fn is_child(&self) -> bool {
        matches!(self, Self::Child)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Child => "child",
        }
    }
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeviceRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "parent" => Ok(Self::Parent),
            "child" => Ok(Self::Child),
            _ => Err(AppError::validation(format!(
                "Invalid device role: '{s}'. Expected one of: parent, child"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counterpart() {
        assert_eq!(DeviceRole::Parent.counterpart(), DeviceRole::Child);
        assert_eq!(DeviceRole::Child.counterpart(), DeviceRole::Parent);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("parent".parse::<DeviceRole>().unwrap(), DeviceRole::Parent);
        assert_eq!("CHILD".parse::<DeviceRole>().unwrap(), DeviceRole::Child);
        assert!("admin".parse::<DeviceRole>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&DeviceRole::Parent).unwrap(),
            "\"parent\""
        );
    }
}
