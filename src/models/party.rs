//! The two cost-sharing parties
//!
//! Party A is `U1`, party B is `U2`. Sheet names, ratio columns and amount
//! columns are all derived from these labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SplitError;

/// One side of a shared expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Party {
    /// Party A
    #[default]
    U1,
    /// Party B
    U2,
}

impl Party {
    /// Both parties in column order (A first)
    pub const ALL: [Party; 2] = [Party::U1, Party::U2];

    /// Label used for sheet names and column prefixes
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::U1 => "U1",
            Self::U2 => "U2",
        }
    }

    /// The party on the other side of the split
    pub fn other(&self) -> Self {
        match self {
            Self::U1 => Self::U2,
            Self::U2 => Self::U1,
        }
    }

    /// Header of this party's ratio column
    pub fn ratio_column(&self) -> String {
        format!("{} ratio", self.as_str())
    }

    /// Header of this party's share column
    pub fn share_column(&self) -> String {
        format!("{} share", self.as_str())
    }

    /// Header the transaction amount is stored under when this party acts
    pub fn amount_column(&self) -> String {
        format!("{} amount", self.as_str())
    }

    /// Prefix of this party's archive sheet names
    pub fn archive_prefix(&self) -> String {
        format!("{}_archive_", self.as_str())
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Party {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "U1" => Ok(Self::U1),
            "U2" => Ok(Self::U2),
            other => Err(SplitError::PartyMismatch(format!(
                "unknown party '{}', expected U1 or U2",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_party() {
        assert_eq!("U1".parse::<Party>().unwrap(), Party::U1);
        assert_eq!(" u2 ".parse::<Party>().unwrap(), Party::U2);
        assert!(matches!(
            "U3".parse::<Party>(),
            Err(SplitError::PartyMismatch(_))
        ));
    }

    #[test]
    fn test_column_names() {
        assert_eq!(Party::U1.amount_column(), "U1 amount");
        assert_eq!(Party::U2.ratio_column(), "U2 ratio");
        assert_eq!(Party::U2.share_column(), "U2 share");
        assert_eq!(Party::U1.archive_prefix(), "U1_archive_");
    }

    #[test]
    fn test_other() {
        assert_eq!(Party::U1.other(), Party::U2);
        assert_eq!(Party::U2.other(), Party::U1);
    }
}
