use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A PubChem compound identifier.
///
/// A CID uniquely names one molecular structure, which makes it the join key for every
/// molecule-level table in an archive. PubChem reserves `0` to mean "no compound", so a
/// `Cid` is always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Cid(u64);

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CidError {
    #[error("CID must be a positive integer, got '{0}'")]
    NotAnInteger(String),
    #[error("CID 0 is reserved and does not identify a compound")]
    Zero,
}

impl Cid {
    pub fn new(value: u64) -> Result<Self, CidError> {
        if value == 0 {
            Err(CidError::Zero)
        } else {
            Ok(Self(value))
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl FromStr for Cid {
    type Err = CidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = trimmed
            .parse::<u64>()
            .map_err(|_| CidError::NotAnInteger(trimmed.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<u64> for Cid {
    type Error = CidError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Cid> for u64 {
    fn from(cid: Cid) -> Self {
        cid.0
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_strings_and_trims_whitespace() {
        assert_eq!("440917".parse::<Cid>().unwrap().get(), 440917);
        assert_eq!(" 7410 ".parse::<Cid>().unwrap().get(), 7410);
    }

    #[test]
    fn rejects_zero_and_non_integers() {
        assert_eq!("0".parse::<Cid>(), Err(CidError::Zero));
        assert!(matches!(
            "98-86-2".parse::<Cid>(),
            Err(CidError::NotAnInteger(_))
        ));
        assert!(matches!("".parse::<Cid>(), Err(CidError::NotAnInteger(_))));
        assert!(matches!("-5".parse::<Cid>(), Err(CidError::NotAnInteger(_))));
    }

    #[test]
    fn display_is_the_plain_integer() {
        let cid = Cid::new(31289).unwrap();
        assert_eq!(cid.to_string(), "31289");
    }

    #[test]
    fn deserialization_rejects_zero() {
        let ok: Cid = serde_json::from_str("440917").unwrap();
        assert_eq!(ok.get(), 440917);
        assert!(serde_json::from_str::<Cid>("0").is_err());
    }
}
