use crate::error::SourceError;
use std::fmt;
use std::str::FromStr;

/// Coin ticker symbol. Providers disagree on case (the plugin api wants
/// upper case, the explorer lower case), so the symbol is validated once and
/// each adapter asks for the spelling it needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker(String);

impl Ticker {
    pub fn upper(&self) -> String {
        self.0.to_ascii_uppercase()
    }

    pub fn lower(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl FromStr for Ticker {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SourceError::config(format!("Invalid ticker symbol: {:?}", s)));
        }

        Ok(Ticker(s.to_ascii_uppercase()))
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
