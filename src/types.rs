//! Core type definitions for the classico debate engine

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Numeric team identifier as assigned by football-data.org
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(u32);

impl TeamId {
    /// Create a team ID from the upstream numeric identifier
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw numeric identifier
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a debate session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebateId(Uuid);

impl DebateId {
    /// Create a new random debate ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a debate ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for DebateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DebateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A league season, identified by its starting year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Season(u16);

impl Season {
    /// Create a season from its starting year (e.g. 2023 for 2023/2024)
    pub fn new(start_year: u16) -> Self {
        Self(start_year)
    }

    /// Starting year of the season
    pub fn start_year(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_displays_as_range() {
        assert_eq!(Season::new(2023).to_string(), "2023/2024");
    }
}
