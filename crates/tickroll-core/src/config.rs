//! Report configuration.
//!
//! Everything that shapes a report is passed in explicitly: nothing here
//! reads globals or falls back to a default timezone.

use serde::Serialize;

use crate::{SessionDate, SessionTimezone, SessionWindow, Symbol, ValidationError};

/// Inputs identifying one (symbol, date) session and how to read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportConfig {
    pub symbol: Symbol,
    pub date: SessionDate,
    pub timezone: SessionTimezone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_window: Option<SessionWindow>,
}

impl ReportConfig {
    pub fn new(symbol: Symbol, date: SessionDate, timezone: SessionTimezone) -> Self {
        Self {
            symbol,
            date,
            timezone,
            session_window: None,
        }
    }

    /// Build from raw CLI-style strings.
    pub fn parse(symbol: &str, date: &str, timezone: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(
            Symbol::parse(symbol)?,
            SessionDate::parse(date)?,
            SessionTimezone::parse(timezone)?,
        ))
    }

    pub fn with_session_window(mut self, window: Option<SessionWindow>) -> Self {
        self.session_window = window;
        self
    }
}
