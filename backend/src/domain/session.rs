//! Front-desk session handed to core operations.
//!
//! The desk gate itself lives at the edge (REST layer); services only see the
//! outcome and never consult ambient state.
use super::errors::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    desk_open: bool,
}

impl SessionContext {
    pub fn open() -> Self {
        Self { desk_open: true }
    }

    pub fn closed() -> Self {
        Self { desk_open: false }
    }

    /// Open the desk when the entered passcode matches the configured one.
    pub fn from_passcode(entered: Option<&str>, expected: &str) -> Self {
        match entered {
            Some(code) if code.trim() == expected => Self::open(),
            _ => Self::closed(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.desk_open
    }

    pub fn require_open(&self) -> Result<(), CoreError> {
        if self.desk_open {
            Ok(())
        } else {
            Err(CoreError::Unauthorized)
        }
    }
}
