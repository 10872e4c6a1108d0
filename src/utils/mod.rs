//! Utility modules
//!
//! This module contains the error and report types shared by the core,
//! the session layer and the binaries.

pub mod error;

// Re-export commonly used items
pub use error::{
    ExpansionOutput, ExpansionWarning, SettingsError, SettingsResult, WarningKind,
};
