//! Error codes shared by every fallible operation.
//!
//! Each module owns its own `thiserror` enum; this module gives them a common
//! machine-readable code and sorts them into the handful of kinds the
//! rendering layer reacts to differently (an inline inspector message versus
//! a blocking alert, for instance).

/// Grepable error code and user-facing classification.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    /// Coarse classification used by the rendering layer.
    fn kind(&self) -> ErrorKind;
}

/// How an error should surface to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A drop that would break nesting rules. Nothing was mutated.
    StructuralReject,
    /// A draft field failed validation. Blocks save only.
    Validation,
    /// A layout save was attempted with a blank name. Nothing was written.
    PersistenceName,
    /// The referenced row, widget, or layout does not exist.
    NotFound,
    /// The transfer payload or stored document could not be decoded.
    Payload,
    /// Durable storage failed after the in-memory state changed.
    Storage,
    /// The operation is not valid in the current state.
    InvalidState,
}
