//! Error types raised by the settlement machinery itself.
//!
//! User rejections travel as the caller's own reason type `E`; the crate only
//! manufactures a reason of its own when the resolution procedure detects a
//! chaining cycle, which is why the adoption paths require
//! `E: From<SettleError>`.

use thiserror::Error;

/// # Errors produced by the resolution procedure.
///
/// These are distinct from user rejections: a user rejection carries the
/// caller's reason type verbatim, while a [`SettleError`] is synthesized by
/// the crate when settlement itself cannot proceed.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleError {
    /// A future was resolved with itself; adoption would wait forever.
    #[error("chaining cycle: future resolved with itself")]
    Cycle,
}

impl SettleError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use microfuture::SettleError;
    ///
    /// assert_eq!(SettleError::Cycle.as_label(), "settle_cycle");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SettleError::Cycle => "settle_cycle",
        }
    }
}

/// Plain-string reason types are common in small embedders and in tests.
impl From<SettleError> for String {
    fn from(err: SettleError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display_names_the_cycle() {
        let msg: String = SettleError::Cycle.into();
        assert!(msg.contains("cycle"), "message should mention the cycle: {msg}");
    }
}
