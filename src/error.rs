// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

/// Errors raised synchronously by constructors and conversions.
///
/// NaN results are not errors: arithmetic propagates them silently.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
    /// the value is infinite, NaN, or outside the range of `target`
    #[error("value {value} overflows {target}")]
    Overflow { value: String, target: &'static str },
    #[error("value {value} is not an integer")]
    NonIntegral { value: String },
}

impl Error {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            reason: reason.into(),
        }
    }
    pub(crate) fn overflow(value: &impl std::fmt::Display, target: &'static str) -> Self {
        tracing::debug!(%value, format = target, "conversion overflowed");
        Error::Overflow {
            value: value.to_string(),
            target,
        }
    }
    pub(crate) fn non_integral(value: &impl std::fmt::Display) -> Self {
        Error::NonIntegral {
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
