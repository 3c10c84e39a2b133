// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Result and Option
//!
//! Fallible and optional computation outcomes use the native sum types:
//! `Result<T>` is `core::result::Result<T, Error>` and `Option<T>` is
//! `core::option::Option<T>`. Exactly one variant is active at a time and
//! `if let`, `let else` and `match` destructure the present branch while
//! keeping the alternate branch (`Error` or absence) explicitly reachable.
//!
//! This module adds what the native types leave to convention:
//!
//! - constructors mirroring the factory vocabulary (`ok`, `err`, `some`,
//!   `none`),
//! - `Outcome`, a single operation set shared by every `Result<T, E>` and
//!   `Option<T>` so generic call sites can treat both uniformly,
//! - `OptionExt` and `ResultExt` for code/category based conversions and
//!   fatal unwrapping with a category-resolved message.
//!
//! `unwrap` on `Err(e)` panics with the `Debug` rendering of `e`, which
//! resolves the message through the error's category.
//!
//! ## Usage
//!
//! ```rust
//! use strata_core::error::{ContainerErrorCode, CONTAINER_CATEGORY};
//! use strata_core::result::{err, ok, Outcome};
//!
//! let good: strata_core::Result<i32> = ok(3);
//! let bad: strata_core::Result<i32> = err(ContainerErrorCode::InvalidRange as i64, &CONTAINER_CATEGORY);
//!
//! assert_eq!(good.unwrap_or(0), 3);
//! assert_eq!(bad.unwrap_or(0), 0);
//! assert!(bad.is_failure());
//! ```

use crate::error::{Error, ErrorCategory};

/// The result of a recoverable operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Wraps a successful value.
#[inline(always)]
pub const fn ok<T>(value: T) -> Result<T> {
    Ok(value)
}

/// Creates a failed result from a code and its category.
#[inline(always)]
pub const fn err<T>(code: i64, category: &'static dyn ErrorCategory) -> Result<T> {
    Err(Error::new(code, category))
}

/// Wraps a present value.
#[inline(always)]
pub const fn some<T>(value: T) -> Option<T> {
    Some(value)
}

/// Creates an absent value.
#[inline(always)]
pub const fn none<T>() -> Option<T> {
    None
}

/// The operation set shared by every success-or-alternative type.
///
/// Implemented for `Result<T, E>` and `Option<T>`, so code that is generic
/// over "something that may have produced a `T`" does not need to know which
/// one it holds.
pub trait Outcome: Sized {
    /// The payload of the success (or present) branch.
    type Value;

    /// Returns `true` if the success branch is active.
    fn is_success(&self) -> bool;

    /// Returns `true` if the alternate branch is active.
    #[inline]
    fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Moves the payload out, discarding the alternate branch.
    fn success(self) -> Option<Self::Value>;

    /// Returns the payload, or `default` if the alternate branch is active.
    /// Never panics.
    #[inline]
    fn unwrap_or(self, default: Self::Value) -> Self::Value {
        self.success().unwrap_or(default)
    }

    /// Returns the payload, or computes one from `f`.
    #[inline]
    fn unwrap_or_else<F>(self, f: F) -> Self::Value
    where
        F: FnOnce() -> Self::Value,
    {
        self.success().unwrap_or_else(f)
    }

    /// Converts into a `Result`, assigning `code` in `category` to the
    /// alternate branch when it carries no error of its own.
    fn into_result(self, code: i64, category: &'static dyn ErrorCategory) -> Result<Self::Value>;

    /// Renders the active branch for diagnostics.
    #[inline]
    fn describe(&self) -> String
    where
        Self: std::fmt::Debug,
    {
        format!("{:?}", self)
    }
}

impl<T, E> Outcome for std::result::Result<T, E>
where
    E: Into<Error>,
{
    type Value = T;

    #[inline]
    fn is_success(&self) -> bool {
        self.is_ok()
    }

    #[inline]
    fn success(self) -> Option<T> {
        self.ok()
    }

    #[inline]
    fn into_result(self, _code: i64, _category: &'static dyn ErrorCategory) -> Result<T> {
        self.map_err(Into::into)
    }
}

impl<T> Outcome for Option<T> {
    type Value = T;

    #[inline]
    fn is_success(&self) -> bool {
        self.is_some()
    }

    #[inline]
    fn success(self) -> Option<T> {
        self
    }

    #[inline]
    fn into_result(self, code: i64, category: &'static dyn ErrorCategory) -> Result<T> {
        self.ok_or(Error::new(code, category))
    }
}

/// Conversions from `Option` into the error model.
pub trait OptionExt<T> {
    /// Maps `None` to an error with `code` in `category`.
    fn ok_or_code(self, code: i64, category: &'static dyn ErrorCategory) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    #[inline]
    fn ok_or_code(self, code: i64, category: &'static dyn ErrorCategory) -> Result<T> {
        self.ok_or(Error::new(code, category))
    }
}

/// Helpers for `Result<T, Error>`.
pub trait ResultExt<T> {
    /// The error code, or `None` if the result is `Ok`.
    fn code(&self) -> Option<i64>;

    /// Returns the payload or panics with `message` followed by the resolved
    /// error message.
    ///
    /// # Panics
    ///
    /// Panics if the result is `Err`.
    fn expect_with<F, S>(self, message: F) -> T
    where
        F: FnOnce(&Error) -> S,
        S: std::fmt::Display;
}

impl<T> ResultExt<T> for Result<T> {
    #[inline]
    fn code(&self) -> Option<i64> {
        self.as_ref().err().map(Error::code)
    }

    #[inline]
    #[track_caller]
    fn expect_with<F, S>(self, message: F) -> T
    where
        F: FnOnce(&Error) -> S,
        S: std::fmt::Display,
    {
        match self {
            Ok(value) => value,
            Err(e) => panic!("{}: {}", message(&e), e),
        }
    }
}
