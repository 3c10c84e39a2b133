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

//! # Error Codes and Categories
//!
//! Recoverable errors are a numeric code plus a reference to the category that
//! produced it. The category is a statically allocated resolver that turns a
//! code into a message, and the message is only produced on demand, so
//! propagating an `Error` costs a copy of two words regardless of how
//! expensive the message is to build.
//!
//! ## Highlights
//!
//! - `ErrorCategory` is the resolver capability (`name`, `message`).
//! - Built-in categories: `POSIX_CATEGORY` (operating-system error strings),
//!   `CONTAINER_CATEGORY` (`ContainerErrorCode`), `GENERIC_CATEGORY`.
//! - `Error` is `Copy`, implements `std::error::Error`, and converts from
//!   `std::io::Error`.
//!
//! ## Usage
//!
//! ```rust
//! use strata_core::error::{ContainerErrorCode, Error, CONTAINER_CATEGORY};
//!
//! let e = Error::new(ContainerErrorCode::IndexOutOfBounds as i64, &CONTAINER_CATEGORY);
//! assert_eq!(e.code(), 1);
//! assert_eq!(e.message(), "index out of bounds");
//! assert_eq!(format!("{}", e), "Error 0x1: index out of bounds");
//! ```

use std::borrow::Cow;

/// Converts error codes of one class of errors into messages.
///
/// Implementations are expected to be stateless statics so that an `Error`
/// can hold a `&'static dyn ErrorCategory`.
pub trait ErrorCategory: Sync {
    /// The name of the category, used in debug output.
    fn name(&self) -> &'static str;

    /// Resolves `code` into a human-readable message.
    fn message(&self, code: i64) -> Cow<'static, str>;
}

impl std::fmt::Debug for dyn ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ErrorCategory({})", self.name())
    }
}

/// Messages from the operating system's error table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixErrorCategory;

impl ErrorCategory for PosixErrorCategory {
    fn name(&self) -> &'static str {
        "posix"
    }

    fn message(&self, code: i64) -> Cow<'static, str> {
        match i32::try_from(code) {
            Ok(raw) => Cow::Owned(std::io::Error::from_raw_os_error(raw).to_string()),
            Err(_) => Cow::Owned(format!("unknown os error {}", code)),
        }
    }
}

/// Recoverable failures of containers and allocators.
#[repr(i64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerErrorCode {
    /// An index was not within the live elements.
    IndexOutOfBounds = 1,
    /// A span of indices was not within the live elements.
    InvalidRange = 2,
    /// The requested capacity cannot be represented.
    CapacityOverflow = 3,
    /// The allocator could not satisfy a request.
    AllocationFailed = 4,
}

impl ContainerErrorCode {
    /// Maps a raw code back into a `ContainerErrorCode`.
    #[inline]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::IndexOutOfBounds),
            2 => Some(Self::InvalidRange),
            3 => Some(Self::CapacityOverflow),
            4 => Some(Self::AllocationFailed),
            _ => None,
        }
    }

    /// The static message of this code.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IndexOutOfBounds => "index out of bounds",
            Self::InvalidRange => "range out of bounds",
            Self::CapacityOverflow => "capacity overflow",
            Self::AllocationFailed => "allocation failed",
        }
    }
}

impl std::fmt::Display for ContainerErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ContainerErrorCode> for Error {
    #[inline]
    fn from(code: ContainerErrorCode) -> Self {
        Error::new(code as i64, &CONTAINER_CATEGORY)
    }
}

/// Category of `ContainerErrorCode`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerErrorCategory;

impl ErrorCategory for ContainerErrorCategory {
    fn name(&self) -> &'static str {
        "container"
    }

    fn message(&self, code: i64) -> Cow<'static, str> {
        match ContainerErrorCode::from_code(code) {
            Some(code) => Cow::Borrowed(code.as_str()),
            None => Cow::Owned(format!("unknown container error {}", code)),
        }
    }
}

/// Fallback category for codes without a dedicated resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericErrorCategory;

impl ErrorCategory for GenericErrorCategory {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn message(&self, code: i64) -> Cow<'static, str> {
        Cow::Owned(format!("error code {}", code))
    }
}

pub static POSIX_CATEGORY: PosixErrorCategory = PosixErrorCategory;
pub static CONTAINER_CATEGORY: ContainerErrorCategory = ContainerErrorCategory;
pub static GENERIC_CATEGORY: GenericErrorCategory = GenericErrorCategory;

/// A recoverable error: a code and the category able to describe it.
#[derive(Clone, Copy)]
pub struct Error {
    code: i64,
    category: &'static dyn ErrorCategory,
}

impl Error {
    /// Creates an error from a code and its category.
    #[inline(always)]
    pub const fn new(code: i64, category: &'static dyn ErrorCategory) -> Self {
        Self { code, category }
    }

    /// Creates an error in the operating-system category.
    #[inline]
    pub fn from_os(code: i64) -> Self {
        Self::new(code, &POSIX_CATEGORY)
    }

    /// The error code.
    #[inline(always)]
    pub const fn code(&self) -> i64 {
        self.code
    }

    /// The category that resolves the code.
    #[inline(always)]
    pub const fn category(&self) -> &'static dyn ErrorCategory {
        self.category
    }

    /// Resolves the message for this error. This is the only place a message
    /// is built.
    #[inline]
    pub fn message(&self) -> Cow<'static, str> {
        self.category.message(self.code)
    }

    /// Returns `true` if the error belongs to `category`.
    ///
    /// Categories are compared by name. The built-in categories are
    /// zero-sized, so their statics may share an address.
    #[inline]
    pub fn is_category(&self, category: &dyn ErrorCategory) -> bool {
        self.category.name() == category.name()
    }

    /// Returns the container error code, if this is a container error.
    #[inline]
    pub fn container_code(&self) -> Option<ContainerErrorCode> {
        if self.is_category(&CONTAINER_CATEGORY) {
            ContainerErrorCode::from_code(self.code)
        } else {
            None
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.category.name() == other.category.name()
    }
}

impl Eq for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {:#x}: {}", self.code, self.message())
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Error: [error_code: {:#x}, category: {}, error_message: {}]",
            self.code,
            self.category.name(),
            self.message()
        )
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        match e.raw_os_error() {
            Some(raw) => Error::from_os(raw as i64),
            None => Error::new(e.kind() as i64, &GENERIC_CATEGORY),
        }
    }
}
