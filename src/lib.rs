//! skirt - SKI combinator rewriting with foreign primitives
//!
//! This crate represents combinator terms as values and reduces the application
//! of one term to another with the fixed rewrite rules of combinatory logic. A
//! term that has not yet received enough arguments stays partially applied and
//! waits for more; there is no separate evaluation loop, application *is*
//! evaluation, one argument at a time.
//!
//! ```
//! use skirt::{I, K, S, Term};
//!
//! // S K K behaves as the identity combinator
//! let skk = S.apply(K)?.apply(K)?;
//! assert_eq!(skk.apply(Term::from(7))?, Term::from(7));
//! # Ok::<(), skirt::Error>(())
//! ```
//!
//! ## Foreign primitives
//!
//! Host-level functions are embedded as [`Term::Foreign`] values. They are
//! how printing, arithmetic, comparison, branching and recursion enter the
//! calculus:
//!
//! ```
//! use skirt::primitives::{greater, sub};
//! use skirt::{K, Term};
//!
//! let two = sub().apply(Term::from(5.0))?.apply(Term::from(3.0))?;
//! assert_eq!(two, Term::from(2.0));
//!
//! // booleans are plain combinators: K is true, K I is false
//! let yes = greater().apply(Term::from(5.0))?.apply(Term::from(3.0))?;
//! assert_eq!(yes, K);
//! # Ok::<(), skirt::Error>(())
//! ```
//!
//! ## Strict payloads
//!
//! Value variants expose their payload through [`Term::data`]. Primitives
//! never coerce: an `I32` handed to `sub` is a payload mismatch, as is any
//! combinator with no payload at all. Such mismatches surface as
//! [`Error::PayloadMismatch`] naming the primitive and argument position.
//!
//! ## Termination
//!
//! Combinatory logic is Turing-complete and reduction may diverge. By default
//! nothing stops it. [`reducer::ReduceConfig`] offers opt-in step and depth
//! limits as a debugging aid.
//!
//! ## Modules
//!
//! - `term`: the term model, payloads and rendering
//! - `lambda`: lambda expressions compiled to combinators by bracket abstraction
//! - `reducer`: rewrite rules, the reduction context and typed foreign adapters
//! - `primitives`: native primitives and their registry
//! - `json`: conversion between terms and JSON data (feature `json`)

use std::fmt;

/// Maximum nesting accepted when converting JSON documents into terms
#[cfg(feature = "json")]
pub const MAX_JSON_DEPTH: usize = 64;

/// Error types for reduction and payload extraction
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A payload of one kind was required but another (or none) was found
    PayloadMismatch {
        expected: term::PayloadKind,
        found: term::PayloadKind,
        /// Primitive and 1-based argument position, when known
        primitive: Option<(String, usize)>,
    },
    /// A typed foreign adapter received the wrong number of arguments
    ArityError { expected: usize, got: usize },
    /// A host function failed for a reason of its own
    ForeignError(String),
    /// The opt-in step limit was reached
    StepLimitExceeded(u64),
    /// The opt-in depth limit was reached
    DepthLimitExceeded(usize),
    /// Writing to the print sink failed
    OutputError(String),
    /// A term could not be converted to or from host data
    ConversionError(String),
    /// A lambda expression could not be compiled to combinators
    CompileError(String),
}

impl Error {
    /// Create a PayloadMismatch without primitive context
    pub fn payload_mismatch(expected: term::PayloadKind, found: term::PayloadKind) -> Self {
        Error::PayloadMismatch {
            expected,
            found,
            primitive: None,
        }
    }

    /// Attach the primitive name and argument position to a payload mismatch.
    ///
    /// Errors that already carry a primitive keep the innermost one, and other
    /// variants pass through unchanged.
    #[must_use]
    pub fn in_primitive(self, name: &str, position: usize) -> Self {
        match self {
            Error::PayloadMismatch {
                expected,
                found,
                primitive: None,
            } => Error::PayloadMismatch {
                expected,
                found,
                primitive: Some((name.to_owned(), position)),
            },
            other => other,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::PayloadMismatch {
                expected,
                found,
                primitive,
            } => {
                write!(f, "PayloadMismatch: expected {expected} payload, found {found}")?;
                if let Some((name, position)) = primitive {
                    write!(f, " (argument {position} of '{name}')")?;
                }
                Ok(())
            }
            Error::ArityError { expected, got } => write!(
                f,
                "ArityError: foreign function expected {expected} arguments but got {got}"
            ),
            Error::ForeignError(msg) => write!(f, "ForeignError: {msg}"),
            Error::StepLimitExceeded(limit) => {
                write!(f, "Reduction step limit exceeded (max: {limit})")
            }
            Error::DepthLimitExceeded(limit) => {
                write!(f, "Reduction depth limit exceeded (max: {limit})")
            }
            Error::OutputError(msg) => write!(f, "OutputError: {msg}"),
            Error::ConversionError(msg) => write!(f, "ConversionError: {msg}"),
            Error::CompileError(msg) => write!(f, "CompileError: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub mod lambda;
pub mod primitives;
pub mod reducer;
pub mod term;

#[cfg(feature = "json")]
pub mod json;

pub use lambda::Lambda;
pub use reducer::{Output, ReduceConfig, Reducer};
pub use term::{B, C, I, K, Partial, Payload, PayloadKind, S, Term};
