//! This module defines the core term type and helper functions for building
//! combinator expressions. The main enum, [`Term`], covers the combinators of
//! the calculus (S, K, I and the B/C supplements), the terminal value variants
//! that carry host payloads (tables, lists, strings, integers, floats), foreign
//! host functions, and uninterpreted symbols. Payloads are exposed through the
//! closed [`Payload`] union; conversion traits go both ways, with the fallible
//! direction reporting a [`PayloadKind`] mismatch instead of coercing.

use crate::Error;
use crate::reducer::{ForeignFn, Reducer};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Arguments captured by a two-slot combinator (S, B, C).
///
/// A second slot is only ever filled after the first, so the states form a
/// chain: `Empty` -> `One` -> `Two`. A third argument does not extend the
/// chain; it fires the combinator's rewrite rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Partial {
    Empty,
    One(Arc<Term>),
    Two(Arc<Term>, Arc<Term>),
}

/// Result of feeding one more argument to a [`Partial`]
pub(crate) enum Saturation {
    /// Still waiting for arguments
    Waiting(Partial),
    /// All three arguments present: the rewrite rule must fire
    Ready(Arc<Term>, Arc<Term>, Term),
}

impl Partial {
    pub(crate) fn accept(&self, arg: Term) -> Saturation {
        match self {
            Partial::Empty => Saturation::Waiting(Partial::One(Arc::new(arg))),
            Partial::One(x) => Saturation::Waiting(Partial::Two(x.clone(), Arc::new(arg))),
            Partial::Two(x, y) => Saturation::Ready(x.clone(), y.clone(), arg),
        }
    }

    /// Number of captured arguments
    pub fn len(&self) -> usize {
        match self {
            Partial::Empty => 0,
            Partial::One(_) => 1,
            Partial::Two(..) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Partial::Empty)
    }
}

/// Core term type
///
/// Terms are immutable: applying a partially applied combinator returns a new
/// node with one more slot filled and leaves the original untouched, so a
/// term can be reused as the head of any number of applications.
///
/// To build terms, use the constants [`S`], [`K`], [`I`], [`B`], [`C`] and the
/// helper functions:
/// - `val(2.5)`, `val(7)`, `val("text")` for payload values
/// - `sym("f")` for uninterpreted symbols
/// - `Term::foreign("name", |arg, reducer| ...)` for host functions
#[derive(Clone)]
pub enum Term {
    /// S x y z = x z (y z)
    Substitution(Partial),
    /// B x y z = x (y z)
    Compose(Partial),
    /// C x y z = x z y
    Flip(Partial),
    /// K x y = x
    Constant(Option<Arc<Term>>),
    /// I x = x
    Identity,
    /// String-keyed mapping, inspected only through its payload
    Table(BTreeMap<String, Term>),
    /// Ordered sequence, inspected only through its payload
    List(Vec<Term>),
    Str(String),
    I32(i32),
    F64(f64),
    /// Host function; applying the term invokes it
    Foreign {
        name: Arc<str>,
        function: Arc<ForeignFn>,
    },
    /// Uninterpreted head that collects the arguments applied to it
    Symbol { name: String, args: Vec<Term> },
}

pub const S: Term = Term::Substitution(Partial::Empty);
pub const B: Term = Term::Compose(Partial::Empty);
pub const C: Term = Term::Flip(Partial::Empty);
pub const K: Term = Term::Constant(None);
pub const I: Term = Term::Identity;

/// Host-level payload of a term, borrowed from it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload<'a> {
    F64(f64),
    I32(i32),
    Str(&'a str),
    Table(&'a BTreeMap<String, Term>),
    List(&'a [Term]),
    /// Combinators, foreign functions and symbols carry no payload
    None,
}

/// Tag of a [`Payload`], used when reporting mismatches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    F64,
    I32,
    Str,
    Table,
    List,
    None,
}

impl Payload<'_> {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::F64(_) => PayloadKind::F64,
            Payload::I32(_) => PayloadKind::I32,
            Payload::Str(_) => PayloadKind::Str,
            Payload::Table(_) => PayloadKind::Table,
            Payload::List(_) => PayloadKind::List,
            Payload::None => PayloadKind::None,
        }
    }
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PayloadKind::F64 => "f64",
            PayloadKind::I32 => "i32",
            PayloadKind::Str => "string",
            PayloadKind::Table => "table",
            PayloadKind::List => "list",
            PayloadKind::None => "none",
        };
        write!(f, "{name}")
    }
}

impl Term {
    /// Apply this term to an argument using a fresh, unbounded [`Reducer`]
    /// that prints to stdout.
    ///
    /// Host functions must not call this on nested terms; they receive the
    /// active reducer and should use [`Reducer::apply`] so limits and output
    /// capture stay in effect.
    pub fn apply(&self, arg: Term) -> Result<Term, Error> {
        Reducer::new().apply(self, arg)
    }

    /// Expose the host payload of this term, if any
    pub fn data(&self) -> Payload<'_> {
        match self {
            Term::F64(n) => Payload::F64(*n),
            Term::I32(n) => Payload::I32(*n),
            Term::Str(s) => Payload::Str(s),
            Term::Table(t) => Payload::Table(t),
            Term::List(l) => Payload::List(l),
            Term::Substitution(_)
            | Term::Compose(_)
            | Term::Flip(_)
            | Term::Constant(_)
            | Term::Identity
            | Term::Foreign { .. }
            | Term::Symbol { .. } => Payload::None,
        }
    }

    /// Wrap a host function as a term under a display name
    pub fn foreign<F>(name: impl Into<Arc<str>>, function: F) -> Term
    where
        F: Fn(Term, &mut Reducer) -> Result<Term, Error> + Send + Sync + 'static,
    {
        Term::Foreign {
            name: name.into(),
            function: Arc::new(function),
        }
    }

    /// Create an uninterpreted symbol with no arguments
    pub fn symbol(name: impl Into<String>) -> Term {
        Term::Symbol {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Check if this term is a terminal value (applying it is a no-op)
    pub fn is_value(&self) -> bool {
        !matches!(self.data(), Payload::None)
    }

    /// Decode a Church boolean: `K` is true, `K I` is false
    pub fn as_church(&self) -> Option<bool> {
        match self {
            Term::Constant(None) => Some(true),
            Term::Constant(Some(x)) if matches!(**x, Term::Identity) => Some(false),
            _ => None,
        }
    }
}

/// Church boolean: `K` for true, `K I` for false
pub fn church(b: bool) -> Term {
    if b {
        K
    } else {
        Term::Constant(Some(Arc::new(I)))
    }
}

/// Helper function for creating symbols
pub fn sym<N: AsRef<str>>(name: N) -> Term {
    Term::symbol(name.as_ref())
}

/// Helper function for creating terms from anything convertible
pub fn val<T: Into<Term>>(value: T) -> Term {
    value.into()
}

/// Helper function for creating tables from key/value pairs
pub fn table<Key, V>(entries: impl IntoIterator<Item = (Key, V)>) -> Term
where
    Key: Into<String>,
    V: Into<Term>,
{
    Term::Table(
        entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    )
}

// From trait implementations for Term - enables .into() conversion
impl From<f64> for Term {
    fn from(n: f64) -> Self {
        Term::F64(n)
    }
}

impl From<i32> for Term {
    fn from(n: i32) -> Self {
        Term::I32(n)
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Str(s.to_owned())
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::Str(s)
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        church(b)
    }
}

impl From<BTreeMap<String, Term>> for Term {
    fn from(t: BTreeMap<String, Term>) -> Self {
        Term::Table(t)
    }
}

impl<T: Into<Term>> From<Vec<T>> for Term {
    fn from(v: Vec<T>) -> Self {
        Term::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Term>, const N: usize> From<[T; N]> for Term {
    fn from(arr: [T; N]) -> Self {
        Term::List(arr.into_iter().map(Into::into).collect())
    }
}

// Fallible conversions from `Term` back into host types. None of them coerce.

impl TryFrom<Term> for f64 {
    type Error = Error;

    fn try_from(term: Term) -> Result<f64, Error> {
        match term.data() {
            Payload::F64(n) => Ok(n),
            other => Err(Error::payload_mismatch(PayloadKind::F64, other.kind())),
        }
    }
}

impl TryFrom<Term> for i32 {
    type Error = Error;

    fn try_from(term: Term) -> Result<i32, Error> {
        match term.data() {
            Payload::I32(n) => Ok(n),
            other => Err(Error::payload_mismatch(PayloadKind::I32, other.kind())),
        }
    }
}

impl TryFrom<Term> for String {
    type Error = Error;

    fn try_from(term: Term) -> Result<String, Error> {
        match term {
            Term::Str(s) => Ok(s),
            other => Err(Error::payload_mismatch(
                PayloadKind::Str,
                other.data().kind(),
            )),
        }
    }
}

impl TryFrom<Term> for Vec<Term> {
    type Error = Error;

    fn try_from(term: Term) -> Result<Vec<Term>, Error> {
        match term {
            Term::List(l) => Ok(l),
            other => Err(Error::payload_mismatch(
                PayloadKind::List,
                other.data().kind(),
            )),
        }
    }
}

impl TryFrom<Term> for BTreeMap<String, Term> {
    type Error = Error;

    fn try_from(term: Term) -> Result<BTreeMap<String, Term>, Error> {
        match term {
            Term::Table(t) => Ok(t),
            other => Err(Error::payload_mismatch(
                PayloadKind::Table,
                other.data().kind(),
            )),
        }
    }
}

fn fmt_partial(
    f: &mut std::fmt::Formatter<'_>,
    head: &str,
    partial: &Partial,
    debug: bool,
) -> std::fmt::Result {
    fn arg(f: &mut std::fmt::Formatter<'_>, x: &Term, debug: bool) -> std::fmt::Result {
        if debug {
            write!(f, "({x:?})")
        } else {
            write!(f, "({x})")
        }
    }

    write!(f, "{head}")?;
    match partial {
        Partial::Empty => Ok(()),
        Partial::One(x) => arg(f, x, debug),
        Partial::Two(x, y) => {
            arg(f, x, debug)?;
            arg(f, y, debug)
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Substitution(p) => fmt_partial(f, "S", p, false),
            Term::Compose(p) => fmt_partial(f, "B", p, false),
            Term::Flip(p) => fmt_partial(f, "C", p, false),
            Term::Constant(None) => write!(f, "K"),
            Term::Constant(Some(x)) => write!(f, "K({x})"),
            Term::Identity => write!(f, "I"),
            Term::Table(t) => {
                write!(f, "{{ ")?;
                for (k, v) in t {
                    write!(f, "\"{k}\":{v} ")?;
                }
                write!(f, "}}")
            }
            Term::List(l) => {
                write!(f, "[ ")?;
                for item in l {
                    write!(f, "{item} ")?;
                }
                write!(f, "]")
            }
            Term::Str(s) => write!(f, "{s}"),
            Term::I32(n) => write!(f, "{n}"),
            Term::F64(n) => write!(f, "{n}"),
            Term::Foreign { name, .. } => write!(f, "{name}"),
            Term::Symbol { name, args } => {
                write!(f, "{name}")?;
                for arg in args {
                    write!(f, "({arg})")?;
                }
                Ok(())
            }
        }
    }
}

// Same shape as Display, but strings are quoted and floats keep their decimal
// point so that `F64(2.0)`, `I32(2)` and `Str("2")` are distinguishable.
impl std::fmt::Debug for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Substitution(p) => fmt_partial(f, "S", p, true),
            Term::Compose(p) => fmt_partial(f, "B", p, true),
            Term::Flip(p) => fmt_partial(f, "C", p, true),
            Term::Constant(None) => write!(f, "K"),
            Term::Constant(Some(x)) => write!(f, "K({x:?})"),
            Term::Identity => write!(f, "I"),
            Term::Table(t) => {
                write!(f, "{{ ")?;
                for (k, v) in t {
                    write!(f, "{k:?}:{v:?} ")?;
                }
                write!(f, "}}")
            }
            Term::List(l) => {
                write!(f, "[ ")?;
                for item in l {
                    write!(f, "{item:?} ")?;
                }
                write!(f, "]")
            }
            Term::Str(s) => write!(f, "{s:?}"),
            Term::I32(n) => write!(f, "{n}i32"),
            Term::F64(n) => write!(f, "{n:?}"),
            Term::Foreign { name, .. } => write!(f, "{name}"),
            Term::Symbol { name, args } => {
                write!(f, "{name}")?;
                for arg in args {
                    write!(f, "({arg:?})")?;
                }
                Ok(())
            }
        }
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Term::Substitution(a), Term::Substitution(b)) => a == b,
            (Term::Compose(a), Term::Compose(b)) => a == b,
            (Term::Flip(a), Term::Flip(b)) => a == b,
            (Term::Constant(a), Term::Constant(b)) => a == b,
            (Term::Identity, Term::Identity) => true,
            (Term::Table(a), Term::Table(b)) => a == b,
            (Term::List(a), Term::List(b)) => a == b,
            (Term::Str(a), Term::Str(b)) => a == b,
            (Term::I32(a), Term::I32(b)) => a == b,
            (Term::F64(a), Term::F64(b)) => a == b,
            // Compare foreign functions by name, not function pointer
            (Term::Foreign { name: a, .. }, Term::Foreign { name: b, .. }) => a == b,
            (
                Term::Symbol {
                    name: n1,
                    args: a1,
                },
                Term::Symbol {
                    name: n2,
                    args: a2,
                },
            ) => n1 == n2 && a1 == a2,
            _ => false, // Different variants are never equal
        }
    }
}
