//! Lambda expressions and their compilation to combinators.
//!
//! Writing combinator programs by hand is impractical, so programs are built
//! as [`Lambda`] trees in Rust code and compiled by bracket abstraction:
//!
//! - `λx.x` becomes `I`
//! - `λx.f x` becomes `f` when `f` is an atom that does not mention `x`
//! - `λx.A B` becomes `S (λx.A) (λx.B)`
//! - `λx.a` becomes `K a` for any other atom
//!
//! There is no `K (A B)` rule for applications that do not
//! mention `x`. Building a term applies it, so such a rule would run `A B`
//! at compile time instead of when the abstraction is applied.
//!
//! ```
//! use skirt::primitives::mul;
//! use skirt::{Lambda, Term};
//!
//! // λn. mul n n
//! let n = Lambda::var("n");
//! let square = Lambda::lambda("n", Lambda::from(mul()).applied_to(n.clone()).applied_to(n));
//! let square = square.to_combinator()?;
//! assert_eq!(square.apply(Term::from(7.0))?, Term::from(49.0));
//! # Ok::<(), skirt::Error>(())
//! ```

use crate::Error;
use crate::reducer::Reducer;
use crate::term::{I, K, S, Term};
use log::debug;

/// Lambda expression over embedded terms
#[derive(Debug, Clone, PartialEq)]
pub enum Lambda {
    Application(Box<Lambda>, Box<Lambda>),
    Abstraction(String, Box<Lambda>),
    Binding(String),
    /// Embedded term: a combinator, primitive or value
    Combinator(Term),
}

impl Lambda {
    /// Reference to a bound variable
    pub fn var(name: impl Into<String>) -> Self {
        Lambda::Binding(name.into())
    }

    /// `λparam.body`
    pub fn lambda(param: impl Into<String>, body: impl Into<Lambda>) -> Self {
        Lambda::Abstraction(param.into(), Box::new(body.into()))
    }

    #[must_use]
    pub fn applied_to(self, arg: impl Into<Lambda>) -> Self {
        Lambda::Application(Box::new(self), Box::new(arg.into()))
    }

    /// Compile to a term, reducing any top-level applications with a fresh
    /// reducer.
    pub fn to_combinator(&self) -> Result<Term, Error> {
        self.to_combinator_in(&mut Reducer::new())
    }

    /// Compile to a term, reducing top-level applications with `reducer` so
    /// its limits and output apply.
    ///
    /// Free variables are reported before anything is reduced.
    pub fn to_combinator_in(&self, reducer: &mut Reducer) -> Result<Term, Error> {
        let code = compile(self);
        if let Some(name) = code.free_variable() {
            return Err(Error::CompileError(format!(
                "free variable '{name}' is never bound"
            )));
        }
        let term = code.build(reducer)?;
        debug!("compiled {self} to {term}");
        Ok(term)
    }
}

impl From<Term> for Lambda {
    fn from(term: Term) -> Self {
        Lambda::Combinator(term)
    }
}

impl std::fmt::Display for Lambda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lambda::Application(a, b) => write!(f, "({a})({b})"),
            Lambda::Abstraction(x, body) => write!(f, "λ{x}.{body}"),
            Lambda::Binding(x) => write!(f, "{x}"),
            Lambda::Combinator(t) => write!(f, "{t}"),
        }
    }
}

/// Lambda-free intermediate form produced by bracket abstraction
enum Code {
    Var(String),
    Const(Term),
    App(Box<Code>, Box<Code>),
}

fn app(a: Code, b: Code) -> Code {
    Code::App(Box::new(a), Box::new(b))
}

impl Code {
    fn mentions(&self, x: &str) -> bool {
        match self {
            Code::Var(y) => y == x,
            Code::Const(_) => false,
            Code::App(a, b) => a.mentions(x) || b.mentions(x),
        }
    }

    fn free_variable(&self) -> Option<&str> {
        match self {
            Code::Var(x) => Some(x.as_str()),
            Code::Const(_) => None,
            Code::App(a, b) => a.free_variable().or_else(|| b.free_variable()),
        }
    }

    fn build(&self, reducer: &mut Reducer) -> Result<Term, Error> {
        match self {
            Code::Const(t) => Ok(t.clone()),
            Code::App(a, b) => {
                let head = a.build(reducer)?;
                let arg = b.build(reducer)?;
                reducer.apply(&head, arg)
            }
            Code::Var(x) => Err(Error::CompileError(format!(
                "free variable '{x}' is never bound"
            ))),
        }
    }
}

fn compile(lambda: &Lambda) -> Code {
    match lambda {
        Lambda::Application(a, b) => app(compile(a), compile(b)),
        Lambda::Abstraction(x, body) => abstract_out(x, compile(body)),
        Lambda::Binding(x) => Code::Var(x.clone()),
        Lambda::Combinator(t) => Code::Const(t.clone()),
    }
}

/// Eliminate `x` from `code`, yielding code equivalent to `λx.code`
fn abstract_out(x: &str, code: Code) -> Code {
    match code {
        Code::Var(y) if y == x => Code::Const(I),
        Code::App(a, b) => {
            let eta = matches!(&*b, Code::Var(y) if y == x)
                && matches!(&*a, Code::Var(_) | Code::Const(_))
                && !a.mentions(x);
            if eta {
                return *a;
            }
            app(
                app(Code::Const(S), abstract_out(x, *a)),
                abstract_out(x, *b),
            )
        }
        atom => app(Code::Const(K), atom),
    }
}
