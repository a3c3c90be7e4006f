//! Native primitives built on foreign terms.
//!
//! Every primitive is produced by a factory function, so there is no shared
//! mutable state between call sites. The registry at the bottom of this
//! module records each primitive's name and arity for lookup by name.
//!
//! ## Booleans
//!
//! There is no boolean type. Comparisons return Church booleans: `K` for
//! true and `K I` for false. [`if_then`] consumes them:
//!
//! ```
//! use skirt::primitives::{greater, if_then};
//! use skirt::{Reducer, Term};
//!
//! let mut reducer = Reducer::new();
//! let cond = reducer.apply_all(&greater(), [Term::from(2.0), Term::from(1.0)])?;
//! let picked = reducer.apply_all(&if_then(), [cond, Term::from("yes"), Term::from("no")])?;
//! assert_eq!(picked, Term::from("yes"));
//! # Ok::<(), skirt::Error>(())
//! ```
//!
//! ## Laziness
//!
//! Reduction is strict: arguments are reduced before a primitive sees them.
//! Branches and recursive calls that must not run eagerly are passed as
//! thunks, terms that do their work only when applied to `I` (for instance
//! `K v`, or a foreign closure ignoring its argument). `if_then` applies the
//! selected branch to `I`, which forces a thunk and leaves plain values alone.
//!
//! ## Error Handling
//!
//! Arithmetic and comparison primitives require `F64` payloads and never
//! coerce. Anything else is an [`Error::PayloadMismatch`] naming the
//! primitive and the argument position.

use crate::Error;
use crate::reducer::foreign::{curried, foreign_fn};
use crate::term::{I, Payload, PayloadKind, Term};

/// Prints the display form of its argument and returns a fresh `print`, so
/// `print x y z` prints x, y and z in order.
pub fn print() -> Term {
    Term::foreign("print", |arg, reducer| {
        reducer.emit(&arg.to_string())?;
        Ok(print())
    })
}

/// Fixed-point combinator.
///
/// `recurse f` reduces to `f (recurse f)`, where the inner `recurse f` is a
/// foreign closure that unrolls one more level only when it is applied. The
/// deferral is what keeps this finite under strict reduction; `f` decides
/// whether to apply its self-reference again.
pub fn recurse() -> Term {
    Term::foreign("recurse", |f, reducer| {
        let deferred = unroll(f.clone());
        reducer.apply(&f, deferred)
    })
}

fn unroll(f: Term) -> Term {
    Term::foreign("recurse", move |v, reducer| {
        let fixed = reducer.apply(&recurse(), f.clone())?;
        reducer.apply(&fixed, v)
    })
}

/// `If c x y = c x y I`: the Church boolean picks a branch, and the trailing
/// `I` forces it.
///
/// The `cond I x y I` form is not used: with `cond = K` it selects `y`, and
/// `If K yes no` must be `yes`.
pub fn if_then() -> Term {
    curried("if", 3, |args, reducer| {
        let got = args.len();
        let Ok([cond, x, y]) = <[Term; 3]>::try_from(args) else {
            return Err(Error::ArityError { expected: 3, got });
        };
        reducer.apply_all(&cond, [x, y, I])
    })
}

//
// Typed primitive implementations
//

fn subtract(x: f64, y: f64) -> f64 {
    x - y
}

fn multiply(x: f64, y: f64) -> f64 {
    x * y
}

fn divide(x: f64, y: f64) -> f64 {
    x / y
}

fn negation(x: f64) -> f64 {
    -x
}

// Macro to generate f64 comparison functions returning Church booleans
macro_rules! f64_comparison {
    ($name:ident, $op:tt) => {
        fn $name(x: f64, y: f64) -> bool {
            x $op y
        }
    };
}

f64_comparison!(is_greater, >);
f64_comparison!(is_less, <);
f64_comparison!(is_greater_eq, >=);
f64_comparison!(is_less_eq, <=);

// Numbers add, strings concatenate; mixing the two is a mismatch.
fn addition(x: Term, y: Term) -> Result<Term, Error> {
    match (x.data(), y.data()) {
        (Payload::F64(a), Payload::F64(b)) => Ok(Term::F64(a + b)),
        (Payload::Str(a), Payload::Str(b)) => Ok(Term::Str(format!("{a}{b}"))),
        (Payload::F64(_), other) => {
            Err(Error::payload_mismatch(PayloadKind::F64, other.kind()).in_primitive("add", 2))
        }
        (Payload::Str(_), other) => {
            Err(Error::payload_mismatch(PayloadKind::Str, other.kind()).in_primitive("add", 2))
        }
        (other, _) => {
            Err(Error::payload_mismatch(PayloadKind::F64, other.kind()).in_primitive("add", 1))
        }
    }
}

fn structural_eq(x: Term, y: Term) -> bool {
    x == y
}

/// `sub x y = x - y` on `F64` payloads
pub fn sub() -> Term {
    foreign_fn("sub", subtract)
}

/// `mul x y = x * y` on `F64` payloads
pub fn mul() -> Term {
    foreign_fn("mul", multiply)
}

/// `div x y = x / y` on `F64` payloads, with IEEE semantics for zero
pub fn div() -> Term {
    foreign_fn("div", divide)
}

/// `add x y`: `F64` sum or `Str` concatenation
pub fn add() -> Term {
    foreign_fn("add", addition)
}

pub fn negate() -> Term {
    foreign_fn("negate", negation)
}

/// `greater x y` is `K` when `x > y`, else `K I`
pub fn greater() -> Term {
    foreign_fn("greater", is_greater)
}

pub fn greater_eq() -> Term {
    foreign_fn("greatereq", is_greater_eq)
}

pub fn less() -> Term {
    foreign_fn("less", is_less)
}

pub fn less_eq() -> Term {
    foreign_fn("lesseq", is_less_eq)
}

/// Structural equality of any two terms, as a Church boolean
pub fn equal() -> Term {
    foreign_fn("eq", structural_eq)
}

/// Definition of a registered primitive
#[derive(Debug, Clone, Copy)]
pub struct Primitive {
    /// Display and lookup name
    pub name: &'static str,
    /// Arguments consumed before the primitive acts
    pub arity: usize,
    make: fn() -> Term,
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        // Primitives are uniquely identified by name
        self.name == other.name
    }
}

impl Primitive {
    /// Construct a fresh instance of this primitive
    pub fn make(&self) -> Term {
        (self.make)()
    }
}

/// Registry of all native primitives
static PRIMITIVES: &[Primitive] = &[
    // Effects and control
    Primitive {
        name: "print",
        arity: 1,
        make: print,
    },
    Primitive {
        name: "recurse",
        arity: 1,
        make: recurse,
    },
    Primitive {
        name: "if",
        arity: 3,
        make: if_then,
    },
    // Arithmetic
    Primitive {
        name: "add",
        arity: 2,
        make: add,
    },
    Primitive {
        name: "sub",
        arity: 2,
        make: sub,
    },
    Primitive {
        name: "mul",
        arity: 2,
        make: mul,
    },
    Primitive {
        name: "div",
        arity: 2,
        make: div,
    },
    Primitive {
        name: "negate",
        arity: 1,
        make: negate,
    },
    // Comparison
    Primitive {
        name: "greater",
        arity: 2,
        make: greater,
    },
    Primitive {
        name: "greatereq",
        arity: 2,
        make: greater_eq,
    },
    Primitive {
        name: "less",
        arity: 2,
        make: less,
    },
    Primitive {
        name: "lesseq",
        arity: 2,
        make: less_eq,
    },
    Primitive {
        name: "eq",
        arity: 2,
        make: equal,
    },
];

pub fn get_primitives() -> &'static [Primitive] {
    PRIMITIVES
}

pub fn find_primitive(name: &str) -> Option<&'static Primitive> {
    PRIMITIVES.iter().find(|p| p.name == name)
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::Reducer;
    use crate::term::{K, S, church, sym, table, val};

    /// Invoke a primitive through the registry with a fresh reducer
    fn call_primitive(name: &str, args: Vec<Term>) -> Result<Term, Error> {
        let primitive = find_primitive(name).unwrap();
        Reducer::new().apply_all(&primitive.make(), args)
    }

    fn mismatch(expected: PayloadKind, found: PayloadKind, name: &str, position: usize) -> Error {
        Error::PayloadMismatch {
            expected,
            found,
            primitive: Some((name.to_owned(), position)),
        }
    }

    #[test]
    fn test_registry() {
        for primitive in get_primitives() {
            // every factory produces a foreign term displayed under its name
            let term = primitive.make();
            assert_eq!(term.to_string(), primitive.name);
            assert!(matches!(term, Term::Foreign { .. }));
            assert_eq!(find_primitive(primitive.name), Some(primitive));
        }
        assert_eq!(find_primitive("if").unwrap().arity, 3);
        assert_eq!(find_primitive("sub").unwrap().arity, 2);
        assert!(find_primitive("unknown").is_none());
    }

    #[test]
    fn test_primitive_implementations() {
        use PayloadKind::{F64, I32, List, Str};

        type TestCase = (&'static str, Vec<Term>, Result<Term, Error>);

        let test_cases: Vec<TestCase> = vec![
            // =================================================================
            // ARITHMETIC
            // =================================================================
            ("sub", vec![val(5.0), val(3.0)], Ok(val(2.0))),
            ("sub", vec![val(3.0), val(5.0)], Ok(val(-2.0))),
            ("mul", vec![val(2.0), val(4.0)], Ok(val(8.0))),
            ("mul", vec![val(-1.5), val(2.0)], Ok(val(-3.0))),
            ("div", vec![val(9.0), val(2.0)], Ok(val(4.5))),
            ("div", vec![val(1.0), val(0.0)], Ok(val(f64::INFINITY))),
            ("add", vec![val(0.5), val(0.25)], Ok(val(0.75))),
            ("add", vec![val("foo"), val("bar")], Ok(val("foobar"))),
            ("negate", vec![val(4.0)], Ok(val(-4.0))),
            // partial application waits for more arguments
            ("sub", vec![val(5.0)], Ok(sub())),
            // =================================================================
            // COMPARISON
            // =================================================================
            ("greater", vec![val(5.0), val(3.0)], Ok(K)),
            ("greater", vec![val(1.0), val(3.0)], Ok(church(false))),
            ("greater", vec![val(3.0), val(3.0)], Ok(church(false))),
            ("greatereq", vec![val(3.0), val(3.0)], Ok(K)),
            ("less", vec![val(1.0), val(3.0)], Ok(K)),
            ("less", vec![val(3.0), val(1.0)], Ok(church(false))),
            ("lesseq", vec![val(3.0), val(3.0)], Ok(K)),
            ("eq", vec![val("a"), val("a")], Ok(K)),
            ("eq", vec![val(1), val(1.0)], Ok(church(false))),
            ("eq", vec![val([1, 2]), val([1, 2])], Ok(K)),
            ("eq", vec![S, S], Ok(K)),
            // =================================================================
            // CONDITIONAL
            // =================================================================
            ("if", vec![K, val("yes"), val("no")], Ok(val("yes"))),
            ("if", vec![church(false), val("yes"), val("no")], Ok(val("no"))),
            // thunked branches are forced
            (
                "if",
                vec![K, K.apply(val("yes")).unwrap(), K.apply(val("no")).unwrap()],
                Ok(val("yes")),
            ),
            (
                "if",
                vec![church(false), K.apply(sym("a")).unwrap(), K.apply(sym("b")).unwrap()],
                Ok(sym("b")),
            ),
            // =================================================================
            // PAYLOAD MISMATCHES
            // =================================================================
            ("sub", vec![val("5"), val(3.0)], Err(mismatch(F64, Str, "sub", 1))),
            ("sub", vec![val(5.0), val(3)], Err(mismatch(F64, I32, "sub", 2))),
            ("mul", vec![K, val(3.0)], Err(mismatch(F64, PayloadKind::None, "mul", 1))),
            ("mul", vec![val(1.0), sym("x")], Err(mismatch(F64, PayloadKind::None, "mul", 2))),
            ("greater", vec![val([1]), val(0.0)], Err(mismatch(F64, List, "greater", 1))),
            ("greater", vec![val(1.0), print()], Err(mismatch(F64, PayloadKind::None, "greater", 2))),
            ("negate", vec![val("x")], Err(mismatch(F64, Str, "negate", 1))),
            ("add", vec![val(1.0), val("x")], Err(mismatch(F64, Str, "add", 2))),
            ("add", vec![val("x"), val(1.0)], Err(mismatch(Str, F64, "add", 2))),
            ("add", vec![val(1), val(1)], Err(mismatch(F64, I32, "add", 1))),
            (
                "add",
                vec![table([("k", 1)]), val(1.0)],
                Err(mismatch(F64, PayloadKind::Table, "add", 1)),
            ),
        ];

        for (i, (name, args, expected)) in test_cases.into_iter().enumerate() {
            let rendered: Vec<String> = args.iter().map(|a| format!("{a:?}")).collect();
            let actual = call_primitive(name, args);
            assert_eq!(
                actual,
                expected,
                "Test case {} failed: {name} {}",
                i + 1,
                rendered.join(" ")
            );
        }
    }

    #[test]
    fn test_print_threads_arguments_in_order() {
        let mut reducer = Reducer::capturing();
        let result = reducer
            .apply_all(&print(), vec![val("x="), val(1.5), val(" "), sym("f")])
            .unwrap();
        assert_eq!(result, print());
        assert_eq!(reducer.captured(), Some("x=1.5 f"));

        // S (K print) I x = print x
        let mut reducer = Reducer::capturing();
        let k_print = reducer.apply(&K, print()).unwrap();
        reducer
            .apply_all(&S, vec![k_print, I, val("via S")])
            .unwrap();
        assert_eq!(reducer.captured(), Some("via S"));
    }

    #[test]
    fn test_print_renders_collections() {
        let mut reducer = Reducer::capturing();
        reducer
            .apply_all(
                &print(),
                vec![val([val(1), val("a")]), table([("k", val(2.0))])],
            )
            .unwrap();
        assert_eq!(reducer.captured(), Some("[ 1 a ]{ \"k\":2 }"));
    }

    #[test]
    fn test_recurse_is_a_fixed_point() {
        // recurse (K x) = K x (recurse (K x)) = x
        let x = sym("x");
        let k_x = K.apply(x.clone()).unwrap();
        assert_eq!(recurse().apply(k_x).unwrap(), x);

        // recurse f = f (recurse f), observed symbolically
        let unrolled = recurse().apply(sym("f")).unwrap();
        assert_eq!(unrolled.to_string(), "f(recurse)");
    }

    #[test]
    fn test_recurse_unrolls_lazily() {
        // the body hides its self-reference behind K, so nothing unrolls
        // until the caller applies it
        let body = Term::foreign("count", |this, reducer| {
            reducer.emit("unrolled ")?;
            reducer.apply(&K, this)
        });
        let mut reducer = Reducer::capturing();
        let held = reducer.apply(&recurse(), body).unwrap();
        assert_eq!(reducer.captured(), Some("unrolled "));

        let this = reducer.apply(&held, I).unwrap();
        assert_eq!(this.to_string(), "recurse");
        assert_eq!(reducer.captured(), Some("unrolled "));

        let again = reducer.apply(&this, I).unwrap();
        assert_eq!(again.to_string(), "recurse");
        assert_eq!(reducer.captured(), Some("unrolled unrolled "));
    }
}
