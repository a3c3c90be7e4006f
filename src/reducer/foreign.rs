use crate::Error;
use crate::reducer::Reducer;
use crate::term::Term;
use std::collections::BTreeMap;
use std::sync::Arc;

// NOTE: This module is the adapter layer that turns strongly-typed Rust
// functions into curried `Foreign` terms. A function of N parameters
// becomes a foreign term that collects N arguments one application at a
// time, converts them with `FromTerm`, and only then calls the function.
//
// Most callers only need `foreign_fn`; primitives that must apply terms
// or print build their `Foreign` directly with `Term::foreign`.

/// Body of a curried foreign function, called once all arguments arrived
pub(crate) type SaturatedFn =
    dyn Fn(Vec<Term>, &mut Reducer) -> Result<Term, Error> + Send + Sync;

/// Conversion of a single argument term into a typed parameter.
///
/// Implementations must not coerce between payload kinds: a mismatch is
/// reported as [`Error::PayloadMismatch`], which the adapter then tags with
/// the primitive name and argument position.
pub trait FromTerm: Sized {
    fn from_term(term: Term) -> Result<Self, Error>;
}

impl FromTerm for Term {
    fn from_term(term: Term) -> Result<Self, Error> {
        Ok(term)
    }
}

macro_rules! impl_from_term_via_try_from {
    ($( $t:ty ),+) => {
        $(
            impl FromTerm for $t {
                fn from_term(term: Term) -> Result<Self, Error> {
                    <$t>::try_from(term)
                }
            }
        )+
    };
}

impl_from_term_via_try_from!(f64, i32, String, Vec<Term>, BTreeMap<String, Term>);

/// Normalizes host function return types to `Result<Term, Error>`.
///
/// Host functions typically return either a plain value convertible into a
/// term (`f64`, `bool`, `String`, `Term`, ...) or a `Result` of one.
pub trait IntoTermResult {
    fn into_term_result(self) -> Result<Term, Error>;
}

impl<T> IntoTermResult for Result<T, Error>
where
    T: Into<Term>,
{
    fn into_term_result(self) -> Result<Term, Error> {
        self.map(Into::into)
    }
}

impl<T> IntoTermResult for T
where
    T: Into<Term>,
{
    fn into_term_result(self) -> Result<Term, Error> {
        Ok(self.into())
    }
}

/// Conversion of a strongly-typed Rust function or closure into a curried
/// foreign term, parameterized by its argument tuple type.
pub trait IntoForeign<Args> {
    fn into_foreign(self, name: &str) -> Term;
}

/// Wrap a typed Rust function as a curried foreign term.
///
/// ```
/// use skirt::reducer::foreign::foreign_fn;
/// use skirt::Term;
///
/// fn hypot(a: f64, b: f64) -> f64 {
///     a.hypot(b)
/// }
///
/// let h = foreign_fn("hypot", hypot);
/// let five = h.apply(Term::from(3.0))?.apply(Term::from(4.0))?;
/// assert_eq!(five, Term::from(5.0));
/// # Ok::<(), skirt::Error>(())
/// ```
pub fn foreign_fn<Args, F>(name: &str, function: F) -> Term
where
    F: IntoForeign<Args>,
{
    function.into_foreign(name)
}

/// Wrap an untyped host function that needs `arity` arguments and access to
/// the active reducer. The arguments arrive in application order.
pub fn curried<F>(name: &str, arity: usize, body: F) -> Term
where
    F: Fn(Vec<Term>, &mut Reducer) -> Result<Term, Error> + Send + Sync + 'static,
{
    curry(Arc::from(name), arity, Vec::new(), Arc::new(body))
}

/// Build a foreign term that accumulates `arity` arguments before calling
/// `body`. Partial applications keep the display name of the primitive.
pub(crate) fn curry(
    name: Arc<str>,
    arity: usize,
    collected: Vec<Term>,
    body: Arc<SaturatedFn>,
) -> Term {
    Term::foreign(name.clone(), move |arg, reducer| {
        let mut args = collected.clone();
        args.push(arg);
        if args.len() >= arity {
            body(args, reducer)
        } else {
            Ok(curry(name.clone(), arity, args, body.clone()))
        }
    })
}

/// Helper macro to implement `IntoForeign` for functions of various
/// arities.
///
/// The saturated body destructures the collected arguments into a fixed
/// array, converts each one with `FromTerm` (tagging failures with the
/// 1-based position), then invokes the function.
macro_rules! impl_into_foreign_for_arity {
    ($arity:expr, $( $pos:literal => $v:ident : $A:ident ),+ ) => {
        impl<F, R, $( $A ),+> IntoForeign<( $( $A, )+ )> for F
        where
            F: Fn( $( $A ),+ ) -> R + Send + Sync + 'static,
            $( $A: FromTerm, )+
            R: IntoTermResult,
        {
            fn into_foreign(self, name: &str) -> Term {
                let name: Arc<str> = Arc::from(name);
                let primitive = name.clone();
                let body: Arc<SaturatedFn> =
                    Arc::new(move |args: Vec<Term>, _reducer: &mut Reducer| {
                        let got = args.len();
                        let Ok([ $( $v ),+ ]) = <[Term; $arity]>::try_from(args) else {
                            return Err(Error::ArityError {
                                expected: $arity,
                                got,
                            });
                        };
                        $(
                            let $v = <$A as FromTerm>::from_term($v)
                                .map_err(|e| e.in_primitive(&primitive, $pos))?;
                        )+
                        (self)( $( $v ),+ ).into_term_result()
                    });
                curry(name, $arity, Vec::new(), body)
            }
        }
    };
}

impl_into_foreign_for_arity!(1, 1 => a0: A1);
impl_into_foreign_for_arity!(2, 1 => a0: A1, 2 => a1: A2);
impl_into_foreign_for_arity!(3, 1 => a0: A1, 2 => a1: A2, 3 => a2: A3);
impl_into_foreign_for_arity!(4, 1 => a0: A1, 2 => a1: A2, 3 => a2: A3, 4 => a3: A4);

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::term::{K, PayloadKind, church, sym, val};

    #[test]
    fn test_unary_and_binary_adapters() {
        fn halve(n: f64) -> f64 {
            n / 2.0
        }
        fn repeat(s: String, n: i32) -> Result<String, Error> {
            let count = usize::try_from(n)
                .map_err(|_| Error::ForeignError("negative repeat count".into()))?;
            Ok(s.repeat(count))
        }

        let h = foreign_fn("halve", halve);
        assert_eq!(h.apply(val(5.0)).unwrap(), val(2.5));

        let r = foreign_fn("repeat", repeat);
        let partial = r.apply(val("ab")).unwrap();
        assert_eq!(partial.to_string(), "repeat");
        assert_eq!(partial.apply(val(3)).unwrap(), val("ababab"));
        assert_eq!(
            partial.apply(val(-1)).unwrap_err(),
            Error::ForeignError("negative repeat count".into())
        );
    }

    #[test]
    fn test_partial_applications_are_reusable() {
        fn minus(a: f64, b: f64) -> f64 {
            a - b
        }
        let ten_minus = foreign_fn("minus", minus).apply(val(10.0)).unwrap();
        assert_eq!(ten_minus.apply(val(1.0)).unwrap(), val(9.0));
        assert_eq!(ten_minus.apply(val(4.0)).unwrap(), val(6.0));
    }

    #[test]
    fn test_mismatch_reports_primitive_and_position() {
        fn pick(a: f64, b: String, c: Term) -> Term {
            if a > 0.0 { val(b) } else { c }
        }
        let p = foreign_fn("pick", pick);
        let mut reducer = Reducer::new();

        let ok = reducer
            .apply_all(&p, vec![val(1.0), val("yes"), sym("no")])
            .unwrap();
        assert_eq!(ok, val("yes"));

        let err = reducer
            .apply_all(&p, vec![val(1.0), val(2.0), sym("no")])
            .unwrap_err();
        assert_eq!(
            err,
            Error::PayloadMismatch {
                expected: PayloadKind::Str,
                found: PayloadKind::F64,
                primitive: Some(("pick".to_owned(), 2)),
            }
        );
        assert_eq!(
            err.to_string(),
            "PayloadMismatch: expected string payload, found f64 (argument 2 of 'pick')"
        );

        let err = reducer
            .apply_all(&p, vec![K, val("x"), sym("no")])
            .unwrap_err();
        assert_eq!(
            err,
            Error::PayloadMismatch {
                expected: PayloadKind::F64,
                found: PayloadKind::None,
                primitive: Some(("pick".to_owned(), 1)),
            }
        );
    }

    #[test]
    fn test_bool_results_become_church_booleans() {
        fn positive(n: i32) -> bool {
            n > 0
        }
        let p = foreign_fn("positive", positive);
        assert_eq!(p.apply(val(3)).unwrap(), church(true));
        assert_eq!(p.apply(val(-3)).unwrap(), church(false));
    }

    #[test]
    fn test_collection_parameters() {
        fn count(items: Vec<Term>) -> i32 {
            i32::try_from(items.len()).unwrap_or(i32::MAX)
        }
        fn keys(table: BTreeMap<String, Term>) -> String {
            table.keys().cloned().collect::<Vec<_>>().join(",")
        }
        fn four(a: i32, b: i32, c: i32, d: i32) -> i32 {
            a + b + c + d
        }

        assert_eq!(
            foreign_fn("count", count).apply(val([1, 2, 3])).unwrap(),
            val(3)
        );
        assert_eq!(
            foreign_fn("keys", keys)
                .apply(crate::term::table([("b", 1), ("a", 2)]))
                .unwrap(),
            val("a,b")
        );
        let sum = Reducer::new()
            .apply_all(
                &foreign_fn("four", four),
                vec![val(1), val(2), val(3), val(4)],
            )
            .unwrap();
        assert_eq!(sum, val(10));
    }
}
