//! Recursive programs written as lambda expressions, compiled to S, K and I
//! around the native primitives, then run by the reducer.
//!
//! Run with `RUST_LOG=debug` to see each compiled program, or `RUST_LOG=trace`
//! to watch every rewrite rule fire.

use skirt::primitives::{add, greater, if_then, less, mul, print, recurse, sub};
use skirt::term::val;
use skirt::{Error, K, Lambda, Reducer, Term};
use std::process;

fn var(name: &str) -> Lambda {
    Lambda::var(name)
}

fn minus(n: Lambda, k: f64) -> Lambda {
    Lambda::from(sub()).applied_to(n).applied_to(val(k))
}

/// `recurse (λthis. λn. body)`
fn recursive(body: Lambda) -> Lambda {
    Lambda::from(recurse()).applied_to(Lambda::lambda("this", Lambda::lambda("n", body)))
}

/// `fib n = if (less n 2) (K n) (λu. add (fib (n - 1)) (fib (n - 2)))`
fn fibonacci() -> Lambda {
    let this = || var("this");
    let n = || var("n");
    let step = Lambda::lambda(
        "u",
        Lambda::from(add())
            .applied_to(this().applied_to(minus(n(), 1.0)))
            .applied_to(this().applied_to(minus(n(), 2.0))),
    );
    recursive(
        Lambda::from(if_then())
            .applied_to(Lambda::from(less()).applied_to(n()).applied_to(val(2.0)))
            .applied_to(Lambda::from(K).applied_to(n()))
            .applied_to(step),
    )
}

/// `pow2 n = if (greater n 0) (λu. mul 2 (pow2 (n - 1))) (K 1)`
fn power_of_two() -> Lambda {
    let step = Lambda::lambda(
        "u",
        Lambda::from(mul())
            .applied_to(val(2.0))
            .applied_to(var("this").applied_to(minus(var("n"), 1.0))),
    );
    recursive(
        Lambda::from(if_then())
            .applied_to(Lambda::from(greater()).applied_to(var("n")).applied_to(val(0.0)))
            .applied_to(step)
            .applied_to(Lambda::from(K).applied_to(val(1.0))),
    )
}

fn table(reducer: &mut Reducer, label: &str, program: &Term, inputs: &[f64]) -> Result<(), Error> {
    reducer.apply_all(&print(), [val(label), val(":")])?;
    for &n in inputs {
        let result = reducer.apply(program, val(n))?;
        reducer.apply_all(&print(), [val(" "), result])?;
    }
    reducer.emit("\n")
}

fn run() -> Result<(), Error> {
    let mut reducer = Reducer::new();

    let fib = fibonacci().to_combinator_in(&mut reducer)?;
    table(&mut reducer, "fib", &fib, &[0.0, 1.0, 2.0, 3.0, 5.0, 8.0, 12.0])?;

    let pow2 = power_of_two().to_combinator_in(&mut reducer)?;
    table(&mut reducer, "pow2", &pow2, &[0.0, 1.0, 4.0, 10.0])?;

    // i32 payloads are not numbers to the arithmetic primitives
    match reducer.apply(&fib, val(3)) {
        Ok(term) => println!("unexpected: {term}"),
        Err(e) => println!("Error: {e}"),
    }

    // unbound variables are compile errors
    match Lambda::lambda("n", var("m")).to_combinator() {
        Ok(term) => println!("unexpected: {term}"),
        Err(e) => println!("Error: {e}"),
    }

    println!("{} reduction steps", reducer.steps());
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env().init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
