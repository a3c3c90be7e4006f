use crate::Error;
use crate::term::{Saturation, Term};
use log::{debug, trace};
use std::io::Write;
use std::sync::Arc;

pub mod foreign;

/// Canonical erased host function type.
///
/// Host functions receive ownership of their argument together with the
/// active reducer, which they must use for any nested application.
pub type ForeignFn = dyn Fn(Term, &mut Reducer) -> Result<Term, Error> + Send + Sync;

/// Opt-in limits for reduction.
///
/// Both limits are off by default: a diverging term reduces forever (or until
/// the stack is exhausted). Setting a limit turns that into an error, which is
/// useful when debugging combinator programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReduceConfig {
    /// Maximum number of applications performed by one reducer
    pub step_limit: Option<u64>,
    /// Maximum nesting of applications (each rewrite that applies subterms
    /// nests one level deeper)
    pub depth_limit: Option<usize>,
}

impl ReduceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.depth_limit = Some(limit);
        self
    }
}

/// Destination of the `print` primitive
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Output {
    #[default]
    Stdout,
    /// Collect printed text in memory
    Captured(String),
}

/// Reduction context: applies terms to arguments according to the rewrite
/// rules, enforcing any configured limits and owning the print sink.
#[derive(Debug, Default)]
pub struct Reducer {
    config: ReduceConfig,
    output: Output,
    steps: u64,
    depth: usize,
}

impl Reducer {
    /// Unbounded reducer printing to stdout
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReduceConfig) -> Self {
        Reducer {
            config,
            ..Self::default()
        }
    }

    /// Unbounded reducer collecting printed text in memory
    pub fn capturing() -> Self {
        Self::new().with_output(Output::Captured(String::new()))
    }

    #[must_use]
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    pub fn config(&self) -> &ReduceConfig {
        &self.config
    }

    /// Number of applications performed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Text printed so far, when output is captured
    pub fn captured(&self) -> Option<&str> {
        match &self.output {
            Output::Captured(text) => Some(text),
            Output::Stdout => None,
        }
    }

    /// Write text to the print sink
    pub fn emit(&mut self, text: &str) -> Result<(), Error> {
        match &mut self.output {
            Output::Captured(buffer) => {
                buffer.push_str(text);
                Ok(())
            }
            Output::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(text.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(|e| Error::OutputError(e.to_string()))
            }
        }
    }

    /// Apply `term` to `arg` (public API)
    pub fn apply(&mut self, term: &Term, arg: Term) -> Result<Term, Error> {
        if let Some(limit) = self.config.step_limit
            && self.steps >= limit
        {
            debug!("reduction stopped after {limit} steps");
            return Err(Error::StepLimitExceeded(limit));
        }
        if let Some(limit) = self.config.depth_limit
            && self.depth >= limit
        {
            debug!("reduction stopped at depth {limit}");
            return Err(Error::DepthLimitExceeded(limit));
        }

        self.steps += 1;
        self.depth += 1;
        let result = self.rewrite(term, arg);
        self.depth -= 1;
        result
    }

    /// Apply `term` to each argument in turn, threading the result
    pub fn apply_all(
        &mut self,
        term: &Term,
        args: impl IntoIterator<Item = Term>,
    ) -> Result<Term, Error> {
        let mut current = term.clone();
        for arg in args {
            current = self.apply(&current, arg)?;
        }
        Ok(current)
    }

    /// Perform one application according to the head's rewrite rule
    fn rewrite(&mut self, term: &Term, arg: Term) -> Result<Term, Error> {
        match term {
            Term::Substitution(partial) => match partial.accept(arg) {
                Saturation::Waiting(next) => Ok(Term::Substitution(next)),
                Saturation::Ready(x, y, z) => {
                    trace!("S({x})({y})({z}) => ({x})({z})(({y})({z}))");
                    let xz = self.apply(&x, z.clone())?;
                    let yz = self.apply(&y, z)?;
                    self.apply(&xz, yz)
                }
            },
            Term::Compose(partial) => match partial.accept(arg) {
                Saturation::Waiting(next) => Ok(Term::Compose(next)),
                Saturation::Ready(x, y, z) => {
                    trace!("B({x})({y})({z}) => ({x})(({y})({z}))");
                    let yz = self.apply(&y, z)?;
                    self.apply(&x, yz)
                }
            },
            Term::Flip(partial) => match partial.accept(arg) {
                Saturation::Waiting(next) => Ok(Term::Flip(next)),
                Saturation::Ready(x, y, z) => {
                    trace!("C({x})({y})({z}) => ({x})({z})({y})");
                    let xz = self.apply(&x, z)?;
                    self.apply(&xz, (*y).clone())
                }
            },
            Term::Constant(None) => Ok(Term::Constant(Some(Arc::new(arg)))),
            Term::Constant(Some(x)) => Ok((**x).clone()),
            Term::Identity => Ok(arg),

            // Values are terminal: applying them is a no-op
            Term::Table(_) | Term::List(_) | Term::Str(_) | Term::I32(_) | Term::F64(_) => {
                Ok(term.clone())
            }

            Term::Foreign { name, function } => {
                trace!("{name}({arg})");
                function(arg, self)
            }
            Term::Symbol { name, args } => {
                let mut args = args.clone();
                args.push(arg);
                Ok(Term::Symbol {
                    name: name.clone(),
                    args,
                })
            }
        }
    }
}
