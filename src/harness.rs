//! Invocation engine
//!
//! Resolves an operation by test name, materializes each raw argument against
//! the matching parameter shape, calls the operation on a fresh subject and
//! wraps the result in a comparable [`Outcome`].

use serde_json::Value;
use std::path::PathBuf;

use crate::common::config::Config;
use crate::common::{paths, Error, Result};
use crate::materialize::Materializer;
use crate::outcome::Outcome;
use crate::registry::{Registry, Subject, Target};

/// Per-invocation test metadata: which operation, with which raw arguments
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub method: String,
    pub arguments: Vec<Value>,
}

impl TestCase {
    pub fn new(method: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Test case named after the running test function
    ///
    /// The test harness names each test thread after the test's path
    /// (`module::tests::two_sum`); the last segment is the method name.
    /// Fails on unnamed threads and on `main`, which is where tests run
    /// when the harness is single-threaded.
    pub fn current(arguments: Vec<Value>) -> Result<Self> {
        let thread = std::thread::current();
        let method = thread
            .name()
            .filter(|name| *name != "main")
            .and_then(|name| name.rsplit("::").next())
            .ok_or(Error::NoCurrentTest)?;
        Ok(Self::new(method, arguments))
    }
}

/// Runs operations of `S` against raw test arguments
pub struct Harness<S> {
    registry: Registry<S>,
    materializer: Materializer,
    tolerance: f64,
}

impl<S: Subject + Default> Harness<S> {
    /// Harness for `S` using the user configuration and the project root
    /// discovered from the working directory
    pub fn discover() -> Result<Self> {
        let config = Config::load()?;
        let root = paths::project_root(&config.project.markers)?;
        Ok(Self::with_config(Registry::for_subject(), root, &config))
    }
}

impl<S: 'static> Harness<S> {
    /// Harness resolving data files under `root`, with default settings
    pub fn with_root(registry: Registry<S>, root: impl Into<PathBuf>) -> Self {
        Self::with_config(registry, root, &Config::default())
    }

    /// Harness resolving data files under `root`, with explicit settings
    pub fn with_config(registry: Registry<S>, root: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            registry,
            materializer: Materializer::new(root, config.files.clone()),
            tolerance: config.compare.tolerance,
        }
    }

    pub fn registry(&self) -> &Registry<S> {
        &self.registry
    }

    pub fn materializer(&self) -> &Materializer {
        &self.materializer
    }

    /// Locate `method` on a fresh subject
    pub fn resolve(&self, method: &str) -> Result<Target<'_, S>> {
        self.registry.resolve(method)
    }

    /// Invoke `method` with raw, unconverted arguments
    pub fn invoke(&self, method: &str, raw: Vec<Value>) -> Result<Outcome> {
        let target = self.resolve(method)?;
        let raw = unbundle(raw, &target);

        let args = raw
            .iter()
            .enumerate()
            .map(|(i, arg)| match target.params().get(i) {
                Some(shape) => self.materializer.argument(i, arg, shape),
                None => Err(Error::ArgumentCount {
                    operation: method.to_string(),
                    expected: target.params().len(),
                    supplied: raw.len(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(operation = method, arguments = args.len(), "Invoking operation");
        let value = target.call(args)?;

        Ok(Outcome::new(value, self.materializer.clone()).with_tolerance(self.tolerance))
    }

    /// Invoke the operation a test case names
    pub fn invoke_case(&self, case: &TestCase) -> Result<Outcome> {
        self.invoke(&case.method, case.arguments.clone())
    }

    /// Invoke the operation named after the running test function
    pub fn invoke_current(&self, raw: Vec<Value>) -> Result<Outcome> {
        let case = TestCase::current(raw)?;
        self.invoke(&case.method, case.arguments)
    }
}

/// Spread a single bundled array into the argument list
///
/// A lone array argument is kept as-is when the operation takes exactly one
/// parameter that already accepts it.
fn unbundle<S>(mut raw: Vec<Value>, target: &Target<'_, S>) -> Vec<Value> {
    let single_fits = match (target.params(), raw.as_slice()) {
        ([shape], [arg]) => shape.admits(arg),
        _ => false,
    };
    if raw.len() != 1 || single_fits {
        return raw;
    }

    match raw.pop() {
        Some(Value::Array(items)) => {
            tracing::debug!(operation = target.name(), arguments = items.len(), "Unwrapped bundled arguments");
            items
        }
        Some(other) => vec![other],
        None => Vec::new(),
    }
}
