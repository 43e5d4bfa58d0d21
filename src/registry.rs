//! Operation registry for subjects under test
//!
//! A subject declares its operations once, by name, as typed closures or
//! methods taking `&mut Self`. Parameter shapes come from each argument
//! type's [`Param`] impl, so the harness can materialize raw arguments
//! before the typed call.

use serde::Serialize;
use serde_json::Value;

use crate::common::error::SubjectError;
use crate::common::{Error, Result};
use crate::shape::{Param, Shape};

/// A type whose operations can be invoked by name
pub trait Subject: Sized + 'static {
    /// Register every operation tests may call
    fn operations(registry: &mut Registry<Self>);
}

/// A callable taking a subject and typed arguments
///
/// Implemented for every `Fn(&mut S, A1, .., An) -> R` with up to six
/// [`Param`] arguments.
pub trait Operation<S, Args>: 'static {
    type Output;

    /// Shapes of the parameters, in order
    fn params() -> Vec<Shape>;

    /// Decode `args` into the parameter types and call
    fn call(&self, subject: &mut S, args: Vec<Value>) -> Result<Self::Output>;
}

/// Decode a materialized argument into its parameter type
fn decode<T: Param>(index: usize, value: Option<Value>) -> Result<T> {
    let value = value.ok_or_else(|| Error::argument_type(index, &T::shape(), "missing"))?;
    serde_json::from_value(value).map_err(|e| Error::argument_type(index, &T::shape(), e))
}

macro_rules! impl_operation {
    ($($ty:ident $var:ident $idx:tt),*) => {
        impl<S, F, R, $($ty,)*> Operation<S, ($($ty,)*)> for F
        where
            F: Fn(&mut S, $($ty),*) -> R + 'static,
            $($ty: Param,)*
        {
            type Output = R;

            fn params() -> Vec<Shape> {
                vec![$($ty::shape()),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn call(&self, subject: &mut S, args: Vec<Value>) -> Result<R> {
                let mut args = args.into_iter();
                $(let $var = decode::<$ty>($idx, args.next())?;)*
                Ok(self(subject, $($var),*))
            }
        }
    };
}

impl_operation!();
impl_operation!(A0 a0 0);
impl_operation!(A0 a0 0, A1 a1 1);
impl_operation!(A0 a0 0, A1 a1 1, A2 a2 2);
impl_operation!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3);
impl_operation!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4);
impl_operation!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5);

type Invoker<S> = Box<dyn Fn(&mut S, Vec<Value>) -> Result<Value>>;

/// A registered operation
struct Entry<S> {
    name: String,
    params: Vec<Shape>,
    invoker: Invoker<S>,
}

/// Named operations of a subject, plus a way to build fresh subjects
pub struct Registry<S> {
    subject_name: &'static str,
    factory: Box<dyn Fn() -> S>,
    entries: Vec<Entry<S>>,
}

impl<S: Subject + Default> Registry<S> {
    /// Registry of all operations `S` declares, on default-constructed subjects
    pub fn for_subject() -> Self {
        Self::for_subject_with(S::default)
    }
}

impl<S: Subject> Registry<S> {
    /// Registry of all operations `S` declares, on subjects built by `factory`
    pub fn for_subject_with(factory: impl Fn() -> S + 'static) -> Self {
        let mut registry = Self::new(factory);
        S::operations(&mut registry);
        tracing::debug!(
            subject = registry.subject_name,
            operations = registry.entries.len(),
            "Built operation registry"
        );
        registry
    }
}

impl<S: 'static> Registry<S> {
    /// Empty registry building subjects with `factory`
    pub fn new(factory: impl Fn() -> S + 'static) -> Self {
        Self {
            subject_name: std::any::type_name::<S>(),
            factory: Box::new(factory),
            entries: Vec::new(),
        }
    }

    /// Register an infallible operation
    pub fn register<Args, F>(&mut self, name: &str, op: F) -> &mut Self
    where
        Args: 'static,
        F: Operation<S, Args>,
        F::Output: Serialize,
    {
        let operation = name.to_string();
        let invoker: Invoker<S> = Box::new(move |subject: &mut S, args: Vec<Value>| {
            let output = op.call(subject, args)?;
            encode(&operation, output)
        });
        self.insert(name, F::params(), invoker)
    }

    /// Register an operation returning `Result`; an `Err` is reported as the
    /// subject's own failure
    pub fn try_register<Args, F, T, E>(&mut self, name: &str, op: F) -> &mut Self
    where
        Args: 'static,
        F: Operation<S, Args, Output = std::result::Result<T, E>>,
        T: Serialize + 'static,
        E: Into<SubjectError> + 'static,
    {
        let operation = name.to_string();
        let invoker: Invoker<S> = Box::new(move |subject: &mut S, args: Vec<Value>| {
            let output = op.call(subject, args)?.map_err(Error::subject)?;
            encode(&operation, output)
        });
        self.insert(name, F::params(), invoker)
    }

    fn insert(&mut self, name: &str, params: Vec<Shape>, invoker: Invoker<S>) -> &mut Self {
        let entry = Entry {
            name: name.to_string(),
            params,
            invoker,
        };
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => {
                tracing::warn!(operation = name, "Operation registered twice, keeping the last");
                *existing = entry;
            }
            None => self.entries.push(entry),
        }
        self
    }

    /// Names of all registered operations
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Type name of the subject
    pub fn subject_name(&self) -> &'static str {
        self.subject_name
    }

    /// Find `name` and pair it with a freshly built subject
    pub fn resolve(&self, name: &str) -> Result<Target<'_, S>> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| Error::operation_not_found(name, self.subject_name))?;

        Ok(Target {
            subject: (self.factory)(),
            entry,
        })
    }
}

fn encode<T: Serialize>(operation: &str, output: T) -> Result<Value> {
    serde_json::to_value(output).map_err(|error| Error::ResultEncoding {
        operation: operation.to_string(),
        error,
    })
}

/// A resolved operation bound to a fresh subject
pub struct Target<'r, S> {
    subject: S,
    entry: &'r Entry<S>,
}

impl<S> Target<'_, S> {
    pub fn name(&self) -> &str {
        &self.entry.name
    }

    /// Declared parameter shapes, one per formal parameter
    pub fn params(&self) -> &[Shape] {
        &self.entry.params
    }

    /// The subject the operation will run on
    pub fn subject(&self) -> &S {
        &self.subject
    }

    /// Call with already-materialized arguments
    ///
    /// The argument count must match [`Target::params`].
    pub fn call(mut self, args: Vec<Value>) -> Result<Value> {
        if args.len() != self.entry.params.len() {
            return Err(Error::ArgumentCount {
                operation: self.entry.name.clone(),
                expected: self.entry.params.len(),
                supplied: args.len(),
            });
        }
        (self.entry.invoker)(&mut self.subject, args)
    }
}
