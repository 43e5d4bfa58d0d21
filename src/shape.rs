//! Shape descriptors
//!
//! A [`Shape`] describes the layout a value must have to be handed to an
//! operation parameter: a scalar kind, an array of some element shape, or a
//! composite object. Parameter types declare their shape through [`Param`];
//! result values get theirs inferred with [`Shape::of`].

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Declared structure of a value
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Any value, no conversion
    Any,
    Bool,
    /// Integral number
    Int,
    /// Floating point number (integers are accepted)
    Float,
    /// Text
    Str,
    /// Text of exactly one character
    Char,
    /// Sequence of values of one shape
    Array(Box<Shape>),
    /// `null` or a value of the inner shape
    Optional(Box<Shape>),
    /// Object with arbitrary keys and values of one shape
    Map(Box<Shape>),
    /// Object with a fixed set of named fields; other keys are dropped
    Object(Vec<(String, Shape)>),
}

impl Shape {
    /// Array of `element`
    pub fn array(element: Shape) -> Self {
        Shape::Array(Box::new(element))
    }

    /// Nullable `inner`
    pub fn optional(inner: Shape) -> Self {
        Shape::Optional(Box::new(inner))
    }

    /// String-keyed map of `value`
    pub fn map(value: Shape) -> Self {
        Shape::Map(Box::new(value))
    }

    /// Object layout from `(field, shape)` pairs
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Shape)>,
        K: Into<String>,
    {
        Shape::Object(fields.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }

    /// Whether this shape is a single scalar (possibly nullable)
    pub fn is_scalar(&self) -> bool {
        match self {
            Shape::Bool | Shape::Int | Shape::Float | Shape::Str | Shape::Char => true,
            Shape::Optional(inner) => inner.is_scalar(),
            _ => false,
        }
    }

    /// Element shape if this is an array shape
    pub fn element(&self) -> Option<&Shape> {
        match self {
            Shape::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Whether `value` already has this shape and needs no conversion
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (Shape::Any, _) => true,
            (Shape::Optional(_), Value::Null) => true,
            (Shape::Optional(inner), v) => inner.admits(v),
            (Shape::Bool, Value::Bool(_)) => true,
            (Shape::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Shape::Float, Value::Number(_)) => true,
            (Shape::Str, Value::String(_)) => true,
            (Shape::Char, Value::String(s)) => s.chars().count() == 1,
            (Shape::Array(element), Value::Array(items)) => items.iter().all(|v| element.admits(v)),
            (Shape::Map(inner), Value::Object(map)) => map.values().all(|v| inner.admits(v)),
            (Shape::Object(fields), Value::Object(map)) => {
                map.keys().all(|key| fields.iter().any(|(name, _)| name == key))
                    && fields.iter().all(|(name, shape)| match map.get(name) {
                        Some(v) => shape.admits(v),
                        None => matches!(shape, Shape::Optional(_)),
                    })
            }
            _ => false,
        }
    }

    /// Infer the shape of a concrete value
    ///
    /// Arrays and maps get the most specific shape all their members share;
    /// `null` members make the element shape optional.
    pub fn of(value: &Value) -> Shape {
        match value {
            Value::Null => Shape::optional(Shape::Any),
            Value::Bool(_) => Shape::Bool,
            Value::Number(n) if n.is_f64() => Shape::Float,
            Value::Number(_) => Shape::Int,
            Value::String(_) => Shape::Str,
            Value::Array(items) => Shape::array(unify_all(items.iter())),
            Value::Object(map) => Shape::map(unify_all(map.values())),
        }
    }
}

fn unify_all<'a>(values: impl Iterator<Item = &'a Value>) -> Shape {
    values
        .map(Shape::of)
        .reduce(unify)
        .unwrap_or(Shape::Any)
}

/// Smallest shape admitting values of both `a` and `b`
fn unify(a: Shape, b: Shape) -> Shape {
    match (a, b) {
        (a, b) if a == b => a,
        (Shape::Any, other) | (other, Shape::Any) => other,
        (Shape::Optional(x), Shape::Optional(y)) => Shape::optional(unify(*x, *y)),
        (Shape::Optional(x), other) | (other, Shape::Optional(x)) => Shape::optional(unify(*x, other)),
        (Shape::Int, Shape::Float) | (Shape::Float, Shape::Int) => Shape::Float,
        (Shape::Array(x), Shape::Array(y)) => Shape::array(unify(*x, *y)),
        (Shape::Map(x), Shape::Map(y)) => Shape::map(unify(*x, *y)),
        _ => Shape::Any,
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Any => write!(f, "any"),
            Shape::Bool => write!(f, "bool"),
            Shape::Int => write!(f, "int"),
            Shape::Float => write!(f, "float"),
            Shape::Str => write!(f, "string"),
            Shape::Char => write!(f, "char"),
            Shape::Array(element) => write!(f, "{}[]", element),
            Shape::Optional(inner) => write!(f, "{}?", inner),
            Shape::Map(value) => write!(f, "map<string, {}>", value),
            Shape::Object(fields) => {
                write!(f, "{{")?;
                for (i, (name, shape)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, shape)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A type usable as an operation parameter
///
/// The declared shape drives argument materialization; the value is then
/// decoded into the concrete type with serde.
pub trait Param: DeserializeOwned {
    fn shape() -> Shape;
}

macro_rules! scalar_param {
    ($shape:expr => $($ty:ty),+) => {
        $(
            impl Param for $ty {
                fn shape() -> Shape {
                    $shape
                }
            }
        )+
    };
}

scalar_param!(Shape::Int => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
scalar_param!(Shape::Float => f32, f64);
scalar_param!(Shape::Bool => bool);
scalar_param!(Shape::Str => String);
scalar_param!(Shape::Char => char);
scalar_param!(Shape::Any => Value);

impl<T: Param> Param for Vec<T> {
    fn shape() -> Shape {
        Shape::array(T::shape())
    }
}

impl<T: Param> Param for Option<T> {
    fn shape() -> Shape {
        Shape::optional(T::shape())
    }
}

impl<T: Param> Param for BTreeMap<String, T> {
    fn shape() -> Shape {
        Shape::map(T::shape())
    }
}

impl<T: Param> Param for HashMap<String, T> {
    fn shape() -> Shape {
        Shape::map(T::shape())
    }
}
