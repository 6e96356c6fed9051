//! [`PackValue`] — the in-memory value shapes the encoder understands.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::{RegistryError, MAX_EXTENSION_TAG};

/// An application value that only a registered extension knows how to
/// encode.
///
/// Implemented for every `'static` type with a `Debug` impl.
pub trait CustomValue: Any + fmt::Debug {
    /// Runtime type name, reported by `UnsupportedType` errors.
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug> CustomValue for T {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A pre-tagged extension payload, written as-is through the extension
/// header selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionValue {
    tag: u8,
    data: Vec<u8>,
}

impl ExtensionValue {
    /// Tags follow the registry rule: `0..=127`.
    pub fn new(tag: u8, data: Vec<u8>) -> Result<Self, RegistryError> {
        if tag > MAX_EXTENSION_TAG {
            return Err(RegistryError::InvalidTag(tag));
        }
        Ok(Self { tag, data })
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Value type accepted by [`Encoder`](crate::Encoder).
///
/// Numbers are IEEE-754 doubles; the encoder picks the narrowest integer
/// form when the double holds a 32-bit integer. Object keys are written in
/// vector order.
#[derive(Debug, Clone)]
pub enum PackValue {
    /// Written as a type-0 `fixext1`, distinct from nil.
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    /// Always encoded through the extension registered at
    /// [`BIGINT_TAG`](crate::BIGINT_TAG).
    BigInt(i128),
    Str(String),
    Bytes(Vec<u8>),
    Array(Vec<PackValue>),
    Object(Vec<(String, PackValue)>),
    Extension(ExtensionValue),
    /// Anything else; dispatched to the first extension whose predicate
    /// accepts it.
    Custom(Rc<dyn CustomValue>),
}

impl PackValue {
    /// Wraps an application value for extension dispatch.
    pub fn custom<T: CustomValue>(value: T) -> Self {
        PackValue::Custom(Rc::new(value))
    }

    /// Borrows the wrapped application value if it is a `T`.
    pub fn downcast_custom<T: Any>(&self) -> Option<&T> {
        match self {
            PackValue::Custom(value) => (**value).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Name of the runtime shape, or the Rust type name for custom values.
    pub fn type_name(&self) -> &'static str {
        match self {
            PackValue::Undefined => "undefined",
            PackValue::Null => "null",
            PackValue::Bool(_) => "boolean",
            PackValue::Number(_) => "number",
            PackValue::BigInt(_) => "bigint",
            PackValue::Str(_) => "string",
            PackValue::Bytes(_) => "bytes",
            PackValue::Array(_) => "array",
            PackValue::Object(_) => "object",
            PackValue::Extension(_) => "extension",
            PackValue::Custom(value) => (**value).type_name(),
        }
    }
}

impl PartialEq for PackValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PackValue::Undefined, PackValue::Undefined) => true,
            (PackValue::Null, PackValue::Null) => true,
            (PackValue::Bool(a), PackValue::Bool(b)) => a == b,
            (PackValue::Number(a), PackValue::Number(b)) => a == b,
            (PackValue::BigInt(a), PackValue::BigInt(b)) => a == b,
            (PackValue::Str(a), PackValue::Str(b)) => a == b,
            (PackValue::Bytes(a), PackValue::Bytes(b)) => a == b,
            (PackValue::Array(a), PackValue::Array(b)) => a == b,
            (PackValue::Object(a), PackValue::Object(b)) => a == b,
            (PackValue::Extension(a), PackValue::Extension(b)) => a == b,
            // Custom values compare by identity.
            (PackValue::Custom(a), PackValue::Custom(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

macro_rules! from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for PackValue {
                fn from(n: $t) -> Self {
                    PackValue::Number(n as f64)
                }
            }
        )*
    };
}

// 64-bit integers beyond 2^53 lose precision, the same as any double.
from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl From<i128> for PackValue {
    fn from(n: i128) -> Self {
        PackValue::BigInt(n)
    }
}

impl From<bool> for PackValue {
    fn from(b: bool) -> Self {
        PackValue::Bool(b)
    }
}

impl From<&str> for PackValue {
    fn from(s: &str) -> Self {
        PackValue::Str(s.to_owned())
    }
}

impl From<String> for PackValue {
    fn from(s: String) -> Self {
        PackValue::Str(s)
    }
}

impl From<Vec<u8>> for PackValue {
    fn from(b: Vec<u8>) -> Self {
        PackValue::Bytes(b)
    }
}

impl From<Vec<PackValue>> for PackValue {
    fn from(items: Vec<PackValue>) -> Self {
        PackValue::Array(items)
    }
}

impl From<ExtensionValue> for PackValue {
    fn from(ext: ExtensionValue) -> Self {
        PackValue::Extension(ext)
    }
}

impl From<serde_json::Value> for PackValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => PackValue::Null,
            serde_json::Value::Bool(b) => PackValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => PackValue::Number(f),
                None => PackValue::Null,
            },
            serde_json::Value::String(s) => PackValue::Str(s),
            serde_json::Value::Array(arr) => {
                PackValue::Array(arr.into_iter().map(PackValue::from).collect())
            }
            serde_json::Value::Object(obj) => PackValue::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, PackValue::from(v)))
                    .collect(),
            ),
        }
    }
}
