use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::Function;

/// Ordered string-keyed map used for objects, hashes and data frames.
pub type Map = IndexMap<String, Value>;

/// A dynamic template value.
///
/// Arrays and objects are reference counted, so cloning a `Value` is cheap
/// and two clones of the same object compare as identical with
/// [`Value::same`].
///
/// # Example
///
/// ```
/// use walkbars::{object, Value};
///
/// let context = object! { "name" => "Alice", "tags" => vec!["a", "b"] };
/// assert_eq!(context.get_own_property("name"), Some(Value::from("Alice")));
/// assert_eq!(context.to_string(), "[object Object]");
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// An absent value.
    #[default]
    Undefined,

    /// An explicit null.
    Null,

    Bool(bool),

    Number(f64),

    String(String),

    /// Pre-escaped markup that is emitted without HTML escaping.
    SafeString(String),

    Array(Rc<Vec<Value>>),

    Object(Rc<Map>),

    /// A callable helper or lambda.
    Function(Function),
}

impl Value {
    /// Builds an object value from a map.
    pub fn object(map: Map) -> Value {
        Value::Object(Rc::new(map))
    }

    /// Builds an array value.
    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(items))
    }

    /// An object with no properties.
    pub fn empty_object() -> Value {
        Value::object(Map::new())
    }

    /// Marks `s` as safe markup.
    pub fn safe_string(s: impl Into<String>) -> Value {
        Value::SafeString(s.into())
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// True for `null` and `undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::SafeString(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Name of the value's type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::SafeString(_) => "safe string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// JavaScript truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) | Value::SafeString(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Handlebars emptiness: falsy values other than zero, and empty arrays.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Number(n) => n.is_nan(),
            Value::Array(items) => items.is_empty(),
            other => !other.is_truthy(),
        }
    }

    /// Strict identity: primitives compare by value, arrays, objects and
    /// functions by reference.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) | (Value::SafeString(a), Value::SafeString(b)) => {
                a == b
            }
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Returns whether `key` names an own property of this value.
    pub fn has_own_property(&self, key: &str) -> bool {
        if is_forbidden_property(key) {
            return false;
        }
        match self {
            Value::Object(map) => map.contains_key(key),
            Value::Array(items) => key == "length" || index_of(key).is_some_and(|i| i < items.len()),
            Value::String(s) | Value::SafeString(s) => {
                key == "length" || index_of(key).is_some_and(|i| i < s.chars().count())
            }
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::Function(_) => false,
        }
    }

    /// Reads an own property. Inherited or missing properties yield `None`.
    pub fn get_own_property(&self, key: &str) -> Option<Value> {
        if is_forbidden_property(key) {
            return None;
        }
        match self {
            Value::Object(map) => map.get(key).cloned(),
            Value::Array(items) => {
                if key == "length" {
                    return Some(Value::from(items.len()));
                }
                index_of(key).and_then(|i| items.get(i)).cloned()
            }
            Value::String(s) | Value::SafeString(s) => {
                if key == "length" {
                    return Some(Value::from(s.chars().count()));
                }
                index_of(key)
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| Value::String(c.to_string()))
            }
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::Function(_) => None,
        }
    }

    /// The own enumerable properties of this value as a fresh map, the way
    /// object spread copies them. Strings and arrays spread into indexed
    /// entries; scalars spread into nothing.
    pub fn spread(&self) -> Map {
        match self {
            Value::Object(map) => (**map).clone(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), item.clone()))
                .collect(),
            Value::String(s) | Value::SafeString(s) => s
                .chars()
                .enumerate()
                .map(|(i, c)| (i.to_string(), Value::String(c.to_string())))
                .collect(),
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::Function(_) => Map::new(),
        }
    }

    /// String form used when joining rendered output: `null` and `undefined`
    /// become the empty string.
    pub fn to_output(&self) -> String {
        match self {
            Value::Undefined | Value::Null => String::new(),
            Value::String(s) | Value::SafeString(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Property names that are never readable from templates, even when a map
/// defines them.
const FORBIDDEN_PROPERTIES: [&str; 6] = [
    "__proto__",
    "constructor",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
];

fn is_forbidden_property(key: &str) -> bool {
    FORBIDDEN_PROPERTIES.contains(&key)
}

/// Parses a canonical array index (`"0"`, `"12"`, never `"01"`).
fn index_of(key: &str) -> Option<usize> {
    let index: usize = key.parse().ok()?;
    (index.to_string() == key).then_some(index)
}

/// Formats a number the way JavaScript's `String(n)` does.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&n.abs()) {
        return format!("{n}");
    }
    let exponential = format!("{n:e}");
    match exponential.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => exponential,
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) | Value::SafeString(s) => write!(f, "{s}"),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item.to_output())?;
                }
                Ok(())
            }
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Function(_) => write!(f, "function () {{ [native code] }}"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => self.same(other),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null | Value::Function(_) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) | Value::SafeString(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

// From implementations for common types

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::object(map)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Undefined, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => items.into(),
            serde_json::Value::Object(entries) => Value::object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_format_like_javascript() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn arrays_join_with_commas_and_blank_nullish() {
        let value = Value::from(vec![Value::from(1), Value::Null, Value::from("x")]);
        assert_eq!(value.to_string(), "1,,x");
    }

    #[test]
    fn zero_is_falsy_but_not_empty() {
        let zero = Value::from(0);
        assert!(!zero.is_truthy());
        assert!(!zero.is_empty());
        assert!(Value::array(vec![]).is_empty());
        assert!(Value::from("").is_empty());
    }

    #[test]
    fn string_properties_are_indexed_characters() {
        let value = Value::from("abc");
        assert_eq!(value.get_own_property("1"), Some(Value::from("b")));
        assert_eq!(value.get_own_property("length"), Some(Value::from(3)));
        assert_eq!(value.get_own_property("01"), None);
        assert_eq!(value.spread().len(), 3);
    }

    #[test]
    fn identity_is_by_reference_for_objects() {
        let a = Value::empty_object();
        let b = Value::empty_object();
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn prototype_names_are_never_own_properties() {
        let mut map = Map::new();
        map.insert("constructor".to_string(), Value::from("x"));
        let value = Value::object(map);
        assert!(!value.has_own_property("constructor"));
        assert_eq!(value.get_own_property("constructor"), None);
        assert_eq!(value.get_own_property("__proto__"), None);
    }
}
