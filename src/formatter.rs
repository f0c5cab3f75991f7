//! Single-line JSON stringifier for diagnostic output.
//!
//! [`json_one_line`] renders a dynamic [`Value`] tree as JSON on one line.
//! It is meant for log lines, not for interchange, so it bends JSON where
//! diagnostics benefit:
//!
//! - only composite values (objects, arrays, sets) are rendered; anything
//!   else yields `""`
//! - sets become the string `Set(<n>) { 'a', 'b' }`
//! - undefined fields and elements become the string `"undefined"` instead
//!   of disappearing
//! - failures (a cycle through [`SharedValue`] nodes) come back as
//!   `"[ERROR] <description>"`; the formatter never panics or returns `Err`
//!
//! # Layout
//!
//! With separator `s`: `{`/`[` are followed by `s`, `,` and `:` by `s`, and
//! `}`/`]` are preceded by `s`. Empty containers stay `{}`/`[]`.
//!
//! ```rust
//! use module_exceptions::{Value, format, json_one_line};
//!
//! let v = Value::object([("a", Value::from(1)), ("b", Value::from("x"))]);
//! assert_eq!(format(&v), r#"{ "a": 1, "b": "x" }"#);
//! assert_eq!(json_one_line(&v, ""), r#"{"a":1,"b":"x"}"#);
//! assert_eq!(format(&Value::from(42)), "");
//! ```

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::ser::Formatter;
use std::cell::RefCell;
use std::io;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Default separator used by [`format`].
pub const DEFAULT_SEPARATOR: &str = " ";

/// Literal substituted for undefined values.
pub const UNDEFINED: &str = "undefined";

/// Prefix of every failure string.
pub const ERROR_PREFIX: &str = "[ERROR] ";

const CIRCULAR_STRUCTURE: &str = "Converting circular structure to JSON";

// ============================================================================
// Value Model
// ============================================================================

/// Dynamic value accepted by the formatter.
///
/// Objects keep their keys in insertion order. Sets keep their elements in
/// insertion order and drop duplicate scalars and duplicate shared nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value. Rendered as `"undefined"` inside containers.
    #[default]
    Undefined,
    /// JSON null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Finite number.
    Number(serde_json::Number),
    /// String.
    String(String),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Ordered key/value pairs.
    Object(Vec<(String, Value)>),
    /// Insertion-ordered set.
    Set(Vec<Value>),
    /// Shared node. The only way to alias a value or form a cycle.
    Shared(SharedValue),
}

impl Value {
    /// Build an object from ordered pairs. Later duplicates of a key
    /// overwrite the earlier value in place.
    pub fn object<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut out: Vec<(String, Value)> = Vec::new();
        for (key, value) in fields {
            let key = key.into();
            let value = value.into();
            match out.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => out.push((key, value)),
            }
        }
        Value::Object(out)
    }

    /// Build a set from elements in insertion order.
    pub fn set<I, V>(elements: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut out: Vec<Value> = Vec::new();
        for element in elements {
            let element = element.into();
            if !out.iter().any(|existing| same_set_member(existing, &element)) {
                out.push(element);
            }
        }
        Value::Set(out)
    }

    /// Build an array.
    pub fn array<I, V>(elements: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(elements.into_iter().map(Into::into).collect())
    }

    /// Check for the undefined marker.
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Objects, arrays and sets are composite. A shared node is composite
    /// when its current content is; a node that resolves back to itself
    /// is not.
    pub fn is_composite(&self) -> bool {
        let shared = match self {
            Value::Array(_) | Value::Object(_) | Value::Set(_) => return true,
            Value::Shared(shared) => shared,
            _ => return false,
        };

        let mut seen = vec![shared.addr()];
        let mut current = shared.clone();
        loop {
            let next = match &*current.read() {
                Value::Shared(inner) => inner.clone(),
                other => return other.is_composite(),
            };
            if seen.contains(&next.addr()) {
                return false;
            }
            seen.push(next.addr());
            current = next;
        }
    }
}

/// Set membership follows identity for containers and equality for scalars.
fn same_set_member(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(_) | Value::Object(_) | Value::Set(_), _) => false,
        (Value::Shared(x), Value::Shared(y)) => x.ptr_eq(y),
        _ => a == b,
    }
}

/// Reference-counted, interior-mutable node.
///
/// Cloning shares the node. Nodes may reference themselves through their
/// content; such cycles are never freed, so break them with
/// [`SharedValue::set`] when done.
#[derive(Clone, Default)]
pub struct SharedValue(Arc<RwLock<Value>>);

impl SharedValue {
    /// Wrap `value` in a new shared node.
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Arc::new(RwLock::new(value.into())))
    }

    /// Replace the node's content.
    pub fn set(&self, value: impl Into<Value>) {
        *self.write() = value.into();
    }

    /// Mutate the node's content in place.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Value),
    {
        f(&mut self.write());
    }

    /// Reference identity.
    #[inline]
    pub fn ptr_eq(&self, other: &SharedValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    #[inline]
    fn read(&self) -> RwLockReadGuard<'_, Value> {
        match self.0.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[inline]
    fn write(&self) -> RwLockWriteGuard<'_, Value> {
        match self.0.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl PartialEq for SharedValue {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl std::fmt::Debug for SharedValue {
    // Content is not printed: it may contain the node itself.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedValue({:#x})", self.addr())
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(serde_json::Number::from(n))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    /// Integral floats are stored as integers so they print as `1`, not
    /// `1.0`. Non-finite floats become `Null`.
    fn from(n: f64) -> Self {
        if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
            return Value::Number(serde_json::Number::from(n as i64));
        }
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::from(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    /// `None` is the undefined marker.
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Undefined, Into::into)
    }
}

impl From<SharedValue> for Value {
    fn from(shared: SharedValue) -> Self {
        Value::Shared(shared)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) if n.is_f64() => Value::from(f),
                _ => Value::Number(n),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// [`json_one_line`] with the default separator `" "`.
#[inline]
pub fn format(value: &Value) -> String {
    json_one_line(value, DEFAULT_SEPARATOR)
}

/// Render `value` as single-line JSON using `separator` for spacing.
///
/// Returns `""` for non-composite input and `"[ERROR] ..."` on failure.
pub fn json_one_line(value: &Value, separator: &str) -> String {
    if !value.is_composite() {
        return String::new();
    }

    let path = RefCell::new(Vec::new());
    let node = Node { value, path: &path };

    let mut out = Vec::with_capacity(128);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, OneLineFormatter::new(separator));

    match node.serialize(&mut serializer) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(e) => format!("{}{}", ERROR_PREFIX, e),
    }
}

/// Render any serializable value through the same rules.
///
/// ```rust
/// use module_exceptions::format_serialize;
/// use std::collections::BTreeMap;
///
/// let mut m = BTreeMap::new();
/// m.insert("k", vec![1, 2]);
/// assert_eq!(format_serialize(&m, " "), r#"{ "k": [ 1, 2 ] }"#);
/// ```
pub fn format_serialize<T>(value: &T, separator: &str) -> String
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(value) {
        Ok(json) => json_one_line(&Value::from(json), separator),
        Err(e) => format!("{}{}", ERROR_PREFIX, e),
    }
}

// ============================================================================
// Serialization
// ============================================================================

/// A value plus the shared nodes currently being walked.
struct Node<'a> {
    value: &'a Value,
    path: &'a RefCell<Vec<usize>>,
}

impl<'a> Node<'a> {
    #[inline]
    fn child(&self, value: &'a Value) -> Node<'a> {
        Node {
            value,
            path: self.path,
        }
    }
}

impl Serialize for Node<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.value {
            Value::Undefined => serializer.serialize_str(UNDEFINED),
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.child(item))?;
                }
                seq.end()
            }
            Value::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, &self.child(value))?;
                }
                map.end()
            }
            Value::Set(elements) => {
                let mut path = self.path.borrow().clone();
                serializer.serialize_str(&set_description(elements, &mut path))
            }
            Value::Shared(shared) => {
                let addr = shared.addr();
                if self.path.borrow().contains(&addr) {
                    return Err(S::Error::custom(CIRCULAR_STRUCTURE));
                }

                self.path.borrow_mut().push(addr);
                let result = {
                    let guard = shared.read();
                    Node {
                        value: &guard,
                        path: self.path,
                    }
                    .serialize(serializer)
                };
                self.path.borrow_mut().pop();
                result
            }
        }
    }
}

/// `Set(<n>) { 'e1', 'e2' }`. An empty set renders as `Set(0) {  }`.
fn set_description(elements: &[Value], path: &mut Vec<usize>) -> String {
    let mut out = format!("Set({}) {{ ", elements.len());
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('\'');
        plain_text(element, path, &mut out);
        out.push('\'');
    }
    out.push_str(" }");
    out
}

/// Plain text form of a value, as it reads when embedded in a string.
///
/// Arrays join their elements with `,` and render null/undefined elements
/// as empty; a shared node already on `path` also renders empty.
fn plain_text(value: &Value, path: &mut Vec<usize>, out: &mut String) {
    match value {
        Value::Undefined => out.push_str(UNDEFINED),
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(s),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if !matches!(item, Value::Undefined | Value::Null) {
                    plain_text(item, path, out);
                }
            }
        }
        Value::Object(_) => out.push_str("[object Object]"),
        Value::Set(_) => out.push_str("[object Set]"),
        Value::Shared(shared) => {
            let addr = shared.addr();
            if path.contains(&addr) {
                return;
            }
            path.push(addr);
            plain_text(&shared.read(), path, out);
            path.pop();
        }
    }
}

// ============================================================================
// One-line Formatter
// ============================================================================

/// `serde_json` formatter that keeps output on one line and puts
/// `separator` after openers, commas and colons, and before closers.
struct OneLineFormatter<'a> {
    separator: &'a [u8],
    has_value: bool,
}

impl<'a> OneLineFormatter<'a> {
    fn new(separator: &'a str) -> Self {
        Self {
            separator: separator.as_bytes(),
            has_value: false,
        }
    }

    #[inline]
    fn open<W: ?Sized + io::Write>(&mut self, writer: &mut W, token: &[u8]) -> io::Result<()> {
        self.has_value = false;
        writer.write_all(token)
    }

    #[inline]
    fn close<W: ?Sized + io::Write>(&mut self, writer: &mut W, token: &[u8]) -> io::Result<()> {
        if self.has_value {
            writer.write_all(self.separator)?;
        }
        writer.write_all(token)
    }

    #[inline]
    fn item<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if !first {
            writer.write_all(b",")?;
        }
        writer.write_all(self.separator)
    }
}

impl Formatter for OneLineFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"[")
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"]")
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.item(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"{")
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.item(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b":")?;
        writer.write_all(self.separator)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
