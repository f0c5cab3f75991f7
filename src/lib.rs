//! # Module Exceptions
//!
//! Module-tagged exceptions and diagnostic formatting helpers.
//!
//! ## Design Philosophy
//!
//! 1. **Every exception names its module**: a short module code and a
//!    human-readable module name are stamped on each instance
//! 2. **Error codes locate the failure site** within that module
//! 3. **Categories drive dispatch**, never behaviour: all categories compose
//!    messages and chain causes the same way
//! 4. **Construction is total**: building an exception cannot fail, log, or
//!    panic; callers decide what to do with the result
//! 5. **Diagnostics never throw**: the JSON formatter converts every failure
//!    into a string
//!
//! ## Quick Start
//!
//! ```rust
//! use module_exceptions::{Category, Result, init};
//!
//! let exc = init("USR", "User Module");
//!
//! fn find_user(id: u32, exc: &module_exceptions::ExceptionFactory) -> Result<String> {
//!     if id == 0 {
//!         return Err(exc.create_not_found("FIND_BY_ID", "User not found.", None));
//!     }
//!     Ok(format!("user-{id}"))
//! }
//!
//! let err = find_user(0, &exc).unwrap_err();
//! assert_eq!(err.message(), "[USR_FIND_BY_ID] User Module. User not found.");
//! assert_eq!(err.category(), Category::NotFound);
//! ```
//!
//! ## Wrapping Causes
//!
//! ```rust
//! use module_exceptions::{cause, init};
//!
//! let db = init("DB", "Database");
//! let api = init("API", "Api");
//!
//! let inner = db.create("CONNECT", "Connection refused.", None);
//! let outer = api.create_not_initialized("BOOT", "Startup failed.", Some(cause(inner)));
//!
//! assert_eq!(
//!     outer.message(),
//!     "[API_BOOT] Api. Startup failed. [DB_CONNECT] Database. Connection refused."
//! );
//! ```
//!
//! ## Features
//!
//! No optional features. `serde` and `tracing` integrations are always on.

#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::{DateTime, TimeDelta, Utc};
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::result;

pub mod category;
pub mod convenience;
pub mod factory;
pub mod formatter;
pub mod logging;
pub mod payload;

pub use category::*;
pub use factory::*;
pub use formatter::*;
pub use logging::*;
pub use payload::*;

/// Type alias for Results using our exception type.
pub type Result<T> = result::Result<T, Exception>;

/// A single module-tagged exception.
///
/// # Key Properties
///
/// - `message` is composed once, at construction, and never changes
/// - `category` is fixed by the factory method that built the instance
/// - `timestamp` records construction time in UTC
/// - `cause` is shared by reference; chains are acyclic
/// - `subject` and `keys` are only ever set on `InvalidAtom` exceptions
///
/// Instances are only built through an [`ExceptionFactory`]; every field is
/// read-only afterwards.
#[must_use = "exceptions should be returned, raised or logged"]
#[derive(Clone)]
pub struct Exception {
    module: ModuleIdentity,
    error_code: Cow<'static, str>,
    msg: Cow<'static, str>,
    message: String,
    category: Category,
    timestamp: DateTime<Utc>,
    cause: Option<Cause>,
    subject: Option<Subject>,
    keys: Option<Keys>,
}

impl Exception {
    /// Assemble an exception. Only the factory calls this.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        module: ModuleIdentity,
        category: Category,
        error_code: Cow<'static, str>,
        msg: Cow<'static, str>,
        subject: Option<Subject>,
        keys: Option<Keys>,
        cause: Option<Cause>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let message = compose_message(&module, &error_code, &msg, cause.as_deref());
        Self {
            module,
            error_code,
            msg,
            message,
            category,
            timestamp,
            cause,
            subject,
            keys,
        }
    }

    /// Identity of the module that raised this exception.
    #[inline]
    pub fn module(&self) -> &ModuleIdentity {
        &self.module
    }

    /// Short module identifier.
    #[inline]
    pub fn module_code(&self) -> &str {
        self.module.code()
    }

    /// Human-readable module name.
    #[inline]
    pub fn module_name(&self) -> &str {
        self.module.name()
    }

    /// Error code, unique within the module.
    #[inline]
    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    /// The caller's message before composition.
    #[inline]
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Fully composed message:
    /// `[{module_code}_{error_code}] {module_name}. {msg}` plus the cause's
    /// message when it has one.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Category tag.
    #[inline]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Exception type name for the category.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.category.exception_name()
    }

    /// Capability check against the category hierarchy.
    ///
    /// An `AuthNotFound` exception answers true for both `AuthNotFound`
    /// and `NotFound`.
    #[inline]
    pub const fn is(&self, category: Category) -> bool {
        self.category.is_a(category)
    }

    /// Construction time.
    #[inline]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Time elapsed since construction.
    #[inline]
    pub fn age(&self) -> TimeDelta {
        Utc::now() - self.timestamp
    }

    /// Wrapped cause, if any.
    #[inline]
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Offending value of an invalid atom.
    #[inline]
    pub fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    /// Field names implicated in an invalid atom, in the order given.
    #[inline]
    pub fn keys(&self) -> Option<&[Cow<'static, str>]> {
        self.keys.as_deref()
    }

    /// This exception followed by every error in its cause chain.
    ///
    /// ```rust
    /// use module_exceptions::{cause, init};
    ///
    /// let f = init("M", "Mod");
    /// let root = f.create("A", "root", None);
    /// let top = f.create("B", "top", Some(cause(root)));
    /// assert_eq!(top.chain().count(), 2);
    /// ```
    pub fn chain(&self) -> impl Iterator<Item = &(dyn Error + 'static)> {
        std::iter::successors(Some(self as &(dyn Error + 'static)), |&err| err.source())
    }
}

/// Build the composed message.
///
/// A cause with an empty `Display` output contributes nothing.
fn compose_message(
    module: &ModuleIdentity,
    error_code: &str,
    msg: &str,
    cause: Option<&(dyn Error + Send + Sync + 'static)>,
) -> String {
    let mut message = format!(
        "[{}_{}] {}. {}",
        module.code(),
        error_code,
        module.name(),
        msg
    );

    if let Some(cause) = cause {
        let nested = cause.to_string();
        if !nested.is_empty() {
            message.push(' ');
            message.push_str(&nested);
        }
    }

    message
}

impl PartialEq for Exception {
    /// Structural equality.
    ///
    /// Causes compare by message, subjects by reference identity.
    fn eq(&self, other: &Self) -> bool {
        let causes_match = match (&self.cause, &other.cause) {
            (None, None) => true,
            (Some(a), Some(b)) => a.to_string() == b.to_string(),
            _ => false,
        };
        let subjects_match = match (&self.subject, &other.subject) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        };

        self.module == other.module
            && self.error_code == other.error_code
            && self.msg == other.msg
            && self.message == other.message
            && self.category == other.category
            && self.timestamp == other.timestamp
            && self.keys == other.keys
            && causes_match
            && subjects_match
    }
}

impl fmt::Debug for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.name())
            .field("module_code", &self.module.code())
            .field("module_name", &self.module.name())
            .field("error_code", &self.error_code)
            .field("category", &self.category)
            .field("message", &self.message)
            .field("timestamp", &self.timestamp)
            .field("cause", &self.cause.as_ref().map(|c| c.to_string()))
            .field("subject", &self.subject)
            .field("keys", &self.keys)
            .finish()
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for Exception {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use std::io;

    fn factory() -> ExceptionFactory {
        init("TST", "Test Module")
    }

    #[test]
    fn message_is_composed_from_identity_and_code() {
        let err = factory().create("E01", "Something broke.", None);
        assert_eq!(err.message(), "[TST_E01] Test Module. Something broke.");
        assert_eq!(err.to_string(), err.message());
        assert_eq!(err.msg(), "Something broke.");
    }

    #[test]
    fn cause_message_is_appended() {
        let inner = io::Error::other("disk full");
        let err = factory().create("E02", "Write failed.", Some(cause(inner)));
        assert_eq!(err.message(), "[TST_E02] Test Module. Write failed. disk full");
    }

    #[test]
    fn empty_cause_message_is_omitted() {
        let inner = io::Error::other("");
        let err = factory().create("E03", "Write failed.", Some(cause(inner)));
        assert_eq!(err.message(), "[TST_E03] Test Module. Write failed.");
        assert!(err.cause().is_some());
    }

    #[test]
    fn empty_inputs_do_not_fail() {
        let err = init("", "").create("", "", None);
        assert_eq!(err.message(), "[_] . ");
    }

    #[test]
    fn source_exposes_cause() {
        let inner = factory().create_not_found("E04", "missing", None);
        let outer = factory().create("E05", "wrapper", Some(cause(inner)));
        let source = outer.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("[TST_E04] Test Module. missing"));
    }

    #[test]
    fn chain_walks_every_level() {
        let f = factory();
        let a = f.create("A", "a", None);
        let b = f.create("B", "b", Some(cause(a)));
        let c = f.create("C", "c", Some(cause(b)));
        let codes: Vec<String> = c.chain().map(|e| e.to_string()).collect();
        assert_eq!(codes.len(), 3);
        assert!(codes[2].starts_with("[TST_A]"));
    }

    #[test]
    fn chain_links_outlive_the_iterator() {
        let f = factory();
        let root = f.create_not_found("ROOT", "root", None);
        let top = f.create("TOP", "top", Some(cause(root)));

        let links: Vec<&(dyn Error + 'static)> = top.chain().collect();
        let last = links.last().map(|e| e.to_string());
        let first = top.chain().next().map(|e| e.to_string());

        assert_eq!(links.len(), 2);
        assert_eq!(last.as_deref(), Some("[TST_ROOT] Test Module. root"));
        assert_eq!(first.as_deref(), Some(top.message()));
    }

    #[test]
    fn debug_names_the_exception_type() {
        let err = factory().create_invalid_book("E06", "bad book", None);
        let debug = format!("{:?}", err);
        assert!(debug.starts_with("InvalidBookException"));
        assert!(debug.contains("INVALID_BOOK") || debug.contains("InvalidBook"));
    }

    #[test]
    fn age_is_non_negative() {
        let err = factory().create("E07", "x", None);
        assert!(err.age() >= TimeDelta::zero());
    }

    #[test]
    fn exceptions_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Exception>();
        assert_send_sync::<ExceptionFactory>();
    }
}
