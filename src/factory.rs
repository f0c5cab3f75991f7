//! Per-module exception factories.
//!
//! A module calls [`init`] once with its code and name and keeps the
//! returned [`ExceptionFactory`]. Every exception the factory builds is
//! stamped with that identity.
//!
//! # Construction Contract
//!
//! - Pure: no I/O, no logging, no shared mutable state
//! - Total: never fails, never panics, whatever the inputs
//! - Empty `error_code` or `msg` are accepted and produce an odd-looking
//!   message segment
//!
//! # Example
//!
//! ```rust
//! use module_exceptions::{Category, init, keys, Subject};
//!
//! let exc = init("ATM", "Atom Module");
//!
//! let err = exc.create_invalid_atom(
//!     "VALIDATE",
//!     "Invalid fields.",
//!     Some(Subject::new(42u32)),
//!     Some(keys(["email"])),
//!     None,
//! );
//!
//! assert_eq!(err.category(), Category::InvalidAtom);
//! assert_eq!(err.subject().and_then(|s| s.downcast_ref::<u32>()), Some(&42));
//! ```

use crate::{Category, Cause, Exception, Keys, Subject};
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Timestamp source used by a factory.
pub type Clock = fn() -> DateTime<Utc>;

// ============================================================================
// Module Identity
// ============================================================================

/// The `(module_code, module_name)` pair a factory stamps on exceptions.
///
/// Both strings are reference counted, so cloning an identity (and every
/// exception carrying it) is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleIdentity {
    code: Arc<str>,
    name: Arc<str>,
}

impl ModuleIdentity {
    /// Create an identity.
    #[inline]
    pub fn new(code: impl Into<Arc<str>>, name: impl Into<Arc<str>>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Short module identifier (e.g. a subsystem acronym).
    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable module name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.name)
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Bind a factory to a module identity.
///
/// Each call yields an independent factory; nothing is registered globally.
#[inline]
pub fn init(
    module_code: impl Into<Arc<str>>,
    module_name: impl Into<Arc<str>>,
) -> ExceptionFactory {
    ExceptionFactory::new(ModuleIdentity::new(module_code, module_name))
}

/// Builds exceptions of every category for one module.
///
/// Stateless beyond the module identity and its clock. Cheap to clone and
/// safe to share across threads.
#[derive(Debug, Clone)]
pub struct ExceptionFactory {
    module: ModuleIdentity,
    clock: Clock,
}

impl ExceptionFactory {
    /// Factory for `module` using the system clock.
    #[inline]
    pub fn new(module: ModuleIdentity) -> Self {
        Self {
            module,
            clock: Utc::now,
        }
    }

    /// Replace the timestamp source.
    ///
    /// ```rust
    /// use chrono::{DateTime, TimeZone, Utc};
    /// use module_exceptions::init;
    ///
    /// fn epoch() -> DateTime<Utc> {
    ///     Utc.timestamp_opt(0, 0).unwrap()
    /// }
    ///
    /// let exc = init("CLK", "Clock").with_clock(epoch);
    /// assert_eq!(exc.create("E", "m", None).timestamp().timestamp(), 0);
    /// ```
    #[inline]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Identity stamped on every exception.
    #[inline]
    pub fn module(&self) -> &ModuleIdentity {
        &self.module
    }

    /// Build an exception of any category, without invalid-atom payload.
    #[inline]
    pub fn create_with(
        &self,
        category: Category,
        error_code: impl Into<Cow<'static, str>>,
        msg: impl Into<Cow<'static, str>>,
        cause: Option<Cause>,
    ) -> Exception {
        self.build(category, error_code.into(), msg.into(), None, None, cause)
    }

    fn build(
        &self,
        category: Category,
        error_code: Cow<'static, str>,
        msg: Cow<'static, str>,
        subject: Option<Subject>,
        keys: Option<Keys>,
        cause: Option<Cause>,
    ) -> Exception {
        Exception::assemble(
            self.module.clone(),
            category,
            error_code,
            msg,
            subject,
            keys,
            cause,
            (self.clock)(),
        )
    }

    // One constructor per category.

    /// Create a `General` exception.
    #[inline]
    pub fn create(
        &self,
        error_code: impl Into<Cow<'static, str>>,
        msg: impl Into<Cow<'static, str>>,
        cause: Option<Cause>,
    ) -> Exception {
        self.create_with(Category::General, error_code, msg, cause)
    }

    /// Create a `NotFound` exception.
    #[inline]
    pub fn create_not_found(
        &self,
        error_code: impl Into<Cow<'static, str>>,
        msg: impl Into<Cow<'static, str>>,
        cause: Option<Cause>,
    ) -> Exception {
        self.create_with(Category::NotFound, error_code, msg, cause)
    }

    /// Create an `AuthNotFound` exception. Also answers to `NotFound`.
    #[inline]
    pub fn create_auth_not_found(
        &self,
        error_code: impl Into<Cow<'static, str>>,
        msg: impl Into<Cow<'static, str>>,
        cause: Option<Cause>,
    ) -> Exception {
        self.create_with(Category::AuthNotFound, error_code, msg, cause)
    }

    /// Create an `InvalidAtom` exception.
    ///
    /// `subject` and `keys` are stored as given; `None` leaves them absent.
    #[inline]
    pub fn create_invalid_atom(
        &self,
        error_code: impl Into<Cow<'static, str>>,
        msg: impl Into<Cow<'static, str>>,
        subject: Option<Subject>,
        keys: Option<Keys>,
        cause: Option<Cause>,
    ) -> Exception {
        self.build(
            Category::InvalidAtom,
            error_code.into(),
            msg.into(),
            subject,
            keys,
            cause,
        )
    }

    /// Create an `Unauthorized` exception.
    #[inline]
    pub fn create_unauthorized(
        &self,
        error_code: impl Into<Cow<'static, str>>,
        msg: impl Into<Cow<'static, str>>,
        cause: Option<Cause>,
    ) -> Exception {
        self.create_with(Category::Unauthorized, error_code, msg, cause)
    }

    /// Create an `InvalidRequest` exception.
    #[inline]
    pub fn create_invalid_request(
        &self,
        error_code: impl Into<Cow<'static, str>>,
        msg: impl Into<Cow<'static, str>>,
        cause: Option<Cause>,
    ) -> Exception {
        self.create_with(Category::InvalidRequest, error_code, msg, cause)
    }

    /// Create an `AuthInvalidPassword` exception. Also answers to
    /// `InvalidRequest`.
    #[inline]
    pub fn create_auth_invalid_password(
        &self,
        error_code: impl Into<Cow<'static, str>>,
        msg: impl Into<Cow<'static, str>>,
        cause: Option<Cause>,
    ) -> Exception {
        self.create_with(Category::AuthInvalidPassword, error_code, msg, cause)
    }

    /// Create a `NotInitialized` exception.
    #[inline]
    pub fn create_not_initialized(
        &self,
        error_code: impl Into<Cow<'static, str>>,
        msg: impl Into<Cow<'static, str>>,
        cause: Option<Cause>,
    ) -> Exception {
        self.create_with(Category::NotInitialized, error_code, msg, cause)
    }

    /// Create an `InvalidBook` exception.
    #[inline]
    pub fn create_invalid_book(
        &self,
        error_code: impl Into<Cow<'static, str>>,
        msg: impl Into<Cow<'static, str>>,
        cause: Option<Cause>,
    ) -> Exception {
        self.create_with(Category::InvalidBook, error_code, msg, cause)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cause, keys};
    use chrono::TimeZone;

    fn fixed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    fn factory() -> ExceptionFactory {
        init("FAC", "Factory Module")
    }

    // ========================================================================
    // Category Invariance
    // ========================================================================

    #[test]
    fn each_method_fixes_its_category() {
        let f = factory();
        let cases = [
            (f.create("C", "m", None), Category::General),
            (f.create_not_found("C", "m", None), Category::NotFound),
            (f.create_auth_not_found("C", "m", None), Category::AuthNotFound),
            (
                f.create_invalid_atom("C", "m", None, None, None),
                Category::InvalidAtom,
            ),
            (f.create_unauthorized("C", "m", None), Category::Unauthorized),
            (f.create_invalid_request("C", "m", None), Category::InvalidRequest),
            (
                f.create_auth_invalid_password("C", "m", None),
                Category::AuthInvalidPassword,
            ),
            (f.create_not_initialized("C", "m", None), Category::NotInitialized),
            (f.create_invalid_book("C", "m", None), Category::InvalidBook),
        ];

        for (err, expected) in cases {
            assert_eq!(err.category(), expected);
            assert_eq!(err.name(), expected.exception_name());
        }
    }

    #[test]
    fn specialized_categories_answer_to_parents() {
        let f = factory();
        let auth = f.create_auth_not_found("C", "m", None);
        assert!(auth.is(Category::AuthNotFound));
        assert!(auth.is(Category::NotFound));
        assert!(!auth.is(Category::InvalidRequest));

        let password = f.create_auth_invalid_password("C", "m", None);
        assert!(password.is(Category::InvalidRequest));
        assert!(!password.is(Category::NotFound));
    }

    #[test]
    fn create_with_matches_named_methods() {
        let f = factory().with_clock(fixed);
        assert_eq!(
            f.create_with(Category::Unauthorized, "C", "m", None),
            f.create_unauthorized("C", "m", None)
        );
    }

    // ========================================================================
    // Identity & Payload
    // ========================================================================

    #[test]
    fn identity_is_stamped_on_every_exception() {
        let err = factory().create_not_initialized("BOOT", "not ready", None);
        assert_eq!(err.module_code(), "FAC");
        assert_eq!(err.module_name(), "Factory Module");
        assert_eq!(err.error_code(), "BOOT");
        assert_eq!(err.module().to_string(), "FAC (Factory Module)");
    }

    #[test]
    fn invalid_atom_round_trips_payload() {
        let subject = Subject::new(vec![1u8, 2, 3]);
        let err = factory().create_invalid_atom(
            "ATOM",
            "bad atom",
            Some(subject.clone()),
            Some(keys(["name", "age"])),
            None,
        );

        assert!(err.subject().is_some_and(|s| s.ptr_eq(&subject)));
        let stored: Vec<&str> = err
            .keys()
            .unwrap_or_default()
            .iter()
            .map(|k| k.as_ref())
            .collect();
        assert_eq!(stored, ["name", "age"]);
    }

    #[test]
    fn omitted_payload_stays_absent() {
        let err = factory().create_invalid_atom("ATOM", "bad atom", None, None, None);
        assert!(err.subject().is_none());
        assert!(err.keys().is_none());

        let other = factory().create_not_found("NF", "gone", None);
        assert!(other.subject().is_none());
        assert!(other.keys().is_none());
    }

    #[test]
    fn cause_is_retained_by_reference() {
        let inner = cause(factory().create("IN", "inner", None));
        let outer = factory().create_invalid_request("OUT", "outer", Some(inner.clone()));
        assert!(outer.cause().is_some_and(|c| Arc::ptr_eq(c, &inner)));
    }

    // ========================================================================
    // Timestamps
    // ========================================================================

    #[test]
    fn timestamp_falls_within_the_call() {
        let before = Utc::now();
        let err = factory().create("T", "time", None);
        let after = Utc::now();
        assert!(before <= err.timestamp());
        assert!(err.timestamp() <= after);
    }

    #[test]
    fn independent_factories_build_equal_exceptions() {
        let a = init("EQ", "Equal").with_clock(fixed);
        let b = init("EQ", "Equal").with_clock(fixed);

        let x = a.create_not_found("N", "missing", None);
        let y = b.create_not_found("N", "missing", None);
        assert_eq!(x, y);
        assert!(!std::ptr::eq(&x, &y));
    }

    #[test]
    fn different_codes_are_not_equal() {
        let f = factory().with_clock(fixed);
        assert_ne!(f.create("A", "m", None), f.create("B", "m", None));
    }

    #[test]
    fn owned_strings_are_accepted() {
        let code = format!("E{}", 42);
        let factory = init(String::from("OWN"), String::from("Owned"));
        let err = factory.create(code, String::from("x"), None);
        assert_eq!(err.message(), "[OWN_E42] Owned. x");
    }
}
