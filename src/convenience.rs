//! Convenience macro for creating exceptions with format strings.
//!
//! # Rules
//!
//! 1. **The category is a [`Category`](crate::Category) variant name**, not a
//!    value: `NotFound`, `AuthInvalidPassword`, ...
//! 2. **Format strings MUST be string literals**, as with `format!`
//! 3. **Causes are named** with `caused_by:` and may be any error type
//!
//! # Usage
//!
//! ```rust
//! use module_exceptions::{Category, exception, init};
//!
//! let users = init("USR", "Users");
//! let id = 42;
//!
//! let err = exception!(users, NotFound, "FIND", "User {} not found.", id);
//! assert_eq!(err.message(), "[USR_FIND] Users. User 42 not found.");
//! assert_eq!(err.category(), Category::NotFound);
//!
//! let io = std::io::Error::other("timeout");
//! let err = exception!(users, NotInitialized, "BOOT", caused_by: io, "Pool not ready.");
//! assert_eq!(err.message(), "[USR_BOOT] Users. Pool not ready. timeout");
//! ```
//!
//! ```rust,compile_fail
//! # use module_exceptions::{exception, init};
//! let f = init("M", "Mod");
//! let fmt = "dynamic {}";
//! // Format string must be a literal
//! let err = exception!(f, General, "E", fmt, 1);
//! ```
//!
//! Invalid atoms carry a subject and keys; build those with
//! [`ExceptionFactory::create_invalid_atom`](crate::ExceptionFactory::create_invalid_atom)
//! directly. The macro never attaches them.

/// Create an exception through a factory with a formatted message.
///
/// # Arguments
/// - `$factory`: an [`ExceptionFactory`](crate::ExceptionFactory) (expression)
/// - `$category`: a [`Category`](crate::Category) variant name
/// - `$code`: error code (expression)
/// - `caused_by: $cause`: optional wrapped error
/// - `$fmt`, `$args`: message format literal and arguments
#[macro_export]
macro_rules! exception {
    ($factory:expr, $category:ident, $code:expr, caused_by: $cause:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $factory.create_with(
            $crate::Category::$category,
            $code,
            format!($fmt $(, $arg)*),
            Some($crate::cause($cause)),
        )
    };
    ($factory:expr, $category:ident, $code:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $factory.create_with(
            $crate::Category::$category,
            $code,
            format!($fmt $(, $arg)*),
            None,
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::{Category, Exception, ExceptionFactory, init};
    use std::error::Error;

    fn factory() -> ExceptionFactory {
        init("MAC", "Macro Module")
    }

    #[test]
    fn literal_message_without_args() {
        let f = factory();
        let err = exception!(f, General, "E01", "plain");
        assert_eq!(err.message(), "[MAC_E01] Macro Module. plain");
        assert_eq!(err.category(), Category::General);
        assert!(err.cause().is_none());
    }

    #[test]
    fn format_args_are_applied() {
        let f = factory();
        let name = "ledger";
        let err = exception!(f, InvalidBook, "E02", "Book {} has {} pages.", name, 0);
        assert_eq!(err.msg(), "Book ledger has 0 pages.");
        assert!(err.is(Category::InvalidBook));
    }

    #[test]
    fn trailing_comma_is_accepted() {
        let f = factory();
        let err = exception!(f, Unauthorized, "E03", "user {}", 9,);
        assert_eq!(err.msg(), "user 9");
    }

    #[test]
    fn specialized_category_keeps_parent_capability() {
        let f = factory();
        let err = exception!(f, AuthNotFound, "E04", "no account");
        assert!(err.is(Category::AuthNotFound));
        assert!(err.is(Category::NotFound));
    }

    #[test]
    fn caused_by_wraps_and_appends() {
        let f = factory();
        let inner = f.create_not_found("E05", "row missing", None);
        let err: Exception =
            exception!(f, InvalidRequest, "E06", caused_by: inner, "Lookup {} failed.", 3);

        assert_eq!(
            err.message(),
            "[MAC_E06] Macro Module. Lookup 3 failed. [MAC_E05] Macro Module. row missing"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn macro_matches_factory_method() {
        let f = factory();
        let from_macro = exception!(f, NotInitialized, "E07", "not ready");
        let direct = f.create_not_initialized("E07", "not ready", None);
        assert_eq!(from_macro.message(), direct.message());
        assert_eq!(from_macro.category(), direct.category());
    }

    #[test]
    fn owned_error_code_is_accepted() {
        let f = factory();
        let code = format!("E{:02}", 8);
        let err = exception!(f, General, code, "dynamic code");
        assert_eq!(err.error_code(), "E08");
    }
}
