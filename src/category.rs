//! Exception category taxonomy.
//!
//! Every exception carries exactly one [`Category`]. Categories exist for
//! classification and dispatch only: none of them changes how a message is
//! composed or how a cause is chained.
//!
//! # Hierarchy
//!
//! The taxonomy is flat except for two specializations:
//!
//! - `AuthNotFound` is a `NotFound`
//! - `AuthInvalidPassword` is an `InvalidRequest`
//!
//! "Is-a" relationships are resolved through a static ancestor table rather
//! than type inheritance. A category is always an ancestor of itself.
//!
//! ```rust
//! use module_exceptions::Category;
//!
//! assert!(Category::AuthNotFound.is_a(Category::NotFound));
//! assert!(!Category::NotFound.is_a(Category::AuthNotFound));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Category
// ============================================================================

/// Closed set of exception categories.
///
/// Small fieldless enum, passed by value everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Unclassified failure.
    General,
    /// A requested entity does not exist.
    NotFound,
    /// Authentication subject does not exist. Specializes `NotFound`.
    AuthNotFound,
    /// An atom failed validation. Carries the offending subject and keys.
    InvalidAtom,
    /// Caller lacks permission for the operation.
    Unauthorized,
    /// The request itself is malformed.
    InvalidRequest,
    /// Password check failed. Specializes `InvalidRequest`.
    AuthInvalidPassword,
    /// A component was used before initialization.
    NotInitialized,
    /// A book definition is invalid.
    InvalidBook,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 9] = [
        Self::General,
        Self::NotFound,
        Self::AuthNotFound,
        Self::InvalidAtom,
        Self::Unauthorized,
        Self::InvalidRequest,
        Self::AuthInvalidPassword,
        Self::NotInitialized,
        Self::InvalidBook,
    ];

    /// Stable upper-case tag (`NOT_FOUND`, `AUTH_NOT_FOUND`, ...).
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::NotFound => "NOT_FOUND",
            Self::AuthNotFound => "AUTH_NOT_FOUND",
            Self::InvalidAtom => "INVALID_ATOM",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::AuthInvalidPassword => "AUTH_INVALID_PASSWORD",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::InvalidBook => "INVALID_BOOK",
        }
    }

    /// Exception type name reported for this category.
    #[inline]
    pub const fn exception_name(&self) -> &'static str {
        match self {
            Self::General => "Exception",
            Self::NotFound => "NotFoundException",
            Self::AuthNotFound => "AuthNotFoundException",
            Self::InvalidAtom => "InvalidAtomException",
            Self::Unauthorized => "UnauthorizedException",
            Self::InvalidRequest => "InvalidRequestException",
            Self::AuthInvalidPassword => "AuthInvalidPasswordException",
            Self::NotInitialized => "NotInitializedException",
            Self::InvalidBook => "InvalidBookException",
        }
    }

    /// This category followed by its ancestors, nearest first.
    ///
    /// `General` appears only in its own chain; it is not a common parent.
    #[inline]
    pub const fn ancestors(&self) -> &'static [Category] {
        ancestry::chain(*self)
    }

    /// Direct parent in the hierarchy, if any.
    #[inline]
    pub const fn parent(&self) -> Option<Category> {
        match self.ancestors() {
            [_, parent, ..] => Some(*parent),
            _ => None,
        }
    }

    /// Check whether this category is `other` or specializes it.
    #[inline]
    pub const fn is_a(&self, other: Category) -> bool {
        let chain = self.ancestors();
        let mut i = 0;
        while i < chain.len() {
            if chain[i] as u8 == other as u8 {
                return true;
            }
            i += 1;
        }
        false
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Ancestor Table
// ============================================================================

/// Static ancestor chains, one per category.
mod ancestry {
    use super::Category::{self, *};

    const GENERAL: &[Category] = &[General];
    const NOT_FOUND: &[Category] = &[NotFound];
    const AUTH_NOT_FOUND: &[Category] = &[AuthNotFound, NotFound];
    const INVALID_ATOM: &[Category] = &[InvalidAtom];
    const UNAUTHORIZED: &[Category] = &[Unauthorized];
    const INVALID_REQUEST: &[Category] = &[InvalidRequest];
    const AUTH_INVALID_PASSWORD: &[Category] = &[AuthInvalidPassword, InvalidRequest];
    const NOT_INITIALIZED: &[Category] = &[NotInitialized];
    const INVALID_BOOK: &[Category] = &[InvalidBook];

    pub(super) const fn chain(category: Category) -> &'static [Category] {
        match category {
            General => GENERAL,
            NotFound => NOT_FOUND,
            AuthNotFound => AUTH_NOT_FOUND,
            InvalidAtom => INVALID_ATOM,
            Unauthorized => UNAUTHORIZED,
            InvalidRequest => INVALID_REQUEST,
            AuthInvalidPassword => AUTH_INVALID_PASSWORD,
            NotInitialized => NOT_INITIALIZED,
            InvalidBook => INVALID_BOOK,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_is_itself() {
        for category in Category::ALL {
            assert!(category.is_a(category));
            assert_eq!(category.ancestors()[0], category);
        }
    }

    #[test]
    fn specializations_report_parent() {
        assert!(Category::AuthNotFound.is_a(Category::NotFound));
        assert!(Category::AuthInvalidPassword.is_a(Category::InvalidRequest));
        assert_eq!(Category::AuthNotFound.parent(), Some(Category::NotFound));
        assert_eq!(
            Category::AuthInvalidPassword.parent(),
            Some(Category::InvalidRequest)
        );
    }

    #[test]
    fn parents_do_not_report_children() {
        assert!(!Category::NotFound.is_a(Category::AuthNotFound));
        assert!(!Category::InvalidRequest.is_a(Category::AuthInvalidPassword));
        assert_eq!(Category::NotFound.parent(), None);
    }

    #[test]
    fn general_is_not_a_common_parent() {
        for category in Category::ALL {
            if category != Category::General {
                assert!(!category.is_a(Category::General));
            }
        }
    }

    #[test]
    fn unrelated_categories_are_disjoint() {
        assert!(!Category::Unauthorized.is_a(Category::InvalidRequest));
        assert!(!Category::InvalidAtom.is_a(Category::InvalidBook));
        assert!(!Category::AuthNotFound.is_a(Category::InvalidRequest));
    }

    #[test]
    fn tags_and_names() {
        assert_eq!(Category::AuthInvalidPassword.to_string(), "AUTH_INVALID_PASSWORD");
        assert_eq!(Category::General.exception_name(), "Exception");
        assert_eq!(Category::InvalidBook.exception_name(), "InvalidBookException");
    }

    #[test]
    fn serde_uses_upper_case_tags() {
        let json = serde_json::to_string(&Category::NotInitialized).unwrap();
        assert_eq!(json, "\"NOT_INITIALIZED\"");
        let back: Category = serde_json::from_str("\"AUTH_NOT_FOUND\"").unwrap();
        assert_eq!(back, Category::AuthNotFound);
    }
}
