//! Auxiliary payload carried by exceptions.
//!
//! - [`Subject`]: opaque value attached to invalid-atom exceptions
//! - [`Keys`]: ordered field names implicated in an invalid atom
//! - [`Cause`]: a previously constructed error wrapped by a new one
//!
//! Subjects are type-erased on the way in and recovered by downcasting on
//! the way out. The crate never inspects them; callers know what they stored.

use smallvec::SmallVec;
use std::any::Any;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a wrapped error.
///
/// Causes are always pre-existing errors, so a chain built from them is
/// singly linked and acyclic.
pub type Cause = Arc<dyn Error + Send + Sync + 'static>;

/// Wrap any error as a [`Cause`].
#[inline]
pub fn cause<E>(error: E) -> Cause
where
    E: Error + Send + Sync + 'static,
{
    Arc::new(error)
}

// ============================================================================
// Keys
// ============================================================================

/// Ordered field names. Most invalid atoms implicate one or two fields, so
/// up to four are stored inline.
pub type Keys = SmallVec<[Cow<'static, str>; 4]>;

/// Build [`Keys`] from anything yielding string-like items.
///
/// ```rust
/// use module_exceptions::keys;
///
/// let k = keys(["email", "password"]);
/// assert_eq!(k.len(), 2);
/// assert_eq!(k[1], "password");
/// ```
pub fn keys<I, S>(names: I) -> Keys
where
    I: IntoIterator<Item = S>,
    S: Into<Cow<'static, str>>,
{
    names.into_iter().map(Into::into).collect()
}

// ============================================================================
// Subject
// ============================================================================

/// Opaque, shareable value attached to an invalid-atom exception.
///
/// Cloning a `Subject` clones the handle, not the value. Two subjects are
/// the same subject when they point at the same allocation.
#[derive(Clone)]
pub struct Subject(Arc<dyn Any + Send + Sync>);

impl Subject {
    /// Type-erase `value`.
    #[inline]
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self(Arc::new(value))
    }

    /// Wrap an already shared value without re-allocating.
    #[inline]
    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self(value)
    }

    /// Borrow the value as `T` if that is what was stored.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Check the stored type without borrowing.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Reference identity.
    #[inline]
    pub fn ptr_eq(&self, other: &Subject) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subject(<opaque>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Atom {
        id: u32,
    }

    #[test]
    fn subject_downcasts_to_stored_type() {
        let subject = Subject::new(Atom { id: 7 });
        assert!(subject.is::<Atom>());
        assert_eq!(subject.downcast_ref::<Atom>(), Some(&Atom { id: 7 }));
        assert!(subject.downcast_ref::<String>().is_none());
    }

    #[test]
    fn cloned_subject_shares_identity() {
        let a = Subject::new(5u8);
        let b = a.clone();
        let c = Subject::new(5u8);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn from_arc_keeps_the_allocation() {
        let shared: Arc<dyn Any + Send + Sync> = Arc::new(Atom { id: 3 });
        let subject = Subject::from_arc(Arc::clone(&shared));
        assert_eq!(subject.downcast_ref::<Atom>(), Some(&Atom { id: 3 }));
        assert!(subject.ptr_eq(&Subject::from_arc(shared)));
    }

    #[test]
    fn subject_debug_is_opaque() {
        let subject = Subject::new(String::from("secret"));
        assert_eq!(format!("{:?}", subject), "Subject(<opaque>)");
    }

    #[test]
    fn keys_preserve_order() {
        let k = keys(vec![String::from("b"), String::from("a"), String::from("c")]);
        let names: Vec<&str> = k.iter().map(|s| s.as_ref()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn keys_spill_past_inline_capacity() {
        let k = keys(["a", "b", "c", "d", "e"]);
        assert_eq!(k.len(), 5);
        assert!(k.spilled());
    }

    #[test]
    fn cause_wraps_io_error() {
        let c = cause(std::io::Error::other("disk gone"));
        assert_eq!(c.to_string(), "disk gone");
    }
}
