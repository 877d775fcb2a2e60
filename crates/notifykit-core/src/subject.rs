//! Subjects: the identity key that scopes an observer to one emitter.
//!
//! ## Matching semantics
//!
//! | Kind       | Built from             | Two subjects match when            |
//! |------------|------------------------|------------------------------------|
//! | `Object`   | `&Arc<T>`              | both point at the same allocation  |
//! | `Int`      | integers (`i64`, ...)  | the values are equal               |
//! | `Str`      | `&str` / `String`      | the strings are equal              |
//!
//! Subjects of different kinds never match. Object subjects never look at
//! the contents of `T`: two distinct `Arc`s holding equal values are
//! different subjects.

use std::any::Any;
use std::hash::{Hash, Hasher};
use std::num::TryFromIntError;
use std::sync::{Arc, Weak};

/// Pointer-identity key for a shared object.
///
/// Keeps a `Weak` to the allocation so its address cannot be handed out to a
/// new object while the key exists. The value itself is not kept alive.
#[derive(Clone)]
pub struct ObjectKey {
    addr: usize,
    anchor: Weak<dyn Any + Send + Sync>,
}

impl ObjectKey {
    fn of<T: Any + Send + Sync>(object: &Arc<T>) -> Self {
        let anchor: Weak<dyn Any + Send + Sync> = Arc::<T>::downgrade(object);
        Self {
            addr: Arc::as_ptr(object) as *const () as usize,
            anchor,
        }
    }

    /// True while the object this key was built from is still alive.
    pub fn is_alive(&self) -> bool {
        self.anchor.strong_count() > 0
    }
}

impl PartialEq for ObjectKey {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl Eq for ObjectKey {}

impl Hash for ObjectKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr.hash(state);
    }
}

impl std::fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectKey(0x{:x})", self.addr)
    }
}

/// Identity of the emitter a message is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    /// A shared object, compared by pointer identity.
    Object(ObjectKey),
    /// An integer, compared by value.
    Int(i64),
    /// A string, compared by value.
    Str(Arc<str>),
}

impl Subject {
    /// Subject keyed on the identity of a shared object.
    pub fn object<T: Any + Send + Sync>(object: &Arc<T>) -> Self {
        Subject::Object(ObjectKey::of(object))
    }

    /// Whether `other` denotes the same subject.
    ///
    /// Same as `==`; spelled out for call sites that read as an identity test.
    pub fn same_as(&self, other: &Subject) -> bool {
        self == other
    }

    /// Short kind name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Subject::Object(_) => "object",
            Subject::Int(_) => "int",
            Subject::Str(_) => "str",
        }
    }
}

macro_rules! int_subject {
    ($($t:ty),*) => {$(
        impl From<$t> for Subject {
            fn from(value: $t) -> Self {
                Subject::Int(i64::from(value))
            }
        }
    )*};
}

int_subject!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! try_int_subject {
    ($($t:ty),*) => {$(
        impl TryFrom<$t> for Subject {
            type Error = TryFromIntError;

            fn try_from(value: $t) -> Result<Self, Self::Error> {
                i64::try_from(value).map(Subject::Int)
            }
        }
    )*};
}

// widths that may not fit in an `i64`
try_int_subject!(u64, usize, isize);

impl From<&str> for Subject {
    fn from(value: &str) -> Self {
        Subject::Str(Arc::from(value))
    }
}

impl From<String> for Subject {
    fn from(value: String) -> Self {
        Subject::Str(Arc::from(value))
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subject::Object(key) => write!(f, "object@0x{:x}", key.addr),
            Subject::Int(v) => write!(f, "{v}"),
            Subject::Str(s) => write!(f, "{s:?}"),
        }
    }
}
