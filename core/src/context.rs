//! Caller-supplied data visible while parsing and executing.
//!
//! A [`CommandContext`] is an immutable map from typed [`Key`]s to values.
//! Requirement predicates, argument types, and bound commands all read from
//! it; nothing in this crate ever writes to it after [`build`].
//!
//! [`build`]: CommandContextBuilder::build
//!
//! # Example
//!
//! ```
//! use command_dispatch_core::{CommandContext, Key};
//!
//! const USER: Key<String> = Key::new("user");
//! const ADMIN: Key<bool> = Key::new("admin");
//!
//! let context = CommandContext::builder()
//!     .put(&USER, "alice".to_string())
//!     .put(&ADMIN, true)
//!     .build();
//!
//! assert_eq!(context.find(&USER).map(String::as_str), Some("alice"));
//! assert_eq!(context.get(&ADMIN), Some(true));
//! assert!(context.require(&Key::<u32>::new("quota")).is_err());
//! ```

use std::any::{Any, TypeId, type_name};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::ContextError;

type Value = Box<dyn Any + Send + Sync>;

/// Typed lookup key. Two keys are equal when both the value type and the
/// name match.
pub struct Key<T> {
    name: Cow<'static, str>,
    _type: PhantomData<fn() -> T>,
}

impl<T: 'static> Key<T> {
    /// Creates a key with a static name, usable in `const` items.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _type: PhantomData,
        }
    }

    /// Creates a key with an owned name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            _type: PhantomData,
        }
    }

    /// The key name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the value type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _type: PhantomData,
        }
    }
}

impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for Key<T> {}

impl<T: 'static> Hash for Key<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        TypeId::of::<T>().hash(state);
        self.name.hash(state);
    }
}

impl<T: 'static> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("type", &type_name::<T>())
            .field("name", &self.name)
            .finish()
    }
}

/// Immutable, type-keyed data passed through a dispatch.
///
/// Cloning is cheap: clones share the same underlying map.
#[derive(Clone, Default)]
pub struct CommandContext {
    values: Arc<HashMap<TypeId, HashMap<String, Value>>>,
}

impl CommandContext {
    /// A context holding no values.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Starts building a context.
    pub fn builder() -> CommandContextBuilder {
        CommandContextBuilder::default()
    }

    fn lookup<T: 'static>(&self, key: &Key<T>) -> Option<&Value> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|by_name| by_name.get(key.name()))
    }

    /// Returns the value for `key`, or `None` if absent.
    pub fn find<T: 'static>(&self, key: &Key<T>) -> Option<&T> {
        self.lookup(key).and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns a copy of the value for `key`, or `None` if absent.
    pub fn get<T: Clone + 'static>(&self, key: &Key<T>) -> Option<T> {
        self.find(key).cloned()
    }

    /// Returns the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Missing`] if no value is stored under `key`.
    pub fn require<T: 'static>(&self, key: &Key<T>) -> Result<&T, ContextError> {
        self.find(key).ok_or_else(|| ContextError::Missing {
            name: key.name().to_string(),
            type_name: key.type_name(),
        })
    }

    /// Returns `true` if a value is stored under `key`.
    pub fn contains<T: 'static>(&self, key: &Key<T>) -> bool {
        self.lookup(key).is_some()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.values().map(HashMap::len).sum()
    }

    /// Returns `true` if the context holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self
            .values
            .values()
            .flat_map(|by_name| by_name.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        f.debug_struct("CommandContext")
            .field("keys", &names)
            .finish()
    }
}

/// Builder for [`CommandContext`].
#[derive(Default)]
pub struct CommandContextBuilder {
    values: HashMap<TypeId, HashMap<String, Value>>,
}

impl CommandContextBuilder {
    /// Stores `value` under `key`, replacing any earlier value for the same key.
    pub fn put<T: Send + Sync + 'static>(mut self, key: &Key<T>, value: T) -> Self {
        self.values
            .entry(TypeId::of::<T>())
            .or_default()
            .insert(key.name().to_string(), Box::new(value));
        self
    }

    /// Freezes the collected values.
    pub fn build(self) -> CommandContext {
        CommandContext {
            values: Arc::new(self.values),
        }
    }
}
