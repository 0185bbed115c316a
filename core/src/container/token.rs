//! Typed, identity-keyed tokens.
//!
//! A token binds a compile-time type `T` (usually a `dyn Trait`) to a
//! process-unique id, so lookups are statically typed without casts at the
//! call site. Two tokens are equal only if they are the same token: the name
//! is for diagnostics and plays no part in equality.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// Runtime identity of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(u64);

/// Phantom-typed key for a service or repository of type `T`
///
/// Declare tokens once, as statics:
///
/// ```
/// use once_cell::sync::Lazy;
/// use qz_core::container::ServiceToken;
///
/// pub trait Greeter: Send + Sync {}
///
/// pub static GREETER: Lazy<ServiceToken<dyn Greeter>> =
///     Lazy::new(|| ServiceToken::new("Greeter"));
/// ```
pub struct Token<T: ?Sized> {
    id: TokenId,
    name: &'static str,
    _marker: PhantomData<fn() -> Arc<T>>,
}

/// Token identifying a container-managed service
pub type ServiceToken<T> = Token<T>;

/// Token identifying a repository kind inside a unit of work
pub type RepositoryToken<T> = Token<T>;

impl<T: ?Sized> Token<T> {
    /// Mint a new token; every call yields a distinct identity
    pub fn new(name: &'static str) -> Self {
        Self {
            id: TokenId(NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed)),
            name,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    /// Display name used in logs and error messages
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: ?Sized> Clone for Token<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Token<T> {}

impl<T: ?Sized> PartialEq for Token<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: ?Sized> Eq for Token<T> {}

impl<T: ?Sized> Hash for Token<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("name", &self.name)
            .field("id", &self.id.0)
            .finish()
    }
}

impl<T: ?Sized> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
