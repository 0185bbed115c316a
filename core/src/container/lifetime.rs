//! Service lifetime definitions.

/// Controls whether the container caches what a factory builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// Built once per container, shared by every resolver
    #[default]
    Singleton,
    /// Built on every resolution, never cached
    Transient,
}

impl Lifetime {
    pub fn is_singleton(&self) -> bool {
        matches!(self, Lifetime::Singleton)
    }
}
