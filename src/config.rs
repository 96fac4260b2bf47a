/// Config for a registry entry
/// ## Fields
/// - `cache_provides`:
///   If `true`, the value produced by the factory on the first lookup is cached and
///   returned on every following lookup without calling the factory again.
///
///   This does **not** affect the entries the factory looks up itself.
///   Each of them follows its own config.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub cache_provides: bool,
}

impl Config {
    /// Config of entries added with [`crate::Registry::register`]
    #[inline]
    #[must_use]
    pub const fn transient() -> Self {
        Self { cache_provides: false }
    }

    /// Config of entries added with [`crate::Registry::register_singleton`]
    #[inline]
    #[must_use]
    pub const fn singleton() -> Self {
        Self { cache_provides: true }
    }
}
