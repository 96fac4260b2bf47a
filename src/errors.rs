mod instantiate;
mod registry;
mod resolve;

pub use instantiate::InstantiateErrorKind;
pub use registry::RegistryErrorKind;
pub use resolve::ResolveErrorKind;

/// Result returned by factories.
///
/// A factory can `?` both a dependency lookup and any `anyhow`-compatible error,
/// since both convert into [`InstantiateErrorKind`].
pub type FactoryResult<T, Err = InstantiateErrorKind> = Result<T, Err>;
