/// Builds a [`Registry`](crate::Registry) from a list of entries.
///
/// Each entry is `register(key => factory)` for a non-cached entry or `singleton(key => factory)`
/// (`register_singleton` works too) for a cached one. Keys are identifiers or string literals.
/// Entries are registered in the written order and the first error is returned.
///
/// # Examples
/// ```rust
/// use keyreg::{registry, Registry};
///
/// let registry = registry! {
///     singleton(bar => |registry: &Registry| {
///         let foo = registry.get::<String>("foo")?;
///         Ok(format!("{foo}B"))
///     }),
///     singleton(foo => || Ok(String::from("A"))),
///     register("with-dash" => || Ok(1_u8)),
/// }
/// .unwrap();
///
/// assert_eq!(*registry.get::<String>("bar").unwrap(), "AB");
/// ```
#[macro_export]
macro_rules! registry {
    () => {
        ::core::result::Result::<$crate::Registry, $crate::RegistryErrorKind>::Ok($crate::Registry::new())
    };
    (
        $(
            $kind:ident ( $key:tt => $factory:expr )
        ),* $(,)?
    ) => {{
        let registry = $crate::Registry::new();
        'registry: {
            $(
                if let ::core::result::Result::Err(err) = $crate::registry_internal! { @entry registry, $kind, $key, $factory } {
                    break 'registry ::core::result::Result::Err(err);
                }
            )*
            ::core::result::Result::<$crate::Registry, $crate::RegistryErrorKind>::Ok(registry)
        }
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! registry_internal {
    // === Entry kinds ===
    // Example: registry_internal! { @entry registry, register, foo, || Ok(1) }
    (@entry $registry:ident, register, $key:tt, $factory:expr) => {
        $registry.register($crate::registry_internal! { @key $key }, $factory)
    };
    (@entry $registry:ident, singleton, $key:tt, $factory:expr) => {
        $registry.register_singleton($crate::registry_internal! { @key $key }, $factory)
    };
    (@entry $registry:ident, register_singleton, $key:tt, $factory:expr) => {
        $registry.register_singleton($crate::registry_internal! { @key $key }, $factory)
    };

    // === Keys ===
    // Example: registry_internal! { @key foo }
    (@key $key:ident) => {
        ::core::stringify!($key)
    };
    // Example: registry_internal! { @key "foo-bar" }
    (@key $key:literal) => {
        $key
    };
}
