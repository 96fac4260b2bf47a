use alloc::string::String;
use core::{
    borrow::Borrow,
    fmt::{self, Debug, Display, Formatter},
    ops::Deref,
};

use crate::{errors::RegistryErrorKind, utils::thread_safety::RcThreadSafety};

/// Names that can't be used as keys.
///
/// These are the registry's own operations plus the usual object protocol names,
/// so an entry never shadows a method a caller might expect on the registry.
pub const RESERVED_KEYS: &[&str] = &[
    // Registry operations
    "new",
    "register",
    "register_singleton",
    "register_with_config",
    "singleton",
    "forget",
    "forget_all",
    "get",
    "get_any",
    "contains",
    "is_singleton",
    "is_resolved",
    "keys",
    "len",
    "is_empty",
    "with_map",
    "with_singleton_map",
    // Object protocol
    "as_ref",
    "borrow",
    "clone",
    "debug",
    "default",
    "deref",
    "drop",
    "eq",
    "fmt",
    "from",
    "hash",
    "inspect",
    "into",
    "to_owned",
    "to_string",
    "type_id",
];

/// Validated name of a registry entry.
///
/// A key starts with a lowercase ASCII letter or `_`, continues with ASCII letters, digits, `_` or `-`,
/// and isn't one of [`RESERVED_KEYS`].
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(RcThreadSafety<str>);

impl Key {
    /// # Errors
    /// Returns [`RegistryErrorKind::InvalidKey`] if the name breaks the key rules
    pub fn new(name: &str) -> Result<Self, RegistryErrorKind> {
        if is_valid(name) {
            Ok(Self(RcThreadSafety::from(name)))
        } else {
            Err(RegistryErrorKind::InvalidKey { key: String::from(name) })
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[must_use]
fn is_valid(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_lowercase() || first == '_') {
        return false;
    }
    if !chars.all(|char| char.is_ascii_alphanumeric() || char == '_' || char == '-') {
        return false;
    }

    !RESERVED_KEYS.contains(&name)
}

impl Deref for Key {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Key {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Key {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Debug for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&*self.0, f)
    }
}
