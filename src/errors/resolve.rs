use core::any::TypeId;

use super::instantiate::InstantiateErrorKind;
use crate::{any::TypeInfo, key::Key};

use alloc::string::String;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Undefined lookup: key {key:?} is not registered")]
    UndefinedLookup { key: String },
    #[error("Incorrect type for key {key:?}. Actual: {actual:?}, expected: {expected}")]
    IncorrectType { key: Key, expected: TypeInfo, actual: TypeId },
    #[error("Factory for key {key:?} failed")]
    Factory {
        key: Key,
        #[source]
        source: InstantiateErrorKind,
    },
}

impl ResolveErrorKind {
    /// Walks through nested factory failures and returns the innermost error.
    ///
    /// A missing dependency several levels down shows up as a chain of [`ResolveErrorKind::Factory`],
    /// this returns the lookup that actually failed.
    #[must_use]
    pub fn root_cause(&self) -> &ResolveErrorKind {
        let mut current = self;
        while let ResolveErrorKind::Factory {
            source: InstantiateErrorKind::Resolve(inner),
            ..
        } = current
        {
            current = &**inner;
        }
        current
    }
}
