use crate::key::Key;

use alloc::string::String;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryErrorKind {
    #[error("Invalid key \"{key}\"")]
    InvalidKey { key: String },
    #[error("Key \"{key}\" already registered")]
    KeyAlreadyRegistered { key: Key },
    #[error("Invalid callback")]
    InvalidCallback { key: Key },
    #[error("Key {key} is not registered")]
    KeyNotRegistered { key: String },
}
