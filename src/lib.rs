#![no_std]

extern crate alloc;

#[macro_use]
pub(crate) mod registry_macros;

pub(crate) mod any;
pub(crate) mod config;
pub(crate) mod errors;
pub(crate) mod factory;
pub(crate) mod key;
pub(crate) mod registry;

pub mod utils;

pub use any::TypeInfo;
pub use config::Config;
pub use errors::{FactoryResult, InstantiateErrorKind, RegistryErrorKind, ResolveErrorKind};
pub use factory::{Arity, Callback, Factory, NoArg, SelfAware};
pub use key::{Key, RESERVED_KEYS};
pub use registry::Registry;
