use core::fmt::{self, Debug, Formatter};
use tracing::debug;

use crate::{
    errors::InstantiateErrorKind,
    registry::Registry,
    utils::thread_safety::{
        NoArgFnThreadSafety, RcAnyThreadSafety, RcThreadSafety, SelfAwareFnThreadSafety, SendSafety, SyncSafety,
    },
};

/// Marker for factories that take no arguments
pub enum NoArg {}

/// Marker for factories that take the registry they're registered in
pub enum SelfAware {}

/// Number of arguments a factory takes, decided from its signature at registration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    /// `Fn() -> Result<T, E>`
    NoArg,
    /// `Fn(&Registry) -> Result<T, E>`
    SelfAware,
}

/// Callable producing the value of a registry entry.
///
/// Implemented for closures and functions of the form `Fn() -> Result<T, E>` and `Fn(&Registry) -> Result<T, E>`.
/// The second form gets the registry the entry lives in, so it can look up other entries
/// at the moment it's called rather than at the moment it's registered.
pub trait Factory<Args>: SendSafety + SyncSafety + Sized + 'static {
    type Error: Into<InstantiateErrorKind>;

    #[must_use]
    fn into_callback(self) -> Callback;
}

impl<F, Response, Err> Factory<NoArg> for F
where
    F: Fn() -> Result<Response, Err> + SendSafety + SyncSafety + 'static,
    Response: SendSafety + SyncSafety + 'static,
    Err: Into<InstantiateErrorKind>,
{
    type Error = Err;

    fn into_callback(self) -> Callback {
        let call: RcThreadSafety<NoArgFnThreadSafety> = RcThreadSafety::new(move || -> Result<RcAnyThreadSafety, InstantiateErrorKind> {
            match self() {
                Ok(value) => {
                    debug!("Instantiated");
                    Ok(RcThreadSafety::new(value))
                }
                Err(err) => Err(err.into()),
            }
        });
        Callback(CallbackKind::NoArg(call))
    }
}

impl<F, Response, Err> Factory<SelfAware> for F
where
    F: Fn(&Registry) -> Result<Response, Err> + SendSafety + SyncSafety + 'static,
    Response: SendSafety + SyncSafety + 'static,
    Err: Into<InstantiateErrorKind>,
{
    type Error = Err;

    fn into_callback(self) -> Callback {
        let call: RcThreadSafety<SelfAwareFnThreadSafety> = RcThreadSafety::new(move |registry: &Registry| -> Result<RcAnyThreadSafety, InstantiateErrorKind> {
            match self(registry) {
                Ok(value) => {
                    debug!("Instantiated");
                    Ok(RcThreadSafety::new(value))
                }
                Err(err) => Err(err.into()),
            }
        });
        Callback(CallbackKind::SelfAware(call))
    }
}

/// Type-erased factory, as stored by the registry.
///
/// Cloning is cheap and shares the underlying factory.
#[derive(Clone)]
pub struct Callback(CallbackKind);

#[derive(Clone)]
enum CallbackKind {
    NoArg(RcThreadSafety<NoArgFnThreadSafety>),
    SelfAware(RcThreadSafety<SelfAwareFnThreadSafety>),
}

impl Callback {
    #[inline]
    #[must_use]
    pub fn new<F, Args>(factory: F) -> Self
    where
        F: Factory<Args>,
    {
        factory.into_callback()
    }

    #[inline]
    #[must_use]
    pub const fn arity(&self) -> Arity {
        match self.0 {
            CallbackKind::NoArg(_) => Arity::NoArg,
            CallbackKind::SelfAware(_) => Arity::SelfAware,
        }
    }

    #[inline]
    pub(crate) fn call(&self, registry: &Registry) -> Result<RcAnyThreadSafety, InstantiateErrorKind> {
        match &self.0 {
            CallbackKind::NoArg(call) => call(),
            CallbackKind::SelfAware(call) => call(registry),
        }
    }
}

impl Debug for Callback {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback").field(&self.arity()).finish()
    }
}
