use keyreg::{
    registry, utils::thread_safety::RcThreadSafety, Arity, Callback, Config, InstantiateErrorKind, Registry,
    RegistryErrorKind, ResolveErrorKind,
};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
struct Object;

#[derive(Debug)]
struct Simple {
    text: &'static str,
}

struct NotSoSimple {
    text: &'static str,
    simple_first: RcThreadSafety<Simple>,
    simple_second: RcThreadSafety<Simple>,
}

#[test]
fn test_register_transient() {
    let registry = Registry::new();
    registry.register("one", || Ok(Object)).unwrap();

    assert!(registry.contains("one"));

    let obj_1 = registry.get::<Object>("one").unwrap();
    let obj_2 = registry.get::<Object>("one").unwrap();
    assert!(!RcThreadSafety::ptr_eq(&obj_1, &obj_2));
}

#[test]
fn test_register_singleton() {
    let registry = Registry::new();
    registry.singleton("two", || Ok(Object)).unwrap();

    assert!(registry.contains("two"));

    let obj_1 = registry.get::<Object>("two").unwrap();
    let obj_2 = registry.get::<Object>("two").unwrap();
    assert!(RcThreadSafety::ptr_eq(&obj_1, &obj_2));
}

#[test]
fn test_singleton_ignores_later_changes_of_captured_state() {
    let counter = RcThreadSafety::new(AtomicUsize::new(1));
    let registry = Registry::new();
    registry
        .register_singleton("count", {
            let counter = counter.clone();
            move || Ok(counter.load(Ordering::SeqCst))
        })
        .unwrap();

    assert_eq!(*registry.get::<usize>("count").unwrap(), 1);
    counter.store(5, Ordering::SeqCst);
    assert_eq!(*registry.get::<usize>("count").unwrap(), 1);
}

#[test]
fn test_invalid_keys() {
    let registry = Registry::new();

    for key in ["forget", "register", "forget_all", "singleton", "clone", "inspect", "Upper", "1st", "with space", ""] {
        assert_eq!(
            registry.register(key, || Ok(Object)),
            Err(RegistryErrorKind::InvalidKey { key: key.to_owned() })
        );
    }
    assert!(registry.is_empty());

    let err = registry.register("register_singleton", || Ok(Object)).unwrap_err();
    assert_eq!(err.to_string(), "Invalid key \"register_singleton\"");
}

#[test]
fn test_already_registered_key() {
    let registry = Registry::new();
    registry.register("one", || Ok(Object)).unwrap();

    let err = registry.singleton("one", || Ok(Object)).unwrap_err();

    assert!(matches!(&err, RegistryErrorKind::KeyAlreadyRegistered { key } if key.as_str() == "one"));
    assert_eq!(err.to_string(), "Key \"one\" already registered");
}

#[test]
fn test_invalid_callback() {
    let registry = Registry::new();

    let err = registry
        .register_with_config("invalid", None, Config::default())
        .unwrap_err();

    assert!(matches!(err, RegistryErrorKind::InvalidCallback { .. }));
    assert_eq!(err.to_string(), "Invalid callback");
    assert!(!registry.contains("invalid"));
}

#[test]
fn test_register_with_config() {
    let registry = Registry::new();
    let callback = Callback::new(|| Ok::<_, InstantiateErrorKind>(Object));

    assert_eq!(callback.arity(), Arity::NoArg);

    registry
        .register_with_config("shared", Some(callback.clone()), Config::singleton())
        .unwrap();
    registry
        .register_with_config("fresh", Some(callback), Config::transient())
        .unwrap();

    assert!(RcThreadSafety::ptr_eq(
        &registry.get::<Object>("shared").unwrap(),
        &registry.get::<Object>("shared").unwrap()
    ));
    assert!(!RcThreadSafety::ptr_eq(
        &registry.get::<Object>("fresh").unwrap(),
        &registry.get::<Object>("fresh").unwrap()
    ));
}

#[test]
fn test_resolve_regardless_of_registration_order() {
    let registry = Registry::new();

    let foo = RcThreadSafety::new(Simple { text: "foo" });
    let bar = RcThreadSafety::new(Simple { text: "bar" });

    registry
        .singleton("baz", |registry: &Registry| {
            Ok(NotSoSimple {
                text: "baz",
                simple_first: registry.get("foo")?,
                simple_second: registry.get("bar")?,
            })
        })
        .unwrap();
    registry
        .singleton("bar", {
            let bar = bar.clone();
            move || Ok(Simple { text: bar.text })
        })
        .unwrap();
    registry
        .singleton("foo", {
            let foo = foo.clone();
            move || Ok(Simple { text: foo.text })
        })
        .unwrap();

    let baz = registry.get::<NotSoSimple>("baz").unwrap();

    assert_eq!(baz.text, "baz");
    assert_eq!(baz.simple_first.text, "foo");
    assert_eq!(baz.simple_second.text, "bar");
    assert!(RcThreadSafety::ptr_eq(&baz.simple_first, &registry.get::<Simple>("foo").unwrap()));
    assert!(RcThreadSafety::ptr_eq(&baz.simple_second, &registry.get::<Simple>("bar").unwrap()));
}

#[test]
fn test_missing_dependency_fails_at_lookup() {
    let registry = Registry::new();
    registry
        .singleton("baz", |registry: &Registry| {
            let foo = registry.get::<Simple>("foo")?;
            Ok(Simple { text: foo.text })
        })
        .unwrap();

    let err = registry.get::<Simple>("baz").unwrap_err();

    assert!(matches!(&err, ResolveErrorKind::Factory { key, .. } if key.as_str() == "baz"));
    assert!(matches!(err.root_cause(), ResolveErrorKind::UndefinedLookup { key } if key == "foo"));
}

#[test]
fn test_end_to_end() {
    let registry = Registry::new();
    registry.singleton("foo", || Ok(String::from("A"))).unwrap();
    registry
        .singleton("bar", |registry: &Registry| {
            let foo = registry.get::<String>("foo")?;
            Ok(format!("{foo}B"))
        })
        .unwrap();

    assert_eq!(*registry.get::<String>("bar").unwrap(), "AB");
    assert_eq!(*registry.get::<String>("bar").unwrap(), "AB");
    assert_eq!(*registry.get::<String>("foo").unwrap(), "A");
}

#[test]
fn test_forget_single_entry() {
    let registry = Registry::new();
    let obj = RcThreadSafety::new(Object);
    registry
        .register("foo", {
            let obj = obj.clone();
            move || Ok(obj.clone())
        })
        .unwrap();

    assert!(RcThreadSafety::ptr_eq(&*registry.get::<RcThreadSafety<Object>>("foo").unwrap(), &obj));

    registry.forget("foo").unwrap();

    assert!(matches!(
        registry.get::<RcThreadSafety<Object>>("foo"),
        Err(ResolveErrorKind::UndefinedLookup { key }) if key == "foo"
    ));
}

#[test]
fn test_forget_all_entries() {
    let registry = Registry::new();
    registry.register("foo", || Ok(Object)).unwrap();
    registry.singleton("bar", || Ok(Object)).unwrap();
    let _ = registry.get::<Object>("foo").unwrap();
    let _ = registry.get::<Object>("bar").unwrap();

    registry.forget_all();

    assert!(matches!(registry.get_any("foo"), Err(ResolveErrorKind::UndefinedLookup { .. })));
    assert!(matches!(registry.get_any("bar"), Err(ResolveErrorKind::UndefinedLookup { .. })));
    assert!(registry.keys().is_empty());
}

#[test]
fn test_forget_non_existing_entry() {
    let registry = Registry::new();

    let err = registry.forget("baz").unwrap_err();

    assert_eq!(err, RegistryErrorKind::KeyNotRegistered { key: "baz".to_owned() });
    assert_eq!(err.to_string(), "Key baz is not registered");
}

#[test]
fn test_register_again_after_forget() {
    let registry = Registry::new();
    registry.singleton("foo", || Ok(String::from("old"))).unwrap();
    let old = registry.get::<String>("foo").unwrap();

    registry.forget("foo").unwrap();
    registry.register("foo", || Ok(String::from("new"))).unwrap();

    let new_1 = registry.get::<String>("foo").unwrap();
    let new_2 = registry.get::<String>("foo").unwrap();

    assert_eq!(*old, "old");
    assert_eq!(*new_1, "new");
    assert!(!RcThreadSafety::ptr_eq(&new_1, &new_2));
    assert!(!registry.is_resolved("foo"));
}

#[test]
fn test_registries_are_independent() {
    let registry_1 = Registry::new();
    let registry_2 = Registry::new();
    registry_1.singleton("foo", || Ok(Object)).unwrap();

    assert!(registry_2.get_any("foo").is_err());
    registry_2.singleton("foo", || Ok(Object)).unwrap();

    assert!(!RcThreadSafety::ptr_eq(
        &registry_1.get::<Object>("foo").unwrap(),
        &registry_2.get::<Object>("foo").unwrap()
    ));
}

#[test]
fn test_with_map() {
    let registry = Registry::with_map([
        ("foo", Callback::new(|| Ok::<_, InstantiateErrorKind>(Object))),
        (
            "bar",
            Callback::new(|registry: &Registry| {
                registry.get::<Object>("foo")?;
                Ok::<_, InstantiateErrorKind>(Object)
            }),
        ),
    ])
    .unwrap();

    assert_eq!(registry.len(), 2);
    assert!(!RcThreadSafety::ptr_eq(
        &registry.get::<Object>("bar").unwrap(),
        &registry.get::<Object>("bar").unwrap()
    ));
}

#[test]
fn test_with_singleton_map() {
    let registry = Registry::with_singleton_map(vec![(
        String::from("foo"),
        Callback::new(|| Ok::<_, InstantiateErrorKind>(Object)),
    )])
    .unwrap();

    assert!(RcThreadSafety::ptr_eq(
        &registry.get::<Object>("foo").unwrap(),
        &registry.get::<Object>("foo").unwrap()
    ));
}

#[test]
fn test_with_map_errors() {
    let result = Registry::with_singleton_map([("forget", Callback::new(|| Ok::<_, InstantiateErrorKind>(Object)))]);

    assert!(matches!(result, Err(RegistryErrorKind::InvalidKey { .. })));
}

#[test]
fn test_registry_macro() {
    let registry = registry! {
        singleton(bar => |registry: &Registry| {
            let foo = registry.get::<String>("foo")?;
            Ok(format!("{foo}B"))
        }),
        singleton(foo => || Ok(String::from("A"))),
    }
    .unwrap();

    assert_eq!(*registry.get::<String>("bar").unwrap(), "AB");
}

#[test]
#[cfg(feature = "thread_safe")]
fn test_concurrent_singleton_lookup() {
    use std::{sync::Barrier, thread};

    const THREADS: usize = 8;

    let registry = RcThreadSafety::new(Registry::new());
    registry.singleton("shared", || Ok(Object)).unwrap();

    let barrier = RcThreadSafety::new(Barrier::new(THREADS));
    let handles = (0..THREADS)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                registry.get::<Object>("shared").unwrap()
            })
        })
        .collect::<Vec<_>>();

    let values = handles.into_iter().map(|handle| handle.join().unwrap()).collect::<Vec<_>>();
    let cached = registry.get::<Object>("shared").unwrap();

    assert!(values.iter().all(|value| RcThreadSafety::ptr_eq(value, &cached)));
}

#[cfg(feature = "thread_safe")]
struct Reentrant {
    registry: std::sync::Weak<Registry>,
    dropped: RcThreadSafety<AtomicUsize>,
}

#[cfg(feature = "thread_safe")]
impl Drop for Reentrant {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let _ = registry.contains("reentrant");
            let _ = registry.keys();
        }
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(feature = "thread_safe")]
fn run_with_timeout(f: impl FnOnce() + Send + 'static) -> bool {
    use std::{sync::mpsc, thread, time::Duration};

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        f();
        let _ = tx.send(());
    });
    rx.recv_timeout(Duration::from_secs(3)).is_ok()
}

#[test]
#[cfg(feature = "thread_safe")]
fn test_forget_drops_values_that_use_the_registry() {
    let registry = RcThreadSafety::new(Registry::new());
    let dropped = RcThreadSafety::new(AtomicUsize::new(0));
    registry
        .singleton("reentrant", {
            let weak = RcThreadSafety::downgrade(&registry);
            let dropped = dropped.clone();
            move || {
                Ok(Reentrant {
                    registry: weak.clone(),
                    dropped: dropped.clone(),
                })
            }
        })
        .unwrap();
    drop(registry.get::<Reentrant>("reentrant").unwrap());

    let finished = run_with_timeout({
        let registry = registry.clone();
        move || registry.forget("reentrant").unwrap()
    });

    assert!(finished, "forget didn't finish");
    assert_eq!(dropped.load(Ordering::SeqCst), 1);
    assert!(!registry.contains("reentrant"));
}

#[test]
#[cfg(feature = "thread_safe")]
fn test_forget_all_drops_values_that_use_the_registry() {
    let registry = RcThreadSafety::new(Registry::new());
    let dropped = RcThreadSafety::new(AtomicUsize::new(0));
    let captured = Reentrant {
        registry: RcThreadSafety::downgrade(&registry),
        dropped: dropped.clone(),
    };
    registry
        .register("transient", move || {
            let _ = &captured;
            Ok(Object)
        })
        .unwrap();
    registry
        .singleton("reentrant", {
            let weak = RcThreadSafety::downgrade(&registry);
            let dropped = dropped.clone();
            move || {
                Ok(Reentrant {
                    registry: weak.clone(),
                    dropped: dropped.clone(),
                })
            }
        })
        .unwrap();
    drop(registry.get::<Reentrant>("reentrant").unwrap());

    let finished = run_with_timeout({
        let registry = registry.clone();
        move || registry.forget_all()
    });

    assert!(finished, "forget_all didn't finish");
    assert_eq!(dropped.load(Ordering::SeqCst), 2);
    assert!(registry.is_empty());
}
