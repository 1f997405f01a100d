//! Observers and extraction under concurrent producers.

use crate::prelude::*;
use similar_asserts::assert_eq;
use std::thread;

const LISTENER: &str = "ObserverConcurrency";
const THREADS: usize = 8;
const WRITES: usize = 25;

#[derive(Clone, Debug, Default, PartialEq)]
struct Pair {
    name: Option<String>,
    value: Option<String>,
}

impl ArgumentAdapter for Pair {
    fn adapter() -> AdapterSpec<Self> {
        AdapterSpec::new()
            .bind(Binding::new("Name", |p: &mut Pair, v: String| p.name = Some(v)))
            .bind(Binding::new("Value", |p: &mut Pair, v: String| p.value = Some(v)))
    }
}

#[test]
fn concurrent_first_use_delivers_every_event() {
    let names = Recorded::<String>::new();
    let pairs = Recorded::<Pair>::new();
    let on_name = names.push();
    let on_pair = pairs.push();
    let source = listen(LISTENER, |o| {
        o.handler(
            EventHandler1::new("Concurrent", on_name)
                .unwrap()
                .with_property("Name"),
        )
        .handler(EventHandler1::for_adapter("Concurrent", on_pair).unwrap())
    });

    thread::scope(|scope| {
        for t in 0..THREADS {
            let source = &source;
            scope.spawn(move || {
                for w in 0..WRITES {
                    let foo = Foo::new(&format!("t{t}"), &w.to_string(), FooKind::B);
                    source.channel().write("Concurrent", &foo).unwrap();
                }
            });
        }
    });

    let names = names.values();
    let pairs = pairs.values();
    assert_eq!(names.len(), THREADS * WRITES);
    assert_eq!(pairs.len(), THREADS * WRITES);
    for t in 0..THREADS {
        let expected = format!("t{t}");
        assert_eq!(names.iter().filter(|n| **n == expected).count(), WRITES);
    }
    assert!(pairs.iter().all(|p| p.name.is_some() && p.value.is_some()));
}

#[test]
fn concurrent_operations_keep_their_own_items() {
    let seen = Recorded::<(String, u32)>::new();
    let on_item = seen.push();
    let source = listen(LISTENER, |o| {
        o.handler(
            EventHandler2::new("Worker.Done", move |name: Option<String>, n: Option<u32>| {
                if let (Some(name), Some(n)) = (name, n) {
                    on_item((name, n));
                }
            })
            .unwrap()
            .with_properties(Some("Name"), None),
        )
    });

    thread::scope(|scope| {
        for t in 0..THREADS as u32 {
            let source = &source;
            scope.spawn(move || {
                let op = source.create_operation(&format!("Worker{t}")).unwrap();
                op.start().unwrap();
                op.add_item(t).unwrap();
                op.fire_event("Worker.Done").unwrap();
                op.dispose().unwrap();
            });
        }
    });

    let mut seen = seen.values();
    seen.sort_by_key(|(_, n)| *n);
    let expected: Vec<(String, u32)> = (0..THREADS as u32).map(|t| (format!("Worker{t}"), t)).collect();
    assert_eq!(seen, expected);
}
