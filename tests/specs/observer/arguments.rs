//! Typed arguments extracted from event payloads.

use crate::prelude::*;
use similar_asserts::assert_eq;

const LISTENER: &str = "ObserverArguments";

fn write(source: &DiagnosticSource, event: &str, payload: &dyn Payload) {
    source.channel().write(event, payload).unwrap();
}

#[test]
fn handler_receives_the_payload_itself() {
    let seen = Recorded::<Foo>::new();
    let on_foo = seen.push();
    let source = listen(LISTENER, |o| {
        o.handler(EventHandler1::new("PayloadItself", on_foo).unwrap())
    });

    write(&source, "PayloadItself", &Foo::new("Test", "01", FooKind::A));

    assert_eq!(seen.values(), vec![Foo::new("Test", "01", FooKind::A)]);
}

#[test]
fn handler_arguments_by_property_name() {
    let seen = Recorded::<(Option<String>, Option<String>)>::new();
    let on_pair = seen.push();
    let source = listen(LISTENER, |o| {
        o.handler(
            EventHandler2::new("PropertyNames", move |name, value| on_pair((name, value)))
                .unwrap()
                .with_properties(Some("Name"), Some("Value")),
        )
    });

    write(&source, "PropertyNames", &Foo::new("Test", "02", FooKind::A));

    assert_eq!(
        seen.values(),
        vec![(Some("Test".to_string()), Some("02".to_string()))]
    );
}

#[test]
fn enum_fields_are_delivered_as_integers() {
    declare_conversions();
    let seen = Recorded::<i32>::new();
    let on_kind = seen.push();
    let source = listen(LISTENER, |o| {
        o.handler(EventHandler1::new("EnumField", on_kind).unwrap())
    });

    write(&source, "EnumField", &Foo::new("Test", "03", FooKind::C));

    assert_eq!(seen.values(), vec![3]);
}

#[test]
fn three_arguments_from_one_payload() {
    declare_conversions();
    let seen = Recorded::<(Option<String>, Option<String>, Option<i32>)>::new();
    let on_all = seen.push();
    let source = listen(LISTENER, |o| {
        o.handler(
            EventHandler3::new("ThreeArguments", move |n, v, k| on_all((n, v, k)))
                .unwrap()
                .with_properties(Some("Name"), Some("Value"), None),
        )
    });

    write(&source, "ThreeArguments", &Foo::new("Test", "04", FooKind::B));

    assert_eq!(
        seen.values(),
        vec![(Some("Test".to_string()), Some("04".to_string()), Some(2))]
    );
}

#[test]
fn handlers_only_see_their_event() {
    let seen = Recorded::<String>::new();
    let on_name = seen.push();
    let source = listen(LISTENER, |o| {
        o.handler(
            EventHandler1::new("Wanted", on_name)
                .unwrap()
                .with_property("Name"),
        )
    });

    write(&source, "Unwanted", &Foo::new("Skipped", "05", FooKind::A));
    write(&source, "Wanted", &Foo::new("Kept", "05", FooKind::A));

    assert_eq!(seen.values(), vec!["Kept"]);
}

#[test]
fn ignored_events_do_not_observe_operations() {
    let source = listen(LISTENER, |o| o.ignore("Ignored"));

    let ignored = source.create_operation("Ignored").unwrap();
    let observed = source.create_operation("Observed").unwrap();

    assert!(!ignored.is_observed());
    assert!(observed.is_observed());
}

#[test]
fn unresolvable_arguments_fail_the_write() {
    let source = listen(LISTENER, |o| {
        o.handler(EventHandler1::new("Unresolvable", |_: u64| {}).unwrap())
    });

    let err = source
        .channel()
        .write("Unresolvable", &Bar::new("no", "numbers"))
        .unwrap_err();

    assert!(err.is_configuration(), "{err}");
}
