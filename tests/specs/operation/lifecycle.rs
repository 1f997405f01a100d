//! Operation lifecycle guarantees.

use crate::prelude::*;
use similar_asserts::assert_eq;

const LISTENER: &str = "OperationLifecycle";

fn recorded_source() -> (DiagnosticSource, Recorded<String>) {
    let events = Recorded::new();
    let registry = ChannelRegistry::new();
    ListenerRouter::new(&DiagnosticsOptions::default())
        .observer(RecordingObserver::new(LISTENER, &events))
        .attach(&registry);
    (DiagnosticSource::new(&registry, LISTENER).unwrap(), events)
}

#[test]
fn starting_twice_announces_once() {
    let (source, events) = recorded_source();
    let operation = source.create_operation("Twice").unwrap();

    operation.start().unwrap();
    operation.start().unwrap();

    assert_eq!(events.values(), vec!["Twice.Start"]);
}

#[test]
fn disposing_an_unstarted_operation_is_silent() {
    let (source, events) = recorded_source();
    let operation = source.create_operation("Never").unwrap();

    operation.dispose().unwrap();

    assert!(events.values().is_empty());
}

#[test]
fn disposed_operations_reject_every_call() {
    let (source, _) = recorded_source();
    let operation = source.create_operation("Done").unwrap();
    operation.dispose().unwrap();

    for result in [
        operation.start(),
        operation.dispose(),
        operation.fire_event("Done.Late"),
        operation.add_item(7u32),
        operation.child("After", ChildItems::Share, false).map(|_| ()),
    ] {
        let err = result.unwrap_err();
        assert!(err.is_usage(), "{err}");
    }
}

#[test]
fn items_added_to_the_operation_reach_handlers_of_fired_events() {
    let seen = Recorded::<String>::new();
    let on_order = seen.push();
    let source = listen("OperationItems", |o| {
        o.handler(EventHandler1::new("Order.Placed", on_order).unwrap())
    });

    let operation = source.create_operation("Order").unwrap();
    operation.add_item("order-42".to_string()).unwrap();
    operation.fire_event("Order.Placed").unwrap();

    assert_eq!(seen.values(), vec!["order-42"]);
}

#[test]
fn unlistened_sources_create_unobserved_operations() {
    let source = DiagnosticSource::new(&ChannelRegistry::new(), "Nobody").unwrap();
    let operation = source.create_operation("Quiet").unwrap();

    operation.start().unwrap();
    operation.dispose().unwrap();

    assert!(!operation.is_observed());
    assert!(operation.duration().is_some());
}
