//! Event ordering of operations, children, and error children.

use crate::prelude::*;
use similar_asserts::assert_eq;

const LISTENER: &str = "OperationSequencing";

#[derive(Debug, thiserror::Error)]
#[error("payment declined")]
struct Declined;

fn recorded_source() -> (DiagnosticSource, Recorded<String>) {
    let events = Recorded::new();
    let registry = ChannelRegistry::new();
    ListenerRouter::new(&DiagnosticsOptions::default())
        .observer(RecordingObserver::new(LISTENER, &events))
        .attach(&registry);
    (DiagnosticSource::new(&registry, LISTENER).unwrap(), events)
}

#[test]
fn child_operation_events_nest_in_the_parent() {
    let (source, events) = recorded_source();

    let operation = source.create_operation("TestAlpha").unwrap();
    operation.start().unwrap();
    let child = operation.child("ChildOperation", ChildItems::Share, true).unwrap();
    child.dispose().unwrap();
    operation.dispose().unwrap();

    assert_eq!(
        events.values(),
        vec![
            "TestAlpha.Start",
            "ChildOperation.Start",
            "ChildOperation.Stop",
            "TestAlpha.Stop",
        ]
    );
}

#[test]
fn error_child_events_nest_in_the_parent() {
    let (source, events) = recorded_source();

    let operation = source.create_operation("TestAlpha").unwrap();
    operation.start().unwrap();
    let failed = operation.child_error(Declined).unwrap();
    failed.dispose().unwrap();
    operation.dispose().unwrap();

    assert_eq!(
        events.values(),
        vec![
            "TestAlpha.Start",
            "TestAlphaError.Start",
            "TestAlphaError.Stop",
            "TestAlpha.Stop",
        ]
    );
}

#[test]
fn fired_events_and_errors_arrive_between_start_and_stop() {
    let (source, events) = recorded_source();

    let operation = source.create_operation("Checkout").unwrap();
    operation.start().unwrap();
    operation.fire_event("Checkout.Priced").unwrap();
    operation.fire_error(Some(Declined)).unwrap();
    operation.dispose().unwrap();

    assert_eq!(
        events.values(),
        vec![
            "Checkout.Start",
            "Checkout.Priced",
            "Checkout.Error",
            "Checkout.Stop",
        ]
    );
}

#[test]
fn error_handlers_receive_the_error_by_either_identity() {
    let concrete = Recorded::<String>::new();
    let shared = Recorded::<String>::new();
    let on_concrete = concrete.push();
    let on_shared = shared.push();
    let source = listen("ErrorIdentities", |o| {
        o.handler(
            EventHandler1::new("Pay.Error", move |e: Arc<Declined>| on_concrete(e.to_string()))
                .unwrap(),
        )
        .handler(
            EventHandler1::new("Pay.Error", move |e: SharedError| on_shared(e.to_string()))
                .unwrap(),
        )
    });

    let operation = source.create_operation("Pay").unwrap();
    operation.fire_error(Some(Declined)).unwrap();

    assert_eq!(concrete.values(), vec!["payment declined"]);
    assert_eq!(shared.values(), vec!["payment declined"]);
}
