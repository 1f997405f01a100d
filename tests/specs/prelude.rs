//! Shared fixtures for the behavioral specs.

#![allow(dead_code)]

pub use dx_core::*;
pub use std::sync::{Arc, Mutex, OnceLock};

/// Values captured by callbacks, in arrival order
pub struct Recorded<T> {
    values: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone + Send + 'static> Recorded<T> {
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self) -> impl Fn(T) + Send + Sync + 'static {
        let values = Arc::clone(&self.values);
        move |value| values.lock().unwrap().push(value)
    }

    pub fn values(&self) -> Vec<T> {
        self.values.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.values.lock().unwrap().clear();
    }
}

/// Observer recording every event name of its listener
pub struct RecordingObserver {
    listener_name: String,
    events: Recorded<String>,
}

impl RecordingObserver {
    pub fn new(listener_name: &str, events: &Recorded<String>) -> Self {
        Self {
            listener_name: listener_name.to_string(),
            events: Recorded {
                values: Arc::clone(&events.values),
            },
        }
    }
}

impl EventObserver for RecordingObserver {
    fn listener_name(&self) -> &str {
        &self.listener_name
    }

    fn is_enabled(&self, _event_name: &str) -> bool {
        true
    }

    fn on_event(&self, event_name: &str, _payload: Option<&dyn Payload>) -> Result<()> {
        self.events.push()(event_name.to_string());
        Ok(())
    }
}

/// Registry with a router for `listener_name` built from handlers, and a
/// source producing on that listener's channel
pub fn listen(
    listener_name: &str,
    build: impl FnOnce(HandlerObserver) -> HandlerObserver,
) -> DiagnosticSource {
    let registry = ChannelRegistry::new();
    ListenerRouter::with_handlers(listener_name, build).attach(&registry);
    DiagnosticSource::new(&registry, listener_name).unwrap()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FooKind {
    A = 1,
    B = 2,
    C = 3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Foo {
    pub name: String,
    pub value: String,
    pub kind: FooKind,
}

impl Foo {
    pub fn new(name: &str, value: &str, kind: FooKind) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            kind,
        }
    }
}

impl Reflect for Foo {
    fn describe() -> &'static Shape {
        static SHAPE: OnceLock<Shape> = OnceLock::new();
        SHAPE.get_or_init(|| {
            Shape::builder::<Foo>()
                .field("Name", |f: &Foo| f.name.clone())
                .field("Value", |f: &Foo| f.value.clone())
                .field("Type", |f: &Foo| f.kind)
                .build()
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    pub description: String,
    pub information: String,
}

impl Bar {
    pub fn new(description: &str, information: &str) -> Self {
        Self {
            description: description.to_string(),
            information: information.to_string(),
        }
    }
}

impl Reflect for Bar {
    fn describe() -> &'static Shape {
        static SHAPE: OnceLock<Shape> = OnceLock::new();
        SHAPE.get_or_init(|| {
            Shape::builder::<Bar>()
                .field("Description", |b: &Bar| b.description.clone())
                .field("Information", |b: &Bar| b.information.clone())
                .build()
        })
    }
}

/// Enum kinds may be requested as integers
pub fn declare_conversions() {
    register_conversion::<FooKind, i32, _>(|kind| kind as i32);
}
