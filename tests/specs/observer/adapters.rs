//! Adapter arguments populated from payload fields.

use crate::prelude::*;
use similar_asserts::assert_eq;

const LISTENER: &str = "ObserverAdapters";

/// Fields read from the same-named payload fields
#[derive(Clone, Debug, Default, PartialEq)]
struct Alpha {
    name: Option<String>,
    value: Option<String>,
}

impl ArgumentAdapter for Alpha {
    fn adapter() -> AdapterSpec<Self> {
        AdapterSpec::new()
            .bind(Binding::new("Name", |a: &mut Alpha, v: String| a.name = Some(v)))
            .bind(Binding::new("Value", |a: &mut Alpha, v: String| a.value = Some(v)))
    }
}

/// Fields read from explicitly named payload fields
#[derive(Clone, Debug, Default, PartialEq)]
struct Betha {
    betha_name: Option<String>,
    betha_value: Option<String>,
}

impl ArgumentAdapter for Betha {
    fn adapter() -> AdapterSpec<Self> {
        AdapterSpec::new()
            .bind(
                Binding::new("BethaName", |b: &mut Betha, v: String| b.betha_name = Some(v))
                    .source("Name"),
            )
            .bind(
                Binding::new("BethaValue", |b: &mut Betha, v: String| b.betha_value = Some(v))
                    .source("Value"),
            )
    }
}

/// Populated from a Foo or a Bar, whichever arrives
#[derive(Clone, Debug, Default, PartialEq)]
struct Gamma {
    name: Option<String>,
    value: Option<String>,
    description: Option<String>,
    information: Option<String>,
}

impl ArgumentAdapter for Gamma {
    fn adapter() -> AdapterSpec<Self> {
        AdapterSpec::from_candidates(vec![Candidate::of::<Foo>(), Candidate::of::<Bar>()])
            .bind(Binding::new("Name", |g: &mut Gamma, v: String| g.name = Some(v)).optional())
            .bind(Binding::new("Value", |g: &mut Gamma, v: String| g.value = Some(v)).optional())
            .bind(
                Binding::new("Description", |g: &mut Gamma, v: String| g.description = Some(v))
                    .optional(),
            )
            .bind(
                Binding::new("Information", |g: &mut Gamma, v: String| g.information = Some(v))
                    .optional(),
            )
    }
}

#[derive(Clone, Debug)]
struct Unrelated {
    code: u16,
}

impl Reflect for Unrelated {
    fn describe() -> &'static Shape {
        static SHAPE: OnceLock<Shape> = OnceLock::new();
        SHAPE.get_or_init(|| {
            Shape::builder::<Unrelated>()
                .field("Code", |u: &Unrelated| u.code)
                .build()
        })
    }
}

fn adapter_source<A: ArgumentAdapter>(event: &'static str) -> (DiagnosticSource, Recorded<A>) {
    let seen = Recorded::<A>::new();
    let on_adapter = seen.push();
    let source = listen(LISTENER, move |o| {
        o.handler(EventHandler1::for_adapter(event, on_adapter).unwrap())
    });
    (source, seen)
}

#[test]
fn same_named_fields() {
    let (source, seen) = adapter_source::<Alpha>("SameNamed");

    source
        .channel()
        .write("SameNamed", &Foo::new("Test", "01", FooKind::A))
        .unwrap();

    assert_eq!(
        seen.values(),
        vec![Alpha {
            name: Some("Test".to_string()),
            value: Some("01".to_string()),
        }]
    );
}

#[test]
fn explicitly_named_fields() {
    let (source, seen) = adapter_source::<Betha>("ExplicitNames");

    source
        .channel()
        .write("ExplicitNames", &Foo::new("Test", "04", FooKind::A))
        .unwrap();

    assert_eq!(
        seen.values(),
        vec![Betha {
            betha_name: Some("Test".to_string()),
            betha_value: Some("04".to_string()),
        }]
    );
}

#[test]
fn multi_source_adapter_follows_the_arriving_payload() {
    let (source, seen) = adapter_source::<Gamma>("MultiSource");

    source
        .channel()
        .write("MultiSource", &Foo::new("TestFoo", "05Foo", FooKind::A))
        .unwrap();
    source
        .channel()
        .write("MultiSource", &Bar::new("TestBar", "05Bar"))
        .unwrap();
    source
        .channel()
        .write("MultiSource", &Unrelated { code: 5 })
        .unwrap();

    assert_eq!(
        seen.values(),
        vec![
            Gamma {
                name: Some("TestFoo".to_string()),
                value: Some("05Foo".to_string()),
                ..Gamma::default()
            },
            Gamma {
                description: Some("TestBar".to_string()),
                information: Some("05Bar".to_string()),
                ..Gamma::default()
            },
            Gamma::default(),
        ]
    );
}

#[test]
fn required_field_missing_from_the_payload_is_reported() {
    let (source, seen) = adapter_source::<Alpha>("RequiredMissing");

    let err = source
        .channel()
        .write("RequiredMissing", &Bar::new("no", "name"))
        .unwrap_err();

    assert!(matches!(
        err,
        DiagnosticsError::Configuration(ConfigurationError::RequiredFieldUnresolved { .. })
    ));
    assert!(seen.values().is_empty());
}
