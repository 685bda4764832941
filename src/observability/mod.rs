//! Fire-and-forget observability hooks.

mod events;

pub use events::{ClientEvent, EventSink, InMemoryEventSink, NoopEventSink, TracingEventSink};
