//! Core aggregate and domain event traits.

use common::AggregateId;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain. They are
/// produced by aggregate commands and handed to the application layer for
/// publication.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    ///
    /// This is the `kind` subscribers route on.
    fn event_type(&self) -> &'static str;
}

/// Trait for aggregate roots persisted as current state.
///
/// An aggregate root is the only entry point for mutating its cluster of
/// objects. Commands mutate state in place and enqueue the events describing
/// the change; the application layer drains and publishes them.
pub trait AggregateRoot: Send + Sync {
    /// The type of events this aggregate produces.
    type Event: DomainEvent;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's identity.
    fn id(&self) -> AggregateId;

    /// Returns a copy of the events enqueued since the last drain.
    fn pending_events(&self) -> Vec<Self::Event>;

    /// Removes and returns the events enqueued since the last drain.
    ///
    /// A second call without an intervening command returns an empty list,
    /// so the same event is never handed out twice.
    fn take_events(&mut self) -> Vec<Self::Event>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum TestEvent {
        Renamed { name: String },
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str {
            match self {
                TestEvent::Renamed { .. } => "renamed",
            }
        }
    }

    #[derive(Debug, Default)]
    struct TestAggregate {
        id: AggregateId,
        name: String,
        events: Vec<TestEvent>,
    }

    impl TestAggregate {
        fn rename(&mut self, name: &str) {
            self.name = name.to_string();
            self.events.push(TestEvent::Renamed {
                name: name.to_string(),
            });
        }
    }

    impl AggregateRoot for TestAggregate {
        type Event = TestEvent;

        fn aggregate_type() -> &'static str {
            "TestAggregate"
        }

        fn id(&self) -> AggregateId {
            self.id
        }

        fn pending_events(&self) -> Vec<TestEvent> {
            self.events.clone()
        }

        fn take_events(&mut self) -> Vec<TestEvent> {
            std::mem::take(&mut self.events)
        }
    }

    #[test]
    fn test_pending_events_does_not_drain() {
        let mut aggregate = TestAggregate::default();
        aggregate.rename("first");

        assert_eq!(aggregate.pending_events().len(), 1);
        assert_eq!(aggregate.pending_events().len(), 1);
    }

    #[test]
    fn test_take_events_drains() {
        let mut aggregate = TestAggregate::default();
        aggregate.rename("first");
        aggregate.rename("second");

        let events = aggregate.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type(), "renamed");
        assert!(aggregate.take_events().is_empty());
        assert_eq!(aggregate.name, "second");
    }
}
