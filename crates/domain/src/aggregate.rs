//! Core aggregate and domain event traits.

use chrono::{DateTime, Utc};
use common::Version;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Returns true if applying the event counts as a mutation of the record,
    /// bumping its version and last-modified timestamp.
    fn is_mutation(&self) -> bool {
        true
    }
}

/// Trait for the mutable records of the planning core.
///
/// Aggregates never mutate themselves directly from a command. Command
/// methods validate against the current state and return the events to
/// apply; applying is pure and infallible. A failed command leaves the record
/// untouched.
pub trait Aggregate: Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Returns the current version of the aggregate.
    fn version(&self) -> Version;

    /// Records a mutation at `at`: increments the version by one and resets
    /// the last-modified timestamp.
    fn touch(&mut self, at: DateTime<Utc>);

    /// Applies an event's state change.
    ///
    /// This method must be pure and deterministic and must not fail.
    fn apply_change(&mut self, event: &Self::Event);

    /// Applies an event, recording a mutation when the event is one.
    fn apply(&mut self, event: &Self::Event, at: DateTime<Utc>) {
        self.apply_change(event);
        if event.is_mutation() {
            self.touch(at);
        }
    }

    /// Applies multiple events in sequence.
    fn apply_events<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a Self::Event>,
        at: DateTime<Utc>,
    ) where
        Self::Event: 'a,
    {
        for event in events {
            self.apply(event, at);
        }
    }
}
