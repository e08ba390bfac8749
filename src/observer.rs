//! Pipeline observation.
//!
//! Stages never log through global state. Each stage receives a
//! [`PipelineObserver`] and reports what it does as [`PipelineEvent`]s; the
//! observer's lifetime is one pipeline run.
//!
//! Provided observers:
//! - [`TracingObserver`] forwards events to `tracing`
//! - [`RecordingObserver`] keeps every event (tests, reports)
//! - [`ChannelObserver`] streams events over a bounded channel
//! - [`NullObserver`] discards everything

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::correlate::ClusterId;
use crate::formats::LoadSummary;
use crate::term::{GraphName, Term, Triple};
use crate::validate::LicenseRow;

/// Something a pipeline stage did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A document was loaded.
    DatasetLoaded {
        /// What the load added.
        summary: LoadSummary,
    },
    /// The rulebase was built.
    RulebaseBuilt {
        /// Rule graph the whitelist came from.
        graph: GraphName,
        /// Whitelist size, fixed members included.
        whitelisted: usize,
    },
    /// The validator reported a licensed entity.
    LicenseFound {
        /// The reported row.
        row: LicenseRow,
    },
    /// The validator finished.
    ValidateFinished {
        /// Rows reported.
        rows: usize,
    },
    /// Strip started.
    StripStarted {
        /// Triples in the dataset before stripping.
        triples: usize,
    },
    /// A triple was removed by strip.
    TripleStripped {
        /// Graph it was removed from.
        graph: GraphName,
        /// The removed triple.
        triple: Triple,
    },
    /// Strip finished.
    StripFinished {
        /// Triples removed.
        removed: usize,
        /// Triples left in the dataset.
        remaining: usize,
    },
    /// Correlation started.
    CorrelateStarted,
    /// An equivalence triple was processed.
    EquivalenceLinked {
        /// Subject of the equivalence triple.
        subject: Term,
        /// Object of the equivalence triple.
        object: Term,
        /// Cluster both sides now belong to.
        cluster: ClusterId,
        /// True if the cluster was minted for this triple.
        minted: bool,
    },
    /// Two existing clusters were merged (union-find strategy only).
    ClustersMerged {
        /// Cluster that survives.
        survivor: ClusterId,
        /// Cluster folded into the survivor.
        absorbed: ClusterId,
    },
    /// Correlation finished.
    CorrelateFinished {
        /// Clusters in the index.
        clusters: usize,
        /// Entities with a proxy.
        entities: usize,
    },
    /// Generation finished.
    GenerateFinished {
        /// Graph the artifact targets.
        graph: GraphName,
        /// Triples produced.
        triples: usize,
    },
}

/// Receives pipeline events.
pub trait PipelineObserver: Send + Sync {
    /// Called once per event, synchronously, on the stage's thread.
    fn on_event(&self, event: &PipelineEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {
    fn on_event(&self, _event: &PipelineEvent) {}
}

/// Forwards events to `tracing`.
///
/// Stage boundaries and summaries log at `INFO`, per-triple events at
/// `DEBUG`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::DatasetLoaded { summary } => {
                for (graph, len) in &summary.graphs {
                    info!(source = %summary.source, graph = %graph, triples = len, "load: graph");
                }
                info!(
                    source = %summary.source,
                    graphs = summary.graphs.len(),
                    triples = summary.triples,
                    "load: done"
                );
            }
            PipelineEvent::RulebaseBuilt { graph, whitelisted } => {
                info!(graph = %graph, whitelisted, "rulebase: built");
            }
            PipelineEvent::LicenseFound { row } => {
                info!(
                    graph = %row.graph,
                    entity = %row.entity,
                    entity_type = %row.entity_type,
                    license = %row.license,
                    "validate"
                );
            }
            PipelineEvent::ValidateFinished { rows } => info!(rows, "validate: end"),
            PipelineEvent::StripStarted { triples } => info!(triples, "strip: start"),
            PipelineEvent::TripleStripped { graph, triple } => {
                debug!(graph = %graph, triple = %triple, "strip");
            }
            PipelineEvent::StripFinished { removed, remaining } => {
                info!(removed, remaining, "strip: end");
            }
            PipelineEvent::CorrelateStarted => info!("correlate: start"),
            PipelineEvent::EquivalenceLinked {
                subject,
                object,
                cluster,
                minted,
            } => {
                debug!(subject = %subject, object = %object, cluster = %cluster, minted, "correlate");
            }
            PipelineEvent::ClustersMerged { survivor, absorbed } => {
                debug!(survivor = %survivor, absorbed = %absorbed, "correlate: merge");
            }
            PipelineEvent::CorrelateFinished { clusters, entities } => {
                info!(clusters, entities, "correlate: end");
            }
            PipelineEvent::GenerateFinished { graph, triples } => {
                info!(graph = %graph, triples, "generate: end");
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingObserver {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<PipelineEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of recorded events matching `pred`.
    #[must_use]
    pub fn count(&self, pred: impl Fn(&PipelineEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event.clone());
    }
}

/// Streams events over a bounded channel.
///
/// Sending never blocks the pipeline: when the buffer is full the event is
/// dropped and counted.
#[derive(Debug)]
pub struct ChannelObserver {
    tx: Sender<PipelineEvent>,
    dropped: Arc<AtomicU64>,
}

/// Receiving side of a [`ChannelObserver`].
#[derive(Debug)]
pub struct EventStream {
    rx: Receiver<PipelineEvent>,
    dropped: Arc<AtomicU64>,
}

impl ChannelObserver {
    /// Creates an observer and its stream with room for `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, EventStream) {
        let (tx, rx) = bounded(capacity.max(1));
        let dropped = Arc::new(AtomicU64::new(0));
        (
            Self {
                tx,
                dropped: Arc::clone(&dropped),
            },
            EventStream { rx, dropped },
        )
    }
}

impl PipelineObserver for ChannelObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match self.tx.try_send(event.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                let n = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if n.is_power_of_two() {
                    warn!(dropped = n, "observer channel full, dropping events");
                }
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl EventStream {
    /// Receive the next event, waiting at most `timeout`.
    ///
    /// Returns `None` on timeout or once every sender is gone and the buffer
    /// is drained.
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PipelineEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drain every buffered event without blocking.
    #[must_use]
    pub fn drain(&self) -> Vec<PipelineEvent> {
        self.rx.try_iter().collect()
    }

    /// Events dropped because the buffer was full or the stream was closed.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let obs = RecordingObserver::new();
        obs.on_event(&PipelineEvent::CorrelateStarted);
        obs.on_event(&PipelineEvent::CorrelateFinished {
            clusters: 1,
            entities: 2,
        });
        let events = obs.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], PipelineEvent::CorrelateStarted);
        assert_eq!(obs.count(|e| matches!(e, PipelineEvent::CorrelateFinished { .. })), 1);
    }

    #[test]
    fn test_channel_observer_drops_when_full() {
        let (obs, stream) = ChannelObserver::new(2);
        for _ in 0..5 {
            obs.on_event(&PipelineEvent::CorrelateStarted);
        }
        assert_eq!(stream.drain().len(), 2);
        assert_eq!(stream.dropped(), 3);
    }

    #[test]
    fn test_channel_observer_recv_timeout() {
        let (obs, stream) = ChannelObserver::new(4);
        assert!(stream.recv_timeout(Duration::from_millis(5)).is_none());
        obs.on_event(&PipelineEvent::StripStarted { triples: 3 });
        assert_eq!(
            stream.recv_timeout(Duration::from_millis(50)),
            Some(PipelineEvent::StripStarted { triples: 3 })
        );
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_value(PipelineEvent::StripFinished {
            removed: 1,
            remaining: 4,
        })
        .unwrap();
        assert_eq!(json["event"], "strip_finished");
        assert_eq!(json["removed"], 1);
    }
}
