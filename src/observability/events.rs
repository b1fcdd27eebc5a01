//! Structured event stream for a confession session.
//!
//! Discrete, typed events emitted while a session runs. Events are
//! serialized as newline-delimited JSON (JSONL) and carry a monotonically
//! increasing sequence number for ordering.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::machine::Stage;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Why the session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every handle was dropped.
    Completed,
    /// Cancelled through the session's cancellation token.
    Cancelled,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        })
    }
}

// ---------------------------------------------------------------------------
// Event enum
// ---------------------------------------------------------------------------

/// A structured session event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The session loop started.
    SessionStarted {
        /// When the session started.
        timestamp: DateTime<Utc>,
        /// Random id of this session.
        session_id: String,
    },

    /// The machine moved to a new stage.
    StageEntered {
        /// When the transition occurred.
        timestamp: DateTime<Utc>,
        /// Stage left.
        from: Stage,
        /// Stage entered.
        to: Stage,
        /// Why the transition fired.
        reason: String,
    },

    /// A decoy was clicked away.
    DecoyRemoved {
        /// When the decoy was removed.
        timestamp: DateTime<Utc>,
        /// Id of the removed decoy.
        button_id: String,
    },

    /// An effect was raised (or the confetti batch replaced).
    EffectFired {
        /// When the effect fired.
        timestamp: DateTime<Utc>,
        /// Effect name (`glitching`, `winking`, `flashing`, `confetti`).
        effect: String,
        /// Time until the effect clears.
        duration_ms: u64,
    },

    /// An effect cleared at its deadline.
    EffectCleared {
        /// When the effect cleared.
        timestamp: DateTime<Utc>,
        /// Effect name.
        effect: String,
    },

    /// An input was dropped without changing anything.
    InputIgnored {
        /// When the input arrived.
        timestamp: DateTime<Utc>,
        /// Short description of the input.
        input: String,
        /// Stage at the time.
        stage: Stage,
    },

    /// The session loop stopped.
    SessionStopped {
        /// When the session stopped.
        timestamp: DateTime<Utc>,
        /// Why it stopped.
        reason: StopReason,
        /// Stage the session ended in.
        final_stage: Stage,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

/// Wraps an [`Event`] with a monotonically increasing sequence number.
#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) increments the sequence counter,
/// serializes the event as one JSON line and flushes the writer.
/// Serialization or I/O failures are dropped.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug.
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    ///
    /// Stdout is reserved for render snapshots.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use super::*;

    /// In-memory writer for capturing emitter output in tests.
    #[derive(Clone)]
    pub(crate) struct TestWriter(Arc<StdMutex<Vec<u8>>>);

    impl TestWriter {
        pub(crate) fn new() -> Self {
            Self(Arc::new(StdMutex::new(Vec::new())))
        }

        pub(crate) fn contents(&self) -> String {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        }

        pub(crate) fn lines(&self) -> Vec<serde_json::Value> {
            self.contents()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn sample_event() -> Event {
        Event::StageEntered {
            timestamp: DateTime::parse_from_rfc3339("2026-02-14T10:15:30Z")
                .unwrap()
                .with_timezone(&Utc),
            from: Stage::Initial,
            to: Stage::Chase,
            reason: "pointer reached the negative control".to_owned(),
        }
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_string(&sample_event()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["type"], "StageEntered");
        assert_eq!(parsed["from"], "initial");
        assert_eq!(parsed["to"], "chase");
    }

    #[test]
    fn emitter_writes_valid_jsonl() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(sample_event());

        let lines = tw.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["type"], "StageEntered");
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[0]["timestamp"], "2026-02-14T10:15:30Z");
    }

    #[test]
    fn emitter_increments_sequence() {
        let tw = TestWriter::new();
        let emitter = EventEmitter::new(Box::new(tw.clone()));
        emitter.emit(sample_event());
        emitter.emit(Event::SessionStopped {
            timestamp: Utc::now(),
            reason: StopReason::Completed,
            final_stage: Stage::Accepted,
        });

        assert_eq!(emitter.event_count(), 2);
        let lines = tw.lines();
        assert_eq!(lines[0]["sequence"], 0);
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["reason"], "completed");
        assert_eq!(lines[1]["final_stage"], "accepted");
    }

    #[test]
    fn all_event_variants_serialize_to_valid_json() {
        let now = Utc::now();
        let variants = vec![
            Event::SessionStarted {
                timestamp: now,
                session_id: "abc".to_owned(),
            },
            sample_event(),
            Event::DecoyRemoved {
                timestamp: now,
                button_id: "decoy-1".to_owned(),
            },
            Event::EffectFired {
                timestamp: now,
                effect: "winking".to_owned(),
                duration_ms: 1500,
            },
            Event::EffectCleared {
                timestamp: now,
                effect: "winking".to_owned(),
            },
            Event::InputIgnored {
                timestamp: now,
                input: "click decoy-9".to_owned(),
                stage: Stage::Declined2,
            },
            Event::SessionStopped {
                timestamp: now,
                reason: StopReason::Cancelled,
                final_stage: Stage::Corrupted,
            },
        ];

        for variant in &variants {
            let json = serde_json::to_string(variant).unwrap();
            let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert!(parsed.get("type").is_some(), "missing type tag: {json}");
        }
    }

    #[test]
    fn envelope_flattens_event_fields() {
        let envelope = EventEnvelope {
            sequence: 7,
            event: sample_event(),
        };
        let parsed = serde_json::to_value(&envelope).unwrap();
        assert_eq!(parsed["sequence"], 7);
        assert_eq!(parsed["type"], "StageEntered");
        assert!(parsed.get("event").is_none());
    }

    #[test]
    fn noop_still_counts() {
        let emitter = EventEmitter::noop();
        emitter.emit(sample_event());
        assert_eq!(emitter.event_count(), 1);
    }

    #[test]
    fn from_file_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let emitter = EventEmitter::from_file(&path).unwrap();
        emitter.emit(sample_event());
        drop(emitter);
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"StageEntered\""));
    }
}
