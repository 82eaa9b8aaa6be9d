//! Execution tracing
//!
//! The interpreter emits a stream of structural trace events while it
//! walks a program. Renderers consume the recorded stream after the
//! fact; the event order and nesting are identical no matter which
//! output style decorates them.

pub mod format;

pub use format::{Formatter, TraceStyle};

/// A single trace event emitted during execution.
///
/// Values are carried pre-rendered as text so renderers stay
/// independent of the runtime value representation.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    ProgramStart { objective: String },
    TaskStart { name: String },
    TaskEnd { name: String },
    StepStart { name: String },
    StepEnd { name: String },
    SubtaskStart { name: String },
    SubtaskEnd { name: String },
    VariableAssigned { name: String, value: String },
    Output { text: String },
}

impl TraceEvent {
    /// Does this event open a nesting level?
    pub fn is_start(&self) -> bool {
        matches!(
            self,
            Self::ProgramStart { .. }
                | Self::TaskStart { .. }
                | Self::StepStart { .. }
                | Self::SubtaskStart { .. }
        )
    }

    /// Does this event close a nesting level?
    pub fn is_end(&self) -> bool {
        matches!(
            self,
            Self::TaskEnd { .. } | Self::StepEnd { .. } | Self::SubtaskEnd { .. }
        )
    }

    /// The category tag renderers decorate
    pub fn category(&self) -> &'static str {
        match self {
            Self::ProgramStart { .. } => "PROGRAM",
            Self::TaskStart { .. } | Self::TaskEnd { .. } => "TASK",
            Self::StepStart { .. } | Self::StepEnd { .. } => "STEP",
            Self::SubtaskStart { .. } | Self::SubtaskEnd { .. } => "SUBTASK",
            Self::VariableAssigned { .. } => "VARIABLE",
            Self::Output { .. } => "OUTPUT",
        }
    }

    /// The undecorated message text for this event
    pub fn message(&self) -> String {
        match self {
            Self::ProgramStart { objective } => objective.clone(),
            Self::TaskStart { name }
            | Self::StepStart { name }
            | Self::SubtaskStart { name } => format!("Executing {}", name),
            Self::TaskEnd { name } | Self::StepEnd { name } | Self::SubtaskEnd { name } => {
                format!("Finished {}", name)
            }
            Self::VariableAssigned { name, value } => {
                format!("Assigned {} to {}", value, name)
            }
            Self::Output { text } => text.clone(),
        }
    }
}

/// Callback interface the interpreter emits trace events through
pub trait TraceSink {
    fn record(&mut self, event: TraceEvent);
}

/// Sink that collects events for later rendering
#[derive(Debug, Default)]
pub struct Recorder {
    events: Vec<TraceEvent>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }
}

impl TraceSink for Recorder {
    fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

/// Sink that discards everything (explain mode off)
#[derive(Debug, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record(&mut self, _event: TraceEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_preserves_order() {
        let mut recorder = Recorder::new();
        recorder.record(TraceEvent::ProgramStart {
            objective: "Test".to_string(),
        });
        recorder.record(TraceEvent::TaskStart {
            name: "T".to_string(),
        });
        recorder.record(TraceEvent::TaskEnd {
            name: "T".to_string(),
        });

        let events = recorder.events();
        assert_eq!(events.len(), 3);
        assert!(events[0].is_start());
        assert!(events[2].is_end());
    }

    #[test]
    fn test_event_categories() {
        let event = TraceEvent::VariableAssigned {
            name: "x".to_string(),
            value: "42".to_string(),
        };
        assert_eq!(event.category(), "VARIABLE");
        assert_eq!(event.message(), "Assigned 42 to x");

        let event = TraceEvent::StepStart {
            name: "Collect".to_string(),
        };
        assert_eq!(event.category(), "STEP");
        assert_eq!(event.message(), "Executing Collect");
    }
}
