//! Pure session state machine.
//!
//! `SessionState::apply` takes one event, mutates the state and returns the
//! side effects the caller must perform, in order. Nothing in here touches
//! storage, the network or the file system.

use crate::{
    DEFAULT_DOCUMENT, ExecutionResult, PresentationMode, RunOrdering, RunRequest, SessionSnapshot,
};

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The editor surface replaced the document text.
    Edit(String),
    /// The program input was edited.
    InputEdit(String),
    /// The user asked for a run.
    RunRequested,
    /// A run finished (successfully or not).
    RunCompleted { seq: u64, result: ExecutionResult },
    /// Flip light/dark.
    ToggleTheme,
    /// The user asked to download the document.
    ExportRequested,
    /// An import finished reading its file.
    ImportResolved(String),
    /// Restore the default document and clear the result.
    Reset,
}

/// A run that has been started but not completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTicket {
    /// Monotonically increasing per session, starting at 1.
    pub seq: u64,
    pub request: RunRequest,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the text through to the persisted slot.
    Persist(String),
    /// Submit a run to the executor.
    Execute(RunTicket),
    /// Hand the text to file export.
    Export(String),
}

/// In-memory session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    document: String,
    input: String,
    result: ExecutionResult,
    theme: PresentationMode,
    ordering: RunOrdering,
    last_issued: u64,
    last_applied: u64,
}

impl SessionState {
    /// Start a session from a loaded document.
    #[must_use]
    pub fn new(document: impl Into<String>, ordering: RunOrdering) -> Self {
        Self {
            document: document.into(),
            input: String::new(),
            result: ExecutionResult::empty(),
            theme: PresentationMode::default(),
            ordering,
            last_issued: 0,
            last_applied: 0,
        }
    }

    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub const fn result(&self) -> &ExecutionResult {
        &self.result
    }

    #[must_use]
    pub const fn theme(&self) -> PresentationMode {
        self.theme
    }

    /// Apply an event, returning the effects to perform.
    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::Edit(text) | SessionEvent::ImportResolved(text) => {
                self.document = text;
                vec![Effect::Persist(self.document.clone())]
            }
            SessionEvent::InputEdit(text) => {
                self.input = text;
                Vec::new()
            }
            SessionEvent::RunRequested => {
                self.last_issued += 1;
                vec![Effect::Execute(RunTicket {
                    seq: self.last_issued,
                    request: RunRequest {
                        code: self.document.clone(),
                        input: self.input.clone(),
                    },
                })]
            }
            SessionEvent::RunCompleted { seq, result } => {
                if self.accepts(seq) {
                    self.result = result;
                    self.last_applied = self.last_applied.max(seq);
                } else {
                    tracing::debug!(
                        seq,
                        last_applied = self.last_applied,
                        "discarding stale run completion"
                    );
                }
                Vec::new()
            }
            SessionEvent::ToggleTheme => {
                self.theme = self.theme.toggled();
                Vec::new()
            }
            SessionEvent::ExportRequested => vec![Effect::Export(self.document.clone())],
            SessionEvent::Reset => {
                DEFAULT_DOCUMENT.clone_into(&mut self.document);
                self.result = ExecutionResult::empty();
                vec![Effect::Persist(DEFAULT_DOCUMENT.to_string())]
            }
        }
    }

    const fn accepts(&self, seq: u64) -> bool {
        match self.ordering {
            RunOrdering::LastCompleted => true,
            RunOrdering::LatestInitiated => seq > self.last_applied,
        }
    }

    /// Read-only view for the editor surface.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            document: self.document.clone(),
            input: self.input.clone(),
            output: self.result.output.clone(),
            error: self.result.error.clone(),
            error_line: self.result.error_line.map(std::num::NonZeroU32::get),
            error_display: self.result.error_display(),
            theme: self.theme,
            toggle_label: self.theme.toggle_label().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_run(state: &mut SessionState) -> RunTicket {
        match state.apply(SessionEvent::RunRequested).pop() {
            Some(Effect::Execute(ticket)) => ticket,
            other => panic!("expected execute effect, got {other:?}"),
        }
    }

    #[test]
    fn test_initial_state() {
        let state = SessionState::new("x = 1", RunOrdering::default());
        assert_eq!(state.document(), "x = 1");
        assert_eq!(state.input(), "");
        assert_eq!(state.result(), &ExecutionResult::empty());
        assert_eq!(state.theme(), PresentationMode::Dark);
    }

    #[test]
    fn test_edit_persists_new_text() {
        let mut state = SessionState::new(DEFAULT_DOCUMENT, RunOrdering::default());
        let effects = state.apply(SessionEvent::Edit("print(2)".into()));
        assert_eq!(state.document(), "print(2)");
        assert_eq!(effects, vec![Effect::Persist("print(2)".into())]);
    }

    #[test]
    fn test_input_edit_has_no_effects() {
        let mut state = SessionState::new(DEFAULT_DOCUMENT, RunOrdering::default());
        let effects = state.apply(SessionEvent::InputEdit("42\n".into()));
        assert!(effects.is_empty());
        assert_eq!(state.input(), "42\n");
    }

    #[test]
    fn test_run_captures_document_and_input() {
        let mut state = SessionState::new("print(input())", RunOrdering::default());
        state.apply(SessionEvent::InputEdit("hi".into()));
        let ticket = start_run(&mut state);
        assert_eq!(ticket.seq, 1);
        assert_eq!(ticket.request.code, "print(input())");
        assert_eq!(ticket.request.input, "hi");
        assert_eq!(start_run(&mut state).seq, 2);
    }

    #[test]
    fn test_completion_replaces_whole_result() {
        let mut state = SessionState::new(DEFAULT_DOCUMENT, RunOrdering::default());
        let first = start_run(&mut state);
        state.apply(SessionEvent::RunCompleted {
            seq: first.seq,
            result: ExecutionResult::new("", Some("boom".into()), Some(2)),
        });
        assert!(state.result().is_error());

        let second = start_run(&mut state);
        state.apply(SessionEvent::RunCompleted {
            seq: second.seq,
            result: ExecutionResult::success("4\n"),
        });
        assert_eq!(state.result(), &ExecutionResult::success("4\n"));
    }

    #[test]
    fn test_latest_initiated_discards_stale_completion() {
        let mut state = SessionState::new(DEFAULT_DOCUMENT, RunOrdering::LatestInitiated);
        let first = start_run(&mut state);
        let second = start_run(&mut state);

        state.apply(SessionEvent::RunCompleted {
            seq: second.seq,
            result: ExecutionResult::success("second"),
        });
        state.apply(SessionEvent::RunCompleted {
            seq: first.seq,
            result: ExecutionResult::success("first"),
        });

        assert_eq!(state.result().output, "second");
    }

    #[test]
    fn test_latest_initiated_accepts_in_order_completions() {
        let mut state = SessionState::new(DEFAULT_DOCUMENT, RunOrdering::LatestInitiated);
        let first = start_run(&mut state);
        let second = start_run(&mut state);

        state.apply(SessionEvent::RunCompleted {
            seq: first.seq,
            result: ExecutionResult::success("first"),
        });
        assert_eq!(state.result().output, "first");
        state.apply(SessionEvent::RunCompleted {
            seq: second.seq,
            result: ExecutionResult::success("second"),
        });
        assert_eq!(state.result().output, "second");
    }

    #[test]
    fn test_last_completed_lets_late_response_win() {
        let mut state = SessionState::new(DEFAULT_DOCUMENT, RunOrdering::LastCompleted);
        let first = start_run(&mut state);
        let second = start_run(&mut state);

        state.apply(SessionEvent::RunCompleted {
            seq: second.seq,
            result: ExecutionResult::success("second"),
        });
        state.apply(SessionEvent::RunCompleted {
            seq: first.seq,
            result: ExecutionResult::success("first"),
        });

        assert_eq!(state.result().output, "first");
    }

    #[test]
    fn test_toggle_theme_touches_nothing_else() {
        let mut state = SessionState::new("a", RunOrdering::default());
        let before = state.snapshot();
        assert!(state.apply(SessionEvent::ToggleTheme).is_empty());
        let after = state.snapshot();
        assert_eq!(after.theme, PresentationMode::Light);
        assert_eq!(before.toggle_label, "Light Mode");
        assert_eq!(after.toggle_label, "Dark Mode");
        assert_eq!(after.document, before.document);
        assert_eq!(after.output, before.output);
    }

    #[test]
    fn test_export_emits_document() {
        let mut state = SessionState::new("print('é')", RunOrdering::default());
        let effects = state.apply(SessionEvent::ExportRequested);
        assert_eq!(effects, vec![Effect::Export("print('é')".into())]);
    }

    #[test]
    fn test_import_keeps_result() {
        let mut state = SessionState::new(DEFAULT_DOCUMENT, RunOrdering::default());
        let ticket = start_run(&mut state);
        state.apply(SessionEvent::RunCompleted {
            seq: ticket.seq,
            result: ExecutionResult::success("out"),
        });

        let effects = state.apply(SessionEvent::ImportResolved("imported".into()));
        assert_eq!(effects, vec![Effect::Persist("imported".into())]);
        assert_eq!(state.document(), "imported");
        assert_eq!(state.result().output, "out");
    }

    #[test]
    fn test_reset_is_idempotent_and_keeps_input_and_theme() {
        let mut state = SessionState::new("custom", RunOrdering::default());
        state.apply(SessionEvent::InputEdit("stdin".into()));
        state.apply(SessionEvent::ToggleTheme);
        let ticket = start_run(&mut state);
        state.apply(SessionEvent::RunCompleted {
            seq: ticket.seq,
            result: ExecutionResult::new("x", Some("err".into()), Some(1)),
        });

        let effects = state.apply(SessionEvent::Reset);
        assert_eq!(effects, vec![Effect::Persist(DEFAULT_DOCUMENT.into())]);
        let once = state.clone();
        state.apply(SessionEvent::Reset);

        assert_eq!(state, once);
        assert_eq!(state.document(), DEFAULT_DOCUMENT);
        assert_eq!(state.result(), &ExecutionResult::empty());
        assert_eq!(state.input(), "stdin");
        assert_eq!(state.theme(), PresentationMode::Light);
    }

    #[test]
    fn test_snapshot_renders_error_line() {
        let mut state = SessionState::new(DEFAULT_DOCUMENT, RunOrdering::default());
        let ticket = start_run(&mut state);
        state.apply(SessionEvent::RunCompleted {
            seq: ticket.seq,
            result: ExecutionResult::new("", Some("NameError: x is not defined".into()), Some(3)),
        });
        let snapshot = state.snapshot();
        assert_eq!(snapshot.error_line, Some(3));
        assert_eq!(
            snapshot.error_display.as_deref(),
            Some("Line 3: NameError: x is not defined")
        );
    }
}
