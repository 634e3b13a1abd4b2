//! Cooperative progress reporting and cancellation.
//!
//! Long-running layout algorithms report progress through a
//! [ProgressListener] and poll [`check_for_cancel`](ProgressListener::check_for_cancel)
//! at bounded intervals (once per split, node, or iteration). Cancellation
//! is cooperative, never preemptive: the poll returns [Canceled], the
//! algorithm unwinds, and the caller keeps the partially updated graph as a
//! legitimate outcome.

use thiserror::Error;

/// Signal that a long-running operation was cancelled.
///
/// This is a distinguished outcome, not a failure: it is deliberately its
/// own type rather than a variant of any error enum, so that callers cannot
/// confuse "user stopped this" with "this went wrong".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation canceled")]
pub struct Canceled;

// =#========================================================================#=
// PROGRESS LISTENER
// =#========================================================================#=
/// Collaborator interface for progress reporting and cooperative
/// cancellation.
///
/// Methods that advance progress return `Result` so that a cancellation
/// request surfaces at the next poll point.
pub trait ProgressListener {
    /// Announces the current task and subtask.
    fn set_tasks(&mut self, task: &str, subtask: &str);

    /// Updates only the subtask.
    fn set_subtask(&mut self, subtask: &str);

    /// Sets the number of steps the current task will take.
    fn set_maximum(&mut self, maximum: u64);

    /// Sets the current step.
    fn set_progress(&mut self, progress: u64) -> Result<(), Canceled>;

    /// Advances the current step by one.
    fn increment_progress(&mut self) -> Result<(), Canceled>;

    /// Polls for cancellation without advancing progress.
    fn check_for_cancel(&mut self) -> Result<(), Canceled>;

    /// Requests cancellation from outside the running algorithm.
    fn set_user_cancelled(&mut self, cancelled: bool);
}

// =#========================================================================#=
// IMPLEMENTATIONS
// =#========================================================================#=
/// Listener that swallows all reports and never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressListener for SilentProgress {
    fn set_tasks(&mut self, _task: &str, _subtask: &str) {}

    fn set_subtask(&mut self, _subtask: &str) {}

    fn set_maximum(&mut self, _maximum: u64) {}

    fn set_progress(&mut self, _progress: u64) -> Result<(), Canceled> {
        Ok(())
    }

    fn increment_progress(&mut self) -> Result<(), Canceled> {
        Ok(())
    }

    fn check_for_cancel(&mut self) -> Result<(), Canceled> {
        Ok(())
    }

    fn set_user_cancelled(&mut self, _cancelled: bool) {}
}

/// Listener that tracks progress and honors cancellation requests.
///
/// Cancellation can come from the embedding application via
/// [`set_user_cancelled`](ProgressListener::set_user_cancelled), or, mostly
/// for tests, from [`cancel_after`](CancelableProgress::cancel_after): once
/// that many polls have happened, every further poll reports [Canceled].
#[derive(Debug, Default, Clone)]
pub struct CancelableProgress {
    task: String,
    subtask: String,
    maximum: u64,
    progress: u64,
    polls: u64,
    cancel_after: Option<u64>,
    user_cancelled: bool,
}

impl CancelableProgress {
    /// Creates a listener that only cancels on request.
    pub fn new() -> Self {
        CancelableProgress::default()
    }

    /// Creates a listener that cancels itself after `polls` cancellation
    /// polls.
    pub fn cancel_after(polls: u64) -> Self {
        CancelableProgress {
            cancel_after: Some(polls),
            ..CancelableProgress::default()
        }
    }

    /// Returns the current step.
    pub fn progress(&self) -> u64 {
        self.progress
    }

    /// Returns the announced task and subtask.
    pub fn tasks(&self) -> (&str, &str) {
        (&self.task, &self.subtask)
    }

    fn poll(&mut self) -> Result<(), Canceled> {
        self.polls += 1;
        if self.user_cancelled {
            return Err(Canceled);
        }
        if let Some(limit) = self.cancel_after {
            if self.polls > limit {
                return Err(Canceled);
            }
        }
        Ok(())
    }
}

impl ProgressListener for CancelableProgress {
    fn set_tasks(&mut self, task: &str, subtask: &str) {
        self.task = task.to_string();
        self.subtask = subtask.to_string();
    }

    fn set_subtask(&mut self, subtask: &str) {
        self.subtask = subtask.to_string();
    }

    fn set_maximum(&mut self, maximum: u64) {
        self.maximum = maximum;
    }

    fn set_progress(&mut self, progress: u64) -> Result<(), Canceled> {
        self.progress = progress;
        self.poll()
    }

    fn increment_progress(&mut self) -> Result<(), Canceled> {
        self.progress += 1;
        self.poll()
    }

    fn check_for_cancel(&mut self) -> Result<(), Canceled> {
        self.poll()
    }

    fn set_user_cancelled(&mut self, cancelled: bool) {
        self.user_cancelled = cancelled;
    }
}
