//! Interaction feedback seam.
//!
//! Hosts implement `FeedbackSink` to play haptics or sounds; core only
//! decides which cue fits an interaction.

/// Interaction cue emitted after a successful user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCue {
    TaskAdded,
    TaskDeleted,
    TaskMoved,
    DayChanged,
}

pub trait FeedbackSink {
    fn emit(&self, cue: FeedbackCue);
}

/// Sink that drops every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFeedback;

impl FeedbackSink for NoopFeedback {
    fn emit(&self, _cue: FeedbackCue) {}
}

impl<F> FeedbackSink for F
where
    F: Fn(FeedbackCue),
{
    fn emit(&self, cue: FeedbackCue) {
        self(cue)
    }
}
