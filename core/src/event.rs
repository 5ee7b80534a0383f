//! The viewer event outbox: observable side effects for UI collaborators.
//!
//! RULE: the engine appends an event for every observable state change.
//! Collaborators (labels, sliders, info panels) drain the outbox and
//! refresh; they never poll engine internals for change detection.

use crate::{
    entity::EntityRef,
    types::FrameIndex,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerEvent {
    // ── Data ───────────────────────────────────────
    DataLoaded {
        frames: usize,
    },

    // ── Frame store ────────────────────────────────
    FrameChanged {
        index: FrameIndex,
    },

    // ── Transitions ────────────────────────────────
    TransitionStarted {
        from: FrameIndex,
        to:   FrameIndex,
    },
    TransitionCompleted {
        index: FrameIndex,
    },
    TransitionAbandoned {
        index: FrameIndex,
    },

    // ── Playback ───────────────────────────────────
    PlaybackStarted {
        index: FrameIndex,
    },
    PlaybackStopped {
        index:  FrameIndex,
        reason: StopReason,
    },
    SpeedChanged {
        speed_ms: u64,
    },
    InterpolationToggled {
        enabled: bool,
    },

    // ── Selection ──────────────────────────────────
    SelectionChanged {
        selection: Option<EntityRef>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Paused,
    EndOfSequence,
    DataReloaded,
}

/// Stable name of an event variant, for log lines.
pub fn event_type_name(event: &ViewerEvent) -> &'static str {
    match event {
        ViewerEvent::DataLoaded { .. }           => "data_loaded",
        ViewerEvent::FrameChanged { .. }         => "frame_changed",
        ViewerEvent::TransitionStarted { .. }    => "transition_started",
        ViewerEvent::TransitionCompleted { .. }  => "transition_completed",
        ViewerEvent::TransitionAbandoned { .. }  => "transition_abandoned",
        ViewerEvent::PlaybackStarted { .. }      => "playback_started",
        ViewerEvent::PlaybackStopped { .. }      => "playback_stopped",
        ViewerEvent::SpeedChanged { .. }         => "speed_changed",
        ViewerEvent::InterpolationToggled { .. } => "interpolation_toggled",
        ViewerEvent::SelectionChanged { .. }     => "selection_changed",
    }
}
