use crate::types::FrameIndex;
use serde::{Deserialize, Serialize};

/// Every command a timeline-controls or picking collaborator may issue.
/// Each maps 1:1 onto an `ObserverEngine` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ViewerCommand {
    // ── Playback ──────────────────────────────────
    Play,
    Pause,
    TogglePlayPause,
    SetSpeed { speed_ms: u64 },

    // ── Navigation ────────────────────────────────
    StepForward,
    StepBack,
    FirstFrame,
    LastFrame,
    Seek { index: FrameIndex },
    Scrub { index: FrameIndex },
    SetInterpolation { enabled: bool },

    // ── Selection ─────────────────────────────────
    SelectAt { x: f64, y: f64 },
    ClearSelection,
}

/// Keyboard keys bound to timeline controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKey {
    Space,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
}

impl ControlKey {
    pub fn command(&self) -> ViewerCommand {
        match self {
            Self::Space      => ViewerCommand::TogglePlayPause,
            Self::ArrowLeft  => ViewerCommand::StepBack,
            Self::ArrowRight => ViewerCommand::StepForward,
            Self::Home       => ViewerCommand::FirstFrame,
            Self::End        => ViewerCommand::LastFrame,
        }
    }

    /// Map a DOM-style key name (`" "`, `"ArrowLeft"`, ...).
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            " " | "Space"  => Some(Self::Space),
            "ArrowLeft"    => Some(Self::ArrowLeft),
            "ArrowRight"   => Some(Self::ArrowRight),
            "Home"         => Some(Self::Home),
            "End"          => Some(Self::End),
            _              => None,
        }
    }
}
