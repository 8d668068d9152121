use std::time::Duration;
use futures::channel::mpsc::Sender;
use serde::{Deserialize, Serialize};

pub const PATTERN_KINDS: [PatternKind; 4] = [
    PatternKind::Constant,
    PatternKind::Pulse,
    PatternKind::Wave,
    PatternKind::Heartbeat,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternKind {
    Constant,
    Pulse,
    Wave,
    Heartbeat,
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            PatternKind::Constant => "Constant",
            PatternKind::Pulse => "Pulse",
            PatternKind::Wave => "Wave",
            PatternKind::Heartbeat => "Heartbeat",
        };

        write!(f, "{}", result)
    }
}

/// A single step of a vibration pattern: both motor levels are applied
/// together and held for the given duration before the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommand {
    pub left: u8,
    pub right: u8,
    pub hold: Duration,
}

impl MotorCommand {
    /// Both motors at the same level.
    pub fn uniform(level: u8, hold_secs: f64) -> MotorCommand {
        MotorCommand {
            left: level,
            right: level,
            hold: Duration::from_secs_f64(hold_secs),
        }
    }
}

/// Shared between the controlling side (writer) and the pattern worker
/// (reader), behind a mutex that is held only for the snapshot/update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub intensity: u8,
    pub pattern: PatternKind,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            intensity: 128,
            pattern: PatternKind::Constant,
        }
    }
}

#[derive(Debug, Clone)]
pub enum EngineCommand {
    Start { intensity: u8, pattern: PatternKind },
    Stop,
    SetIntensity(u8),
    SetPattern(PatternKind),
}

#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Sent once when the engine task has started; carries the channel the
    /// gui uses to issue commands.
    Ready(Sender<EngineCommand>),
    /// The level just applied to the motors: max(left, right).
    IntensityChanged(u8),
    /// At most one per run; the run is stopped before this is delivered.
    Error(String),
}
