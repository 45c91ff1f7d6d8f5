/// Frame events and the per-tick payload handed to listeners.

use std::fmt;
use std::str::FromStr;
use crate::error::Error;

/// Named per-frame signal
///
/// The host publishes these in declaration order once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrameEvent {
    /// Start of the tick: input, camera, simulation
    FrameBegin,
    /// Draw submission
    FrameRender,
    /// After rendering: picking, statistics, cleanup
    FrameEnd,
}

impl FrameEvent {
    /// Every event, in publication order
    pub const ALL: [FrameEvent; 3] = [
        FrameEvent::FrameBegin,
        FrameEvent::FrameRender,
        FrameEvent::FrameEnd,
    ];

    /// Stable name of the event
    pub fn name(&self) -> &'static str {
        match self {
            FrameEvent::FrameBegin => "frame-begin",
            FrameEvent::FrameRender => "frame-render",
            FrameEvent::FrameEnd => "frame-end",
        }
    }
}

impl fmt::Display for FrameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FrameEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FrameEvent::ALL
            .iter()
            .copied()
            .find(|event| event.name() == s)
            .ok_or_else(|| Error::InvalidState(format!("unknown frame event '{}'", s)))
    }
}

/// Payload of one frame tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTick {
    /// Zero-based index of the tick
    pub frame: u64,
    /// Seconds elapsed since the previous tick
    pub delta_seconds: f32,
}

impl FrameTick {
    pub fn new(frame: u64, delta_seconds: f32) -> Self {
        Self { frame, delta_seconds }
    }
}
