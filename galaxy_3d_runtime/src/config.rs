//! Runtime configuration

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Name used in logs
    pub name: String,
    /// Upper bound of the delta handed to frame listeners, in seconds
    ///
    /// Long stalls (debugger breaks, window drags) would otherwise reach
    /// listeners as one huge step. Zero or a non-finite value disables clamping.
    pub max_delta_seconds: f32,
    /// Log every tick at Trace severity
    pub trace_frames: bool,
    /// Publish `FrameEvent::FrameEnd` after `FrameRender` on each tick
    pub publish_frame_end: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            name: "Galaxy3D Runtime".to_string(),
            max_delta_seconds: 0.25,
            trace_frames: false,
            publish_frame_end: true,
        }
    }
}

impl RuntimeConfig {
    /// Delta actually delivered to listeners for a raw `delta_seconds`
    ///
    /// Negative and non-finite inputs become `0.0`.
    pub fn clamp_delta(&self, delta_seconds: f32) -> f32 {
        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            return 0.0;
        }
        if self.max_delta_seconds.is_finite() && self.max_delta_seconds > 0.0 {
            delta_seconds.min(self.max_delta_seconds)
        } else {
            delta_seconds
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
