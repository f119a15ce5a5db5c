//! Recording VFX sink.

use battle_core::{VfxRequest, VfxSink};

/// Collects one-shot VFX requests for the render layer (and for tests).
#[derive(Debug, Default)]
pub struct RecordingVfx {
    spawned: Vec<VfxRequest>,
}

impl RecordingVfx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[VfxRequest] {
        &self.spawned
    }

    /// Hands the pending requests to the renderer and clears the queue.
    pub fn drain(&mut self) -> Vec<VfxRequest> {
        std::mem::take(&mut self.spawned)
    }
}

impl VfxSink for RecordingVfx {
    fn spawn(&mut self, request: VfxRequest) {
        self.spawned.push(request);
    }
}
