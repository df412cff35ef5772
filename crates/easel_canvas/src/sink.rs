//! Frame sinks
//!
//! Each tick renders into a [`RecordingContext`](easel_core::RecordingContext)
//! and hands the resulting command list to a [`FrameSink`]. A windowing
//! backend, an image encoder, or a test can sit behind this trait.

use easel_core::{DrawCommand, Size};
use std::sync::{Arc, Mutex, MutexGuard};

/// The recorded output of one tick
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedFrame {
    pub frame: u64,
    pub viewport: Size,
    pub commands: Vec<DrawCommand>,
}

/// Receives every rendered frame
pub trait FrameSink: Send {
    fn present(&mut self, frame: RenderedFrame);
}

/// Discards frames
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _frame: RenderedFrame) {}
}

/// Keeps rendered frames in memory, optionally only the most recent few.
///
/// Clones share the same buffer, so one clone can be handed to a canvas
/// while another is inspected.
#[derive(Clone, Debug, Default)]
pub struct CapturedFrames {
    frames: Arc<Mutex<Vec<RenderedFrame>>>,
    limit: Option<usize>,
}

impl CapturedFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` frames, dropping the oldest
    pub fn with_limit(limit: usize) -> Self {
        Self {
            frames: Arc::default(),
            limit: Some(limit.max(1)),
        }
    }

    pub fn frames(&self) -> Vec<RenderedFrame> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<RenderedFrame> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RenderedFrame>> {
        crate::lock(&self.frames)
    }
}

impl FrameSink for CapturedFrames {
    fn present(&mut self, frame: RenderedFrame) {
        let mut frames = self.lock();
        frames.push(frame);
        if let Some(limit) = self.limit {
            let excess = frames.len().saturating_sub(limit);
            frames.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: u64) -> RenderedFrame {
        RenderedFrame {
            frame: n,
            viewport: Size::new(10.0, 10.0),
            commands: Vec::new(),
        }
    }

    #[test]
    fn test_captured_frames_share_buffer() {
        let captured = CapturedFrames::new();
        let mut sink = captured.clone();
        sink.present(frame(0));
        sink.present(frame(1));
        assert_eq!(captured.len(), 2);
        assert_eq!(captured.last().map(|f| f.frame), Some(1));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let captured = CapturedFrames::with_limit(2);
        let mut sink = captured.clone();
        for n in 0..5 {
            sink.present(frame(n));
        }
        let kept: Vec<u64> = captured.frames().iter().map(|f| f.frame).collect();
        assert_eq!(kept, vec![3, 4]);
    }

    #[test]
    fn test_poisoned_buffer_keeps_recording() {
        let frames = CapturedFrames::new();
        let holder = frames.clone();
        let poisoned = std::thread::spawn(move || {
            let _guard = holder.lock();
            panic!("sink consumer failed");
        })
        .join();
        assert!(poisoned.is_err());

        let mut sink = frames.clone();
        sink.present(frame(1));
        assert_eq!(frames.len(), 1);
    }
}
