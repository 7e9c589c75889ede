//! Frame clock and caret blink.
//!
//! The host calls `process_frame` once per displayed frame; that tick is the
//! only clock the editor has. The caret phase is derived from the frame on
//! which editing started, so every edit begins with the caret visible.

/// A free-running frame counter. Wraps instead of overflowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCounter {
    frame: u64,
}

impl FrameCounter {
    pub fn now(&self) -> u64 {
        self.frame
    }

    /// Advance one frame and return the new count.
    pub fn tick(&mut self) -> u64 {
        self.frame = self.frame.wrapping_add(1);
        self.frame
    }

    /// Frames elapsed since `since`, correct across a wrap.
    pub fn since(&self, since: u64) -> u64 {
        self.frame.wrapping_sub(since)
    }
}

/// Whether the caret is drawn `elapsed` frames after editing began.
/// On for `period` frames, off for `period` frames.
pub fn caret_visible(elapsed: u64, period: u32) -> bool {
    let period = u64::from(period.max(1));
    (elapsed / period) % 2 == 0
}
