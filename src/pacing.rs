use std::time::Duration;

/// Politeness delays toward the upstream service: one after every caption
/// download attempt, one after every processed video.
///
/// Injected rather than hard-coded so tests can run without wall-clock
/// waits.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    caption_delay: Duration,
    video_delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            caption_delay: delay,
            video_delay: delay,
        }
    }

    /// Block after a caption download attempt, regardless of its outcome
    pub fn after_caption(&self) {
        if !self.caption_delay.is_zero() {
            std::thread::sleep(self.caption_delay);
        }
    }

    /// Block after a processed video
    pub fn after_video(&self) {
        if !self.video_delay.is_zero() {
            std::thread::sleep(self.video_delay);
        }
    }
}
