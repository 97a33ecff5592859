use std::collections::HashMap;

/// Per-channel video counts for one batch run.
///
/// The count doubles as the video's position in output filenames: a
/// channel's first processed video is 1, its second is 2, independent
/// of where the videos sit in the URL list. Never persisted.
#[derive(Debug, Default)]
pub struct ChannelCounter {
    counts: HashMap<String, u64>,
}

impl ChannelCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the channel's count and return the new 1-based position
    pub fn bump(&mut self, author: &str) -> u64 {
        let count = self.counts.entry(author.to_owned()).or_insert(0);
        *count += 1;
        *count
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_per_channel() {
        let mut counter = ChannelCounter::new();

        assert_eq!(counter.bump("Author X"), 1);
        assert_eq!(counter.bump("Author Y"), 1);
        assert_eq!(counter.bump("Author X"), 2);
        assert_eq!(counter.bump("Author X"), 3);
        assert_eq!(counter.bump("Author Y"), 2);
    }
}
