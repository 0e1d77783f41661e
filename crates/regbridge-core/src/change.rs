//! Change detection for the control read-back channel.

/// Tracks the last control value actually forwarded to subscribers.
///
/// Starts unset so the first successful read is always forwarded. The cell
/// is only advanced by [`mark_published`](ChangeTracker::mark_published),
/// never by a read attempt, so a failed read or failed publish leaves the
/// comparison baseline at the last value that really went out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    last_published: Option<u16>,
}

impl ChangeTracker {
    /// Create a tracker with no published value yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a freshly read value must be forwarded.
    #[must_use]
    pub fn needs_publish(&self, value: u16) -> bool {
        self.last_published != Some(value)
    }

    /// Record that `value` was forwarded.
    pub fn mark_published(&mut self, value: u16) {
        self.last_published = Some(value);
    }

    /// The last forwarded value, if any.
    #[must_use]
    pub fn last_published(&self) -> Option<u16> {
        self.last_published
    }
}
