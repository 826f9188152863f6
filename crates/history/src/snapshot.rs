use chrono::Utc;

/// Full-text capture of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Document text
    pub content: String,
    /// Capture time in Unix milliseconds (informational only)
    pub timestamp: i64,
}

impl Snapshot {
    /// Capture `content` with the current wall-clock time.
    pub fn new(content: impl Into<String>) -> Self {
        Self::at(content, Utc::now().timestamp_millis())
    }

    /// Capture `content` with an explicit timestamp.
    pub fn at(content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            content: content.into(),
            timestamp,
        }
    }

    /// Consume the snapshot, keeping only the text.
    pub fn into_content(self) -> String {
        self.content
    }
}

impl From<&str> for Snapshot {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for Snapshot {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_at_keeps_timestamp() {
        let snapshot = Snapshot::at("text", 42);
        assert_eq!(snapshot.content, "text");
        assert_eq!(snapshot.timestamp, 42);
    }

    #[test]
    fn test_snapshot_new_is_timestamped() {
        let before = Utc::now().timestamp_millis();
        let snapshot = Snapshot::from("text");
        assert!(snapshot.timestamp >= before);
        assert_eq!(snapshot.into_content(), "text");
    }
}
