use std::fmt;

use serde::{Deserialize, Serialize};

use super::color::Rgb;

/// Progress state of a task or group. Serialized as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Delayed,
    Blocked,
    #[serde(rename = "Action Needed")]
    ActionNeeded,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Delayed,
        TaskStatus::Blocked,
        TaskStatus::ActionNeeded,
        TaskStatus::Completed,
    ];

    /// Position in [`TaskStatus::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not Started",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Delayed => "Delayed",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::ActionNeeded => "Action Needed",
            TaskStatus::Completed => "Completed",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            TaskStatus::NotStarted => Rgb::new(0x80, 0x80, 0x80),
            TaskStatus::InProgress => Rgb::new(0x4C, 0x91, 0x41),
            TaskStatus::Delayed => Rgb::new(0xFF, 0xA5, 0x00),
            TaskStatus::Blocked => Rgb::new(0xCC, 0x00, 0x00),
            TaskStatus::ActionNeeded => Rgb::new(0x4A, 0x00, 0x72),
            TaskStatus::Completed => Rgb::new(0x00, 0xB4, 0xD8),
        }
    }

    /// Case-insensitive lookup by label.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_position_in_all() {
        for (i, status) in TaskStatus::ALL.iter().enumerate() {
            assert_eq!(status.index(), i);
        }
    }

    #[test]
    fn labels_round_trip_case_insensitively() {
        assert_eq!(
            TaskStatus::from_label("action needed"),
            Some(TaskStatus::ActionNeeded)
        );
        assert_eq!(
            TaskStatus::from_label(" IN PROGRESS "),
            Some(TaskStatus::InProgress)
        );
        assert_eq!(TaskStatus::from_label("Done"), None);
    }

    #[test]
    fn serialized_as_display_label() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::NotStarted).unwrap(),
            "\"Not Started\""
        );
        let parsed: TaskStatus = serde_json::from_str("\"Action Needed\"").unwrap();
        assert_eq!(parsed, TaskStatus::ActionNeeded);
    }

    #[test]
    fn fixed_palette() {
        assert_eq!(TaskStatus::NotStarted.color().to_hex(), "#808080");
        assert_eq!(TaskStatus::Blocked.color().to_hex(), "#CC0000");
        assert_eq!(TaskStatus::Completed.color().to_hex(), "#00B4D8");
    }
}
