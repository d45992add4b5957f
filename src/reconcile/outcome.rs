//! Structured result of a batch save.

use serde::Serialize;

use crate::models::Level;

/// A pending edit that was not persisted.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SaveFailure {
    pub id: String,
    /// Absent when the id could not be classified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    pub saved: usize,
    pub has_errors: bool,
    pub failures: Vec<SaveFailure>,
    /// Whether the snapshot was reloaded after the batch.
    pub refreshed: bool,
    /// Edits still pending after the save.
    pub remaining: usize,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A user-facing message about a save.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl SaveReport {
    /// One success notice with the count, one notice per failure, and a
    /// closing notice when nothing at all was saved.
    ///
    /// Failures sharing a cause are not merged.
    pub fn notices(&self) -> Vec<Notice> {
        let mut notices = Vec::with_capacity(self.failures.len() + 1);

        for failure in &self.failures {
            let subject = match failure.level {
                Some(level) => format!("{} \"{}\"", level, failure.name),
                None => format!("item \"{}\"", failure.name),
            };
            notices.push(Notice {
                kind: NoticeKind::Error,
                message: format!("Failed to update {}: {}", subject, failure.message),
            });
        }

        if self.saved > 0 {
            notices.push(Notice {
                kind: NoticeKind::Success,
                message: format!("{} rule(s) saved successfully", self.saved),
            });
        } else if self.has_errors {
            notices.push(Notice {
                kind: NoticeKind::Error,
                message: "No rule was saved".to_string(),
            });
        }

        notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(id: &str, level: Option<Level>, name: &str, message: &str) -> SaveFailure {
        SaveFailure {
            id: id.to_string(),
            level,
            name: name.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_notices_for_mixed_outcome() {
        let report = SaveReport {
            saved: 2,
            has_errors: true,
            failures: vec![failure("2-1", Some(Level::Type), "Boleto Bancário", "Regra inválida")],
            refreshed: true,
            remaining: 1,
        };

        let notices = report.notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].kind, NoticeKind::Error);
        assert_eq!(
            notices[0].message,
            "Failed to update type \"Boleto Bancário\": Regra inválida"
        );
        assert_eq!(notices[1].kind, NoticeKind::Success);
        assert_eq!(notices[1].message, "2 rule(s) saved successfully");
    }

    #[test]
    fn test_notices_for_total_failure_keep_one_per_item() {
        let report = SaveReport {
            saved: 0,
            has_errors: true,
            failures: vec![
                failure("1", Some(Level::Class), "A", "HTTP error, status 500"),
                failure("x", None, "x", "Id x is ambiguous: it appears as class, label"),
            ],
            refreshed: true,
            remaining: 2,
        };

        let notices = report.notices();
        assert_eq!(notices.len(), 3);
        assert!(notices[1].message.starts_with("Failed to update item \"x\""));
        assert_eq!(notices[2].message, "No rule was saved");
    }

    #[test]
    fn test_empty_report_has_no_notices() {
        assert!(SaveReport::default().notices().is_empty());
    }
}
