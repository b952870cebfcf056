use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subjects a question can be filed under. The submission form rejects
/// anything outside this list.
pub const SUBJECTS: [&str; 7] = [
    "Math",
    "Science",
    "English",
    "History",
    "Languages",
    "Arts",
    "Other",
];

pub fn valid_subject(subject: &str) -> bool {
    SUBJECTS.contains(&subject)
}

/// A student-submitted question. Field names in storage follow the original
/// camelCase schema; `updated_at` is present iff the post was edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub author: String,
    pub subject: String,
    pub title: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A response attached to exactly one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: i64,
    pub author: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn display_author(&self) -> &str {
        if self.author.is_empty() {
            "Anonymous"
        } else {
            &self.author
        }
    }
}

impl Answer {
    pub fn display_author(&self) -> &str {
        if self.author.is_empty() {
            "Anonymous"
        } else {
            &self.author
        }
    }
}
