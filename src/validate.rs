//! Submission validation. Checks are all-or-nothing per submission: every
//! field is inspected and all violations come back together, so a caller can
//! surface them next to each field in one pass.

use crate::models::valid_subject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Author,
    Subject,
    Title,
    Details,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Author => "author",
            Field::Subject => "subject",
            Field::Title => "title",
            Field::Details => "details",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

pub const MIN_AUTHOR_LEN: usize = 2;
pub const MIN_TITLE_LEN: usize = 8;
pub const MIN_POST_DETAILS_LEN: usize = 24;
pub const MIN_ANSWER_DETAILS_LEN: usize = 4;

fn too_short(value: &str, min: usize) -> bool {
    value.trim().chars().count() < min
}

/// Validate a question submission (create or edit).
pub fn validate_post(
    author: &str,
    subject: &str,
    title: &str,
    details: &str,
) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if too_short(author, MIN_AUTHOR_LEN) {
        errors.push(FieldError {
            field: Field::Author,
            message: "Please enter your name.",
        });
    }
    if !valid_subject(subject) {
        errors.push(FieldError {
            field: Field::Subject,
            message: "Please select a subject.",
        });
    }
    if too_short(title, MIN_TITLE_LEN) {
        errors.push(FieldError {
            field: Field::Title,
            message: "Title should be at least 8 characters.",
        });
    }
    if too_short(details, MIN_POST_DETAILS_LEN) {
        errors.push(FieldError {
            field: Field::Details,
            message: "Please add more details (at least 24 characters).",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate an answer submission (create or edit).
pub fn validate_answer(author: &str, details: &str) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if too_short(author, MIN_AUTHOR_LEN) {
        errors.push(FieldError {
            field: Field::Author,
            message: "Please enter your name.",
        });
    }
    if too_short(details, MIN_ANSWER_DETAILS_LEN) {
        errors.push(FieldError {
            field: Field::Details,
            message: "Answer is too short.",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
