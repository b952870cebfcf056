use anyhow::{bail, Result};

use crate::error::BoardError;
use crate::store::Store;
use crate::validate::validate_post;

/// Ownership-checked edit. A name mismatch is a hard rejection; it never
/// falls back to creating a second question.
pub fn run(
    store: &Store,
    id: i64,
    author: Option<&str>,
    subject: &str,
    title: &str,
    details: &str,
) -> Result<()> {
    let author = match author {
        Some(a) => a.to_string(),
        None => store.current_name()?,
    };

    if let Err(errors) = validate_post(&author, subject, title, details) {
        return Err(BoardError::Validation(errors).into());
    }

    match store.update_post(id, &author, subject, title, details) {
        Ok(post) => {
            store.set_current_name(author.trim())?;
            println!("Updated question #{}", post.id);
            Ok(())
        }
        Err(BoardError::NotFound) => bail!("Question #{} not found", id),
        Err(BoardError::NotOwner) => bail!("You can only edit your own question."),
        Err(e) => Err(e.into()),
    }
}
