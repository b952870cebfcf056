use anyhow::Result;

use crate::error::BoardError;
use crate::store::Store;
use crate::validate::validate_post;

pub fn run(store: &Store, author: &str, subject: &str, title: &str, details: &str) -> Result<()> {
    if let Err(errors) = validate_post(author, subject, title, details) {
        return Err(BoardError::Validation(errors).into());
    }

    // A successful submission is what sets the remembered name
    store.set_current_name(author.trim())?;
    let post = store.create_post(author, subject, title, details)?;
    println!("Posted question #{}", post.id);

    Ok(())
}
