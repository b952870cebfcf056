use anyhow::{bail, Result};
use std::io::{self, Write};

use crate::error::BoardError;
use crate::store::Store;

pub fn run(store: &Store, id: i64, force: bool) -> Result<()> {
    let post = match store.get_post(id)? {
        Some(p) => p,
        None => bail!("Question #{} not found", id),
    };

    if !force {
        print!("Delete question #{} \"{}\"? [y/N] ", id, post.title);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let requester = store.current_name()?;
    match store.delete_post(id, &requester) {
        Ok(()) => {
            println!("Deleted question #{}", id);
            Ok(())
        }
        Err(BoardError::NotOwner) => bail!("You can only delete your own question."),
        Err(BoardError::NotFound) => bail!("Question #{} not found", id),
        Err(e) => Err(e.into()),
    }
}

/// Internal function for testing without stdin interaction
#[cfg(test)]
pub fn run_force(store: &Store, id: i64) -> Result<()> {
    run(store, id, true)
}
