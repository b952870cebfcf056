use anyhow::{bail, Result};
use std::io::{self, Write};

use crate::commands::{show, time_ago};
use crate::error::BoardError;
use crate::store::Store;
use crate::validate::validate_answer;

fn resolve_author(store: &Store, author: Option<&str>) -> Result<String> {
    match author {
        Some(a) => Ok(a.to_string()),
        None => Ok(store.current_name()?),
    }
}

pub fn add(store: &Store, post_id: i64, author: Option<&str>, details: &str) -> Result<()> {
    if store.get_post(post_id)?.is_none() {
        bail!("Question #{} not found", post_id);
    }

    let author = resolve_author(store, author)?;
    if let Err(errors) = validate_answer(&author, details) {
        return Err(BoardError::Validation(errors).into());
    }

    store.set_current_name(author.trim())?;
    let answer = store.create_answer(post_id, &author, details)?;
    println!("Posted answer #{} on question #{}", answer.id, post_id);

    Ok(())
}

pub fn edit(
    store: &Store,
    post_id: i64,
    answer_id: i64,
    author: Option<&str>,
    details: &str,
) -> Result<()> {
    let author = resolve_author(store, author)?;
    if let Err(errors) = validate_answer(&author, details) {
        return Err(BoardError::Validation(errors).into());
    }

    match store.update_answer(post_id, answer_id, &author, details) {
        Ok(answer) => {
            store.set_current_name(author.trim())?;
            println!("Updated answer #{}", answer.id);
            Ok(())
        }
        Err(BoardError::NotFound) => bail!("Answer #{} not found on question #{}", answer_id, post_id),
        Err(BoardError::NotOwner) => bail!("You can only edit your own answer."),
        Err(e) => Err(e.into()),
    }
}

pub fn remove(store: &Store, post_id: i64, answer_id: i64, force: bool) -> Result<()> {
    if !force {
        print!("Delete answer #{}? [y/N] ", answer_id);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let requester = store.current_name()?;
    match store.delete_answer(post_id, answer_id, &requester) {
        Ok(()) => {
            println!("Deleted answer #{}", answer_id);
            Ok(())
        }
        Err(BoardError::NotFound) => bail!("Answer #{} not found on question #{}", answer_id, post_id),
        Err(BoardError::NotOwner) => bail!("You can only delete your own answer."),
        Err(e) => Err(e.into()),
    }
}

pub fn list(store: &Store, post_id: i64) -> Result<()> {
    if store.get_post(post_id)?.is_none() {
        bail!("Question #{} not found", post_id);
    }

    let answers = show::answer_order(store.answers_for(post_id)?);
    if answers.is_empty() {
        println!("No answers yet. Share what you know!");
        return Ok(());
    }

    for answer in answers {
        let edited = if answer.updated_at.is_some() {
            " • edited"
        } else {
            ""
        };
        println!("#{} {}", answer.id, answer.details);
        println!(
            "   by {} • {}{}",
            answer.display_author(),
            time_ago(answer.created_at),
            edited
        );
    }

    Ok(())
}
