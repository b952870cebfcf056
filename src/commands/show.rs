use anyhow::{bail, Result};

use crate::commands::time_ago;
use crate::models::Answer;
use crate::store::Store;

pub fn run(store: &Store, id: i64) -> Result<()> {
    let post = match store.get_post(id)? {
        Some(p) => p,
        None => bail!("Question #{} not found", id),
    };

    println!("#{} {}", post.id, post.title);
    let edited = if post.updated_at.is_some() {
        " • edited"
    } else {
        ""
    };
    println!(
        "{} • by {} • {}{}",
        post.subject,
        post.display_author(),
        time_ago(post.created_at),
        edited
    );
    println!();
    for line in post.details.lines() {
        println!("  {}", line);
    }

    let answers = answer_order(store.answers_for(id)?);
    println!();
    if answers.is_empty() {
        println!("No answers yet. Share what you know!");
        return Ok(());
    }

    println!("Answers:");
    for answer in answers {
        let edited = if answer.updated_at.is_some() {
            " • edited"
        } else {
            ""
        };
        println!("  #{} {}", answer.id, answer.details);
        println!(
            "     by {} • {}{}",
            answer.display_author(),
            time_ago(answer.created_at),
            edited
        );
    }

    Ok(())
}

/// Answers display oldest first.
pub fn answer_order(mut answers: Vec<Answer>) -> Vec<Answer> {
    answers.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    answers
}
