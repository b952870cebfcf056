use anyhow::Result;

use crate::commands::{excerpt, time_ago};
use crate::models::Post;
use crate::store::Store;

const EXCERPT_CHARS: usize = 160;

pub fn run(store: &Store) -> Result<()> {
    let posts = feed_order(store.posts()?);

    if posts.is_empty() {
        println!("No questions yet. Be the first to ask!");
        return Ok(());
    }

    for post in posts {
        let edited = if post.updated_at.is_some() {
            " • edited"
        } else {
            ""
        };
        println!("#{} [{}] {}", post.id, post.subject, post.title);
        println!(
            "  by {} • {}{}",
            post.display_author(),
            time_ago(post.created_at),
            edited
        );
        println!("  {}", excerpt(&post.details, EXCERPT_CHARS));
        println!();
    }

    Ok(())
}

/// Feed order: most recent first, regardless of storage order.
pub fn feed_order(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}
