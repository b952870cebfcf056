use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::error::{BoardError, Result};
use crate::models::{Answer, Post};

/// Storage keys, kept byte-for-byte compatible with the original board's
/// localStorage layout.
const KEY_NAME: &str = "studentName";
const KEY_POSTS: &str = "hhf_posts";
const KEY_ANSWERS: &str = "hhf_answers";

/// The persistent board store: a single-file key-value table holding the
/// remembered display name, the post list, and the per-post answer lists as
/// JSON payloads. One local actor, immediate blocking reads and writes.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Store { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    // Identity

    /// The remembered display name, or empty string if none was ever set.
    pub fn current_name(&self) -> Result<String> {
        Ok(self.get(KEY_NAME)?.unwrap_or_default())
    }

    /// Persists the given name verbatim, including the empty string.
    pub fn set_current_name(&self, name: &str) -> Result<()> {
        self.set(KEY_NAME, name)
    }

    // Posts

    /// All posts in storage order (newest first by insertion). Sorting for
    /// display is the presentation layer's concern.
    pub fn posts(&self) -> Result<Vec<Post>> {
        let raw = match self.get(KEY_POSTS)? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };
        match serde_json::from_str(&raw) {
            Ok(posts) => Ok(posts),
            Err(err) => {
                warn!(key = KEY_POSTS, %err, "corrupt payload, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    fn save_posts(&self, posts: &[Post]) -> Result<()> {
        let raw = serde_json::to_string(posts)?;
        self.set(KEY_POSTS, &raw)
    }

    pub fn get_post(&self, id: i64) -> Result<Option<Post>> {
        Ok(self.posts()?.into_iter().find(|p| p.id == id))
    }

    pub fn create_post(
        &self,
        author: &str,
        subject: &str,
        title: &str,
        details: &str,
    ) -> Result<Post> {
        let mut posts = self.posts()?;
        let post = Post {
            id: fresh_id(posts.iter().map(|p| p.id)),
            author: author.trim().to_string(),
            subject: subject.to_string(),
            title: title.trim().to_string(),
            details: details.trim().to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };
        posts.insert(0, post.clone());
        self.save_posts(&posts)?;
        Ok(post)
    }

    /// Replaces subject/title/details and stamps `updated_at`. The id,
    /// author, and creation time are untouched.
    pub fn update_post(
        &self,
        id: i64,
        author: &str,
        subject: &str,
        title: &str,
        details: &str,
    ) -> Result<Post> {
        let mut posts = self.posts()?;
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(BoardError::NotFound)?;
        authorize(&post.author, author)?;

        post.subject = subject.to_string();
        post.title = title.trim().to_string();
        post.details = details.trim().to_string();
        post.updated_at = Some(Utc::now());
        let updated = post.clone();
        self.save_posts(&posts)?;
        Ok(updated)
    }

    /// Removes the post and its answer list in the same operation, so a
    /// deleted question never leaves orphaned answers behind.
    pub fn delete_post(&self, id: i64, requester: &str) -> Result<()> {
        let mut posts = self.posts()?;
        let post = posts
            .iter()
            .find(|p| p.id == id)
            .ok_or(BoardError::NotFound)?;
        authorize(&post.author, requester)?;

        posts.retain(|p| p.id != id);
        self.save_posts(&posts)?;

        let mut answers = self.answers()?;
        if answers.remove(&id).is_some() {
            self.save_answers(&answers)?;
        }
        Ok(())
    }

    // Answers

    fn answers(&self) -> Result<BTreeMap<i64, Vec<Answer>>> {
        let raw = match self.get(KEY_ANSWERS)? {
            Some(raw) => raw,
            None => return Ok(BTreeMap::new()),
        };
        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(err) => {
                warn!(key = KEY_ANSWERS, %err, "corrupt payload, treating as empty");
                Ok(BTreeMap::new())
            }
        }
    }

    fn save_answers(&self, answers: &BTreeMap<i64, Vec<Answer>>) -> Result<()> {
        let raw = serde_json::to_string(answers)?;
        self.set(KEY_ANSWERS, &raw)
    }

    /// Answers for a post in storage order (append order), empty if none.
    pub fn answers_for(&self, post_id: i64) -> Result<Vec<Answer>> {
        Ok(self.answers()?.remove(&post_id).unwrap_or_default())
    }

    pub fn create_answer(&self, post_id: i64, author: &str, details: &str) -> Result<Answer> {
        let mut answers = self.answers()?;
        let list = answers.entry(post_id).or_default();
        let answer = Answer {
            id: fresh_id(list.iter().map(|a| a.id)),
            author: author.trim().to_string(),
            details: details.trim().to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };
        list.push(answer.clone());
        self.save_answers(&answers)?;
        Ok(answer)
    }

    pub fn update_answer(
        &self,
        post_id: i64,
        id: i64,
        author: &str,
        details: &str,
    ) -> Result<Answer> {
        let mut answers = self.answers()?;
        let list = answers.get_mut(&post_id).ok_or(BoardError::NotFound)?;
        let answer = list
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(BoardError::NotFound)?;
        authorize(&answer.author, author)?;

        answer.details = details.trim().to_string();
        answer.updated_at = Some(Utc::now());
        let updated = answer.clone();
        self.save_answers(&answers)?;
        Ok(updated)
    }

    pub fn delete_answer(&self, post_id: i64, id: i64, requester: &str) -> Result<()> {
        let mut answers = self.answers()?;
        let list = answers.get_mut(&post_id).ok_or(BoardError::NotFound)?;
        let answer = list.iter().find(|a| a.id == id).ok_or(BoardError::NotFound)?;
        authorize(&answer.author, requester)?;

        list.retain(|a| a.id != id);
        self.save_answers(&answers)?;
        Ok(())
    }
}

/// The entire ownership rule: the stored author must be non-empty and equal
/// to the requester. Nothing else in the crate compares author names.
/// Authors are stored trimmed, so the requester is trimmed before comparing;
/// a name submitted with surrounding whitespace still owns its posts.
pub fn authorize(owner: &str, requester: &str) -> Result<()> {
    let requester = requester.trim();
    if owner.is_empty() || owner != requester {
        return Err(BoardError::NotOwner);
    }
    Ok(())
}

/// Ids are millisecond timestamps for schema compatibility with existing
/// boards, but generation bumps past the collection's current maximum so two
/// submissions in the same millisecond can never collide.
fn fresh_id(existing: impl Iterator<Item = i64>) -> i64 {
    let now = Utc::now().timestamp_millis();
    let max = existing.max().unwrap_or(0);
    if now > max {
        now
    } else {
        max + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    const DETAILS: &str = "I don't understand how to factor quadratics at all, please help";

    fn setup_test_store() -> (Store, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.db");
        let store = Store::open(&path).unwrap();
        (store, dir)
    }

    // ==================== Identity ====================

    #[test]
    fn test_current_name_defaults_to_empty() {
        let (store, _dir) = setup_test_store();
        assert_eq!(store.current_name().unwrap(), "");
    }

    #[test]
    fn test_set_current_name_verbatim() {
        let (store, _dir) = setup_test_store();
        store.set_current_name("Al").unwrap();
        assert_eq!(store.current_name().unwrap(), "Al");

        // Empty string is a legal value, not a reset-to-default
        store.set_current_name("").unwrap();
        assert_eq!(store.current_name().unwrap(), "");
    }

    // ==================== Post CRUD ====================

    #[test]
    fn test_create_post_appears_in_list() {
        let (store, _dir) = setup_test_store();
        let post = store
            .create_post("Al", "Math", "Need help factoring", DETAILS)
            .unwrap();

        let posts = store.posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0], post);
        assert_eq!(posts[0].author, "Al");
        assert_eq!(posts[0].subject, "Math");
        assert_eq!(posts[0].title, "Need help factoring");
        assert!(posts[0].updated_at.is_none());
    }

    #[test]
    fn test_create_post_trims_fields() {
        let (store, _dir) = setup_test_store();
        let post = store
            .create_post("  Al  ", "Math", "  Need help factoring  ", DETAILS)
            .unwrap();
        assert_eq!(post.author, "Al");
        assert_eq!(post.title, "Need help factoring");
    }

    #[test]
    fn test_new_posts_are_prepended() {
        let (store, _dir) = setup_test_store();
        let first = store
            .create_post("Al", "Math", "First question", DETAILS)
            .unwrap();
        let second = store
            .create_post("Al", "Math", "Second question", DETAILS)
            .unwrap();

        let posts = store.posts().unwrap();
        assert_eq!(posts[0].id, second.id);
        assert_eq!(posts[1].id, first.id);
    }

    #[test]
    fn test_post_ids_are_unique() {
        let (store, _dir) = setup_test_store();
        let mut ids = Vec::new();
        for i in 0..20 {
            let post = store
                .create_post("Al", "Math", &format!("Question number {}", i), DETAILS)
                .unwrap();
            ids.push(post.id);
        }
        let mut deduped = ids.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn test_update_post_by_owner() {
        let (store, _dir) = setup_test_store();
        let post = store
            .create_post("Al", "Math", "Need help factoring", DETAILS)
            .unwrap();

        let updated = store
            .update_post(post.id, "Al", "Science", "A better title now", DETAILS)
            .unwrap();

        assert_eq!(updated.subject, "Science");
        assert_eq!(updated.title, "A better title now");
        assert!(updated.updated_at.is_some());
        // Identity fields survive the edit untouched
        assert_eq!(updated.id, post.id);
        assert_eq!(updated.author, post.author);
        assert_eq!(updated.created_at, post.created_at);
    }

    #[test]
    fn test_update_post_by_non_owner_changes_nothing() {
        let (store, _dir) = setup_test_store();
        let post = store
            .create_post("Al", "Math", "Need help factoring", DETAILS)
            .unwrap();

        let err = store
            .update_post(post.id, "Bo", "Science", "Hijacked title", DETAILS)
            .unwrap_err();
        assert!(err.is_not_owner());

        let stored = store.get_post(post.id).unwrap().unwrap();
        assert_eq!(stored, post);
    }

    #[test]
    fn test_anonymous_posts_are_never_owned() {
        let (store, _dir) = setup_test_store();
        let post = store
            .create_post("", "Math", "Need help factoring", DETAILS)
            .unwrap();

        // Not even a requester with an empty name owns an anonymous post
        let err = store.delete_post(post.id, "").unwrap_err();
        assert!(err.is_not_owner());
    }

    #[test]
    fn test_update_missing_post() {
        let (store, _dir) = setup_test_store();
        let err = store
            .update_post(99999, "Al", "Math", "Does not matter", DETAILS)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_post_removes_exactly_one() {
        let (store, _dir) = setup_test_store();
        let keep = store
            .create_post("Al", "Math", "Keep this one", DETAILS)
            .unwrap();
        let gone = store
            .create_post("Al", "Math", "Delete this one", DETAILS)
            .unwrap();

        store.delete_post(gone.id, "Al").unwrap();

        let posts = store.posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, keep.id);

        // Re-deleting signals NotFound
        let err = store.delete_post(gone.id, "Al").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_post_by_non_owner() {
        let (store, _dir) = setup_test_store();
        let post = store
            .create_post("Al", "Math", "Need help factoring", DETAILS)
            .unwrap();

        let err = store.delete_post(post.id, "Bo").unwrap_err();
        assert!(err.is_not_owner());
        assert_eq!(store.posts().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_post_cascades_answers() {
        let (store, _dir) = setup_test_store();
        let post = store
            .create_post("Al", "Math", "Need help factoring", DETAILS)
            .unwrap();
        store
            .create_answer(post.id, "Bo", "Try the AC method.")
            .unwrap();

        store.delete_post(post.id, "Al").unwrap();

        assert!(store.answers_for(post.id).unwrap().is_empty());
    }

    // ==================== Answer CRUD ====================

    #[test]
    fn test_answers_for_unknown_post_is_empty() {
        let (store, _dir) = setup_test_store();
        assert!(store.answers_for(12345).unwrap().is_empty());
    }

    #[test]
    fn test_answers_append_in_order() {
        let (store, _dir) = setup_test_store();
        let post = store
            .create_post("Al", "Math", "Need help factoring", DETAILS)
            .unwrap();

        for i in 0..5 {
            store
                .create_answer(post.id, "Bo", &format!("Answer {}", i))
                .unwrap();
        }

        let answers = store.answers_for(post.id).unwrap();
        assert_eq!(answers.len(), 5);
        for (i, answer) in answers.iter().enumerate() {
            assert_eq!(answer.details, format!("Answer {}", i));
        }
        // Ascending by creation time
        for pair in answers.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }
    }

    #[test]
    fn test_answers_are_scoped_to_their_post() {
        let (store, _dir) = setup_test_store();
        let a = store
            .create_post("Al", "Math", "First question", DETAILS)
            .unwrap();
        let b = store
            .create_post("Al", "Math", "Second question", DETAILS)
            .unwrap();

        store.create_answer(a.id, "Bo", "For the first.").unwrap();
        store.create_answer(b.id, "Cy", "For the second.").unwrap();

        assert_eq!(store.answers_for(a.id).unwrap().len(), 1);
        assert_eq!(store.answers_for(b.id).unwrap()[0].author, "Cy");
    }

    #[test]
    fn test_update_answer_by_owner() {
        let (store, _dir) = setup_test_store();
        let post = store
            .create_post("Al", "Math", "Need help factoring", DETAILS)
            .unwrap();
        let answer = store
            .create_answer(post.id, "Bo", "Try the AC method.")
            .unwrap();

        let updated = store
            .update_answer(post.id, answer.id, "Bo", "Try grouping instead.")
            .unwrap();
        assert_eq!(updated.details, "Try grouping instead.");
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.id, answer.id);
        assert_eq!(updated.created_at, answer.created_at);
    }

    #[test]
    fn test_update_answer_by_non_owner_changes_nothing() {
        let (store, _dir) = setup_test_store();
        let post = store
            .create_post("Al", "Math", "Need help factoring", DETAILS)
            .unwrap();
        let answer = store
            .create_answer(post.id, "Bo", "Try the AC method.")
            .unwrap();

        let err = store
            .update_answer(post.id, answer.id, "Al", "Rewritten by Al")
            .unwrap_err();
        assert!(err.is_not_owner());

        let stored = store.answers_for(post.id).unwrap();
        assert_eq!(stored[0].details, "Try the AC method.");
        assert!(stored[0].updated_at.is_none());
    }

    #[test]
    fn test_delete_answer() {
        let (store, _dir) = setup_test_store();
        let post = store
            .create_post("Al", "Math", "Need help factoring", DETAILS)
            .unwrap();
        let answer = store
            .create_answer(post.id, "Bo", "Try the AC method.")
            .unwrap();

        let err = store.delete_answer(post.id, answer.id, "Al").unwrap_err();
        assert!(err.is_not_owner());

        store.delete_answer(post.id, answer.id, "Bo").unwrap();
        assert!(store.answers_for(post.id).unwrap().is_empty());

        let err = store.delete_answer(post.id, answer.id, "Bo").unwrap_err();
        assert!(err.is_not_found());
    }

    // ==================== Persistence ====================

    #[test]
    fn test_reload_reproduces_collections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.db");

        let (post, answers_before, posts_before) = {
            let store = Store::open(&path).unwrap();
            store.set_current_name("Al").unwrap();
            let post = store
                .create_post("Al", "Math", "Need help factoring", DETAILS)
                .unwrap();
            store
                .create_answer(post.id, "Bo", "Try the AC method.")
                .unwrap();
            store
                .create_answer(post.id, "Cy", "Complete the square.")
                .unwrap();
            (
                post.clone(),
                store.answers_for(post.id).unwrap(),
                store.posts().unwrap(),
            )
        };

        // Fresh handle simulating a new session
        let store = Store::open(&path).unwrap();
        assert_eq!(store.current_name().unwrap(), "Al");
        assert_eq!(store.posts().unwrap(), posts_before);
        assert_eq!(store.answers_for(post.id).unwrap(), answers_before);
    }

    #[test]
    fn test_corrupt_payloads_decode_to_empty() {
        let (store, _dir) = setup_test_store();
        store.set(KEY_POSTS, "{not json").unwrap();
        store.set(KEY_ANSWERS, "[wrong shape]").unwrap();

        assert!(store.posts().unwrap().is_empty());
        assert!(store.answers_for(1).unwrap().is_empty());

        // Recovery is non-destructive until the next write
        let post = store
            .create_post("Al", "Math", "Need help factoring", DETAILS)
            .unwrap();
        assert_eq!(store.posts().unwrap(), vec![post]);
    }

    // ==================== Ownership & ids ====================

    #[test]
    fn test_authorize() {
        assert!(authorize("Al", "Al").is_ok());
        assert!(authorize("Al", "Bo").is_err());
        assert!(authorize("", "").is_err());
        assert!(authorize("", "Al").is_err());
        // Stored authors are trimmed; padded requesters still match
        assert!(authorize("Al", "  Al  ").is_ok());
        assert!(authorize("", "   ").is_err());
    }

    #[test]
    fn test_padded_author_still_owns_their_post() {
        let (store, _dir) = setup_test_store();
        let post = store
            .create_post("  Al  ", "Math", "Need help factoring", DETAILS)
            .unwrap();
        assert_eq!(post.author, "Al");

        // The same padded string the post was created with keeps working
        // for every mutation, since storage trimmed it on the way in.
        store
            .update_post(post.id, "  Al  ", "Math", "Retitled by owner", DETAILS)
            .unwrap();
        let answer = store
            .create_answer(post.id, " Bo ", "Try the AC method.")
            .unwrap();
        store
            .update_answer(post.id, answer.id, " Bo ", "Try grouping instead.")
            .unwrap();
        store.delete_answer(post.id, answer.id, " Bo ").unwrap();
        store.delete_post(post.id, "  Al  ").unwrap();
        assert!(store.posts().unwrap().is_empty());
    }

    #[test]
    fn test_fresh_id_bumps_past_max() {
        let far_future = Utc::now().timestamp_millis() + 1_000_000;
        assert_eq!(fresh_id([far_future].into_iter()), far_future + 1);
    }

    #[test]
    fn test_fresh_id_uses_clock_when_free() {
        let before = Utc::now().timestamp_millis();
        let id = fresh_id(std::iter::empty());
        assert!(id >= before);
    }

    // ==================== Property-Based Tests ====================

    proptest! {
        #[test]
        fn prop_create_then_get_round_trips(
            author in "[a-zA-Z]{2,12}",
            title in "[a-zA-Z0-9 ]{8,40}",
            details in "[a-zA-Z0-9 ]{24,80}"
        ) {
            let (store, _dir) = setup_test_store();
            let post = store.create_post(&author, "Math", &title, &details).unwrap();

            let stored = store.get_post(post.id).unwrap().unwrap();
            prop_assert_eq!(stored, post);
        }

        #[test]
        fn prop_non_owner_mutation_is_inert(
            owner in "[a-z]{2,8}",
            intruder in "[A-Z]{2,8}"
        ) {
            let (store, _dir) = setup_test_store();
            let post = store
                .create_post(&owner, "Math", "Need help factoring", DETAILS)
                .unwrap();

            let _ = store.update_post(post.id, &intruder, "Science", "Changed title", DETAILS);
            let _ = store.delete_post(post.id, &intruder);

            let stored = store.get_post(post.id).unwrap().unwrap();
            prop_assert_eq!(stored, post);
        }

        #[test]
        fn prop_answer_count_matches_creates(count in 1usize..8) {
            let (store, _dir) = setup_test_store();
            let post = store
                .create_post("Al", "Math", "Need help factoring", DETAILS)
                .unwrap();

            for i in 0..count {
                store.create_answer(post.id, "Bo", &format!("Answer {}", i)).unwrap();
            }

            prop_assert_eq!(store.answers_for(post.id).unwrap().len(), count);
        }
    }
}
