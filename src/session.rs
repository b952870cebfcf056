//! Transient view state for the interactive board: which post is open and
//! which entity, if any, a form is currently editing. Nothing here is
//! persisted; the repositories stay stateless beyond the stored collections.

/// The current edit target. At most one entity is editable at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditTarget {
    #[default]
    Idle,
    Post(i64),
    Answer { post_id: i64, answer_id: i64 },
}

/// View session owned by the presentation layer.
#[derive(Debug, Default)]
pub struct Session {
    open_post: Option<i64>,
    edit: EditTarget,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn open_post(&self) -> Option<i64> {
        self.open_post
    }

    pub fn edit(&self) -> EditTarget {
        self.edit
    }

    /// Opens a post's detail view. Switching to a different post silently
    /// drops any in-progress answer edit; a post edit is a separate form and
    /// survives.
    pub fn open(&mut self, post_id: i64) {
        if self.open_post != Some(post_id) {
            if let EditTarget::Answer { .. } = self.edit {
                self.edit = EditTarget::Idle;
            }
        }
        self.open_post = Some(post_id);
    }

    /// Closes the detail view and clears any answer sub-session.
    pub fn close(&mut self) {
        self.open_post = None;
        if let EditTarget::Answer { .. } = self.edit {
            self.edit = EditTarget::Idle;
        }
    }

    /// Starts editing a post, replacing whatever edit was in progress.
    pub fn begin_post_edit(&mut self, post_id: i64) {
        self.edit = EditTarget::Post(post_id);
    }

    /// Starts editing an answer of the currently open post. Returns false
    /// (and changes nothing) if that post's detail view is not open.
    pub fn begin_answer_edit(&mut self, post_id: i64, answer_id: i64) -> bool {
        if self.open_post != Some(post_id) {
            return false;
        }
        self.edit = EditTarget::Answer { post_id, answer_id };
        true
    }

    /// Cancel on either form, or cleanup after a successful save.
    pub fn end_edit(&mut self) {
        self.edit = EditTarget::Idle;
    }
}
