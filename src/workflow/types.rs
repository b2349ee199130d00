use std::io;

use crate::common::VIDEO_MEDIA_PREFIX;
use crate::common::errors::StoreResult;
use crate::database::ops::local::LocalStore;
use crate::models::notice::Notice;

// ────────────────────────────────────────────────────────────────
// IncomingFile - one item of a drop or file-picker selection
// ────────────────────────────────────────────────────────────────

#[rocket::async_trait]
pub trait IncomingFile: Send {
    /// Original file name as the user sees it.
    fn name(&self) -> &str;

    fn media_type(&self) -> Option<&str>;

    /// Read the whole content. Called at most once per file.
    async fn read_all(&mut self) -> io::Result<Vec<u8>>;

    fn is_video(&self) -> bool {
        self.media_type().is_some_and(is_video_media_type)
    }
}

pub fn is_video_media_type(media_type: &str) -> bool {
    media_type
        .trim()
        .to_ascii_lowercase()
        .starts_with(VIDEO_MEDIA_PREFIX)
}

// ────────────────────────────────────────────────────────────────
// VideoSink - where accepted files are written
// ────────────────────────────────────────────────────────────────

#[rocket::async_trait]
pub trait VideoSink: Sync {
    /// Store one video in its own transaction and return the new id.
    async fn add_video(
        &self,
        blob: Vec<u8>,
        filename: &str,
        title: &str,
        media_type: &str,
    ) -> StoreResult<u64>;
}

#[rocket::async_trait]
impl VideoSink for LocalStore {
    async fn add_video(
        &self,
        blob: Vec<u8>,
        filename: &str,
        title: &str,
        media_type: &str,
    ) -> StoreResult<u64> {
        self.add(blob, filename, title, media_type).await
    }
}

// ────────────────────────────────────────────────────────────────
// Prompter - blocking title prompt and delete confirmation
// ────────────────────────────────────────────────────────────────

pub trait Prompter: Send {
    /// Ask for a display title. `position` is the file's index in the
    /// submitted batch, before filtering. `None` means cancelled.
    fn prompt_title(&mut self, position: usize, file_name: &str) -> Option<String>;

    /// Ask the user to confirm a destructive action.
    fn confirm(&mut self, message: &str) -> bool;
}

/// Title to store: the answer, trimmed, or the file's own name when the
/// answer is blank or the prompt was cancelled.
pub fn resolve_title(answer: Option<String>, file_name: &str) -> String {
    match answer {
        Some(title) if !title.trim().is_empty() => title.trim().to_string(),
        _ => file_name.to_string(),
    }
}

/// Answers collected from an upload form: one optional title per submitted
/// file, plus the confirmation flag of a delete form.
#[derive(Debug, Clone, Default)]
pub struct FormPrompter {
    titles: Vec<Option<String>>,
    confirmed: bool,
}

impl FormPrompter {
    pub fn with_titles(titles: Vec<Option<String>>) -> Self {
        Self {
            titles,
            confirmed: false,
        }
    }

    pub fn confirmed(confirmed: bool) -> Self {
        Self {
            titles: Vec::new(),
            confirmed,
        }
    }
}

impl Prompter for FormPrompter {
    fn prompt_title(&mut self, position: usize, _file_name: &str) -> Option<String> {
        self.titles.get_mut(position).and_then(Option::take)
    }

    fn confirm(&mut self, _message: &str) -> bool {
        self.confirmed
    }
}

// ────────────────────────────────────────────────────────────────
// IngestReport
// ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Ids of stored records, in input order.
    pub added: Vec<u64>,
    /// Non-video items that were silently skipped.
    pub dropped: usize,
    /// Per-file failures; the rest of the batch still ran.
    pub notices: Vec<Notice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_video_media_types_are_accepted() {
        assert!(is_video_media_type("video/mp4"));
        assert!(is_video_media_type("Video/QuickTime"));
        assert!(!is_video_media_type("image/png"));
        assert!(!is_video_media_type("application/octet-stream"));
        assert!(!is_video_media_type(""));
    }

    #[test]
    fn blank_or_cancelled_title_falls_back_to_file_name() {
        assert_eq!(resolve_title(None, "a.mp4"), "a.mp4");
        assert_eq!(resolve_title(Some("   ".into()), "a.mp4"), "a.mp4");
        assert_eq!(resolve_title(Some(" Cat ".into()), "a.mp4"), "Cat");
    }

    #[test]
    fn form_prompter_answers_by_batch_position() {
        let mut prompter =
            FormPrompter::with_titles(vec![Some("first".into()), None, Some("third".into())]);
        assert_eq!(prompter.prompt_title(2, "c.mp4"), Some("third".into()));
        assert_eq!(prompter.prompt_title(1, "b.mp4"), None);
        assert_eq!(prompter.prompt_title(7, "z.mp4"), None);
        assert!(!prompter.confirm("delete?"));
        assert!(FormPrompter::confirmed(true).confirm("delete?"));
    }
}
