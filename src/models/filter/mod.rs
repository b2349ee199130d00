pub mod generator;

/// Case-insensitive substring filter over title and filename. An empty or
/// all-whitespace query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryFilter {
    query: String,
    needle: Option<String>,
}

impl GalleryFilter {
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        let trimmed = query.trim();
        let needle = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        };
        Self { query, needle }
    }

    /// The text as typed, for echoing back into the search box.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_none()
    }

    pub fn matches(&self, title: &str, filename: &str) -> bool {
        match &self.needle {
            None => true,
            Some(needle) => {
                title.to_lowercase().contains(needle.as_str())
                    || filename.to_lowercase().contains(needle.as_str())
            }
        }
    }
}
