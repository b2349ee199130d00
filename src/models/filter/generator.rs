use super::GalleryFilter;
use crate::database::schema::video::VideoSummary;

impl GalleryFilter {
    pub fn generate_filter(&self) -> Box<dyn Fn(&VideoSummary) -> bool + Sync + Send> {
        let filter = self.clone();
        if filter.is_empty() {
            return Box::new(|_: &VideoSummary| true);
        }
        Box::new(move |summary: &VideoSummary| filter.matches(&summary.title, &summary.filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: u64, title: &str, filename: &str) -> VideoSummary {
        VideoSummary {
            id,
            filename: filename.to_string(),
            title: title.to_string(),
            media_type: "video/mp4".to_string(),
            size: 0,
            created: 0,
        }
    }

    #[test]
    fn generated_filter_selects_matching_summaries() {
        let summaries = vec![
            summary(1, "Cat Jumping", "a.mp4"),
            summary(2, "Dog Running", "b.mov"),
        ];

        let keep = GalleryFilter::new("cat").generate_filter();
        let ids: Vec<u64> = summaries.iter().filter(|s| keep(s)).map(|s| s.id).collect();
        assert_eq!(ids, vec![1]);

        let keep_all = GalleryFilter::new("").generate_filter();
        assert_eq!(summaries.iter().filter(|s| keep_all(s)).count(), 2);
    }
}
