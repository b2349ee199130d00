use log::{debug, info, warn};
use std::time::Instant;

use crate::models::notice::Notice;
use crate::workflow::types::{IncomingFile, IngestReport, Prompter, VideoSink, resolve_title};

/// Persist one drop or file-picker selection.
///
/// Files are handled one at a time in input order; each file's write has
/// committed before the next file is read. A failure only skips its own
/// file. The caller refreshes the gallery once afterwards.
pub async fn ingest_batch<F, S>(
    store: &S,
    files: impl IntoIterator<Item = F>,
    prompter: &mut dyn Prompter,
) -> IngestReport
where
    F: IncomingFile,
    S: VideoSink + ?Sized,
{
    let start_time = Instant::now();
    let mut report = IngestReport::default();

    for (position, mut file) in files.into_iter().enumerate() {
        // Step 1: Filter by media type
        if !file.is_video() {
            debug!(
                "Dropped non-video file '{}' ({})",
                file.name(),
                file.media_type().unwrap_or("unknown type")
            );
            report.dropped += 1;
            continue;
        }
        let file_name = file.name().to_string();
        let media_type = file.media_type().unwrap_or_default().to_string();

        // Step 2: Read content
        let blob = match file.read_all().await {
            Ok(blob) => blob,
            Err(error) => {
                warn!("Failed to read '{}': {}", file_name, error);
                report.notices.push(Notice::ReadFailed {
                    filename: file_name,
                    reason: error.to_string(),
                });
                continue;
            }
        };

        // Step 3: Title
        let title = resolve_title(prompter.prompt_title(position, &file_name), &file_name);

        // Step 4: Store
        match store
            .add_video(blob, &file_name, &title, &media_type)
            .await
        {
            Ok(id) => report.added.push(id),
            Err(error) => {
                warn!("Failed to store '{}': {}", file_name, error);
                report.notices.push(Notice::from(error));
            }
        }
    }

    info!(
        duration = &*format!("{:?}", start_time.elapsed());
        "Ingested {} videos ({} dropped, {} failed)",
        report.added.len(),
        report.dropped,
        report.notices.len()
    );
    report
}
