pub mod flows;
pub mod types;

pub use flows::ingest_batch;
pub use types::{FormPrompter, IncomingFile, IngestReport, Prompter};
