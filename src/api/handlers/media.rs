use log::info;
use rocket::form::{Errors, Form, FromForm};
use rocket::fs::TempFile;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::{Request, State, get, post};
use rocket_seek_stream::SeekStream;
use serde::Serialize;
use std::io;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use uuid::Uuid;

use crate::api::fairings::guards::readonly::GuardReadOnlyMode;
use crate::api::handlers::form_error;
use crate::api::{AppError, AppResult, AppState, GuardResult};
use crate::database::ops::reader::BlobReader;
use crate::database::schema::video::VideoSummary;
use crate::models::notice::Notice;
use crate::view::gallery::presentation_order;
use crate::workflow::types::{FormPrompter, IncomingFile, IngestReport};

#[derive(FromForm, Debug)]
pub struct UploadForm<'r> {
    /// 依序收到的多個檔案
    #[field(name = "file")]
    pub files: Vec<TempFile<'r>>,

    /// 與檔案順序對應的標題 (空字串代表未輸入)
    #[field(name = "title")]
    pub titles: Vec<String>,
}

/// One multipart file part, seen through `IncomingFile`.
pub struct UploadedFile<'r> {
    file: TempFile<'r>,
    name: String,
    media_type: Option<String>,
}

impl<'r> UploadedFile<'r> {
    pub fn new(file: TempFile<'r>) -> Self {
        let name = get_filename(&file);
        let media_type = get_media_type(&file);
        Self {
            file,
            name,
            media_type,
        }
    }
}

fn get_filename(file: &TempFile<'_>) -> String {
    file.raw_name()
        .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str())
        .and_then(|raw| raw.rsplit(['/', '\\']).next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .or_else(|| file.name().map(str::to_string))
        .unwrap_or_else(|| "upload".to_string())
}

/// The part's content type exactly as the client declared it.
fn get_media_type(file: &TempFile<'_>) -> Option<String> {
    file.content_type()
        .map(|ct| format!("{}/{}", ct.top(), ct.sub()))
}

#[rocket::async_trait]
impl<'r> IncomingFile for UploadedFile<'r> {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    async fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(self.file.len() as usize);
        let reader = self.file.open().await?;
        tokio::pin!(reader);
        reader.read_to_end(&mut buffer).await?;
        Ok(buffer)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub added: Vec<u64>,
    pub dropped: usize,
    pub notices: Vec<Notice>,
}

impl From<IngestReport> for UploadResponse {
    fn from(report: IngestReport) -> Self {
        Self {
            added: report.added,
            dropped: report.dropped,
            notices: report.notices,
        }
    }
}

#[post("/upload", data = "<form>")]
pub async fn upload(
    read_only_mode: GuardResult<GuardReadOnlyMode>,
    state: &State<AppState>,
    form: Result<Form<UploadForm<'_>>, Errors<'_>>,
) -> AppResult<Json<UploadResponse>> {
    let _ = read_only_mode?;
    let inner_form = form.map_err(form_error)?.into_inner();
    let start_time = Instant::now();

    let total = inner_form.files.len();
    let files: Vec<UploadedFile<'_>> = inner_form
        .files
        .into_iter()
        .map(UploadedFile::new)
        .collect();
    let mut prompter =
        FormPrompter::with_titles(inner_form.titles.into_iter().map(Some).collect());

    let report = state
        .controller
        .lock()
        .await
        .ingest(files, &mut prompter)
        .await;

    info!(
        duration = &*format!("{:?}", start_time.elapsed());
        "Upload of {} files: {} stored", total, report.added.len()
    );
    Ok(Json(UploadResponse::from(report)))
}

/// Seekable content with the record's stored media type.
pub struct VideoContent {
    reader: BlobReader,
    len: u64,
    media_type: String,
}

struct CachedMediaType(String);

impl<'r> Responder<'r, 'static> for VideoContent {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let VideoContent {
            reader,
            len,
            media_type,
        } = self;
        // SeekStream 需要活得跟 request 一樣久的 content type
        let media_type = &request.local_cache(move || CachedMediaType(media_type)).0;
        SeekStream::with_opts(reader, len, media_type.as_str()).respond_to(request)
    }
}

/// Stream a record's bytes through a live content reference. Revoked or
/// unknown tokens are 404. Range requests read only the chunks they cover.
#[get("/content/<token>")]
pub async fn content(state: &State<AppState>, token: Uuid) -> AppResult<VideoContent> {
    let id = state
        .urls
        .resolve(token)
        .ok_or_else(|| AppError::not_found(format!("Content {}", token)))?;
    let summary = state
        .store
        .get_summary(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Video {}", id)))?;
    Ok(VideoContent {
        reader: state.store.blob_reader(&summary),
        len: summary.size,
        media_type: summary.media_type,
    })
}

/// Summaries in presentation order. `title` or `filename` narrow the list
/// to exact matches.
#[get("/api/videos?<title>&<filename>")]
pub async fn list_videos(
    state: &State<AppState>,
    title: Option<String>,
    filename: Option<String>,
) -> AppResult<Json<Vec<VideoSummary>>> {
    let mut summaries = state.store.list_summaries().await?;
    if let Some(title) = title {
        let ids = state.store.find_by_title(title).await?;
        summaries.retain(|summary| ids.contains(&summary.id));
    }
    if let Some(filename) = filename {
        let ids = state.store.find_by_filename(filename).await?;
        summaries.retain(|summary| ids.contains(&summary.id));
    }
    summaries.sort_by(presentation_order);
    Ok(Json(summaries))
}

#[get("/api/videos/<id>")]
pub async fn get_video(state: &State<AppState>, id: u64) -> AppResult<Json<VideoSummary>> {
    state
        .store
        .get_summary(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Video {}", id)))
}

pub fn generate_media_routes() -> Vec<rocket::Route> {
    routes![upload, content, list_videos, get_video]
}
