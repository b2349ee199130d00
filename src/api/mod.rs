pub mod fairings;
pub mod handlers;

use anyhow::anyhow;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use serde_json::json;
use std::io::Cursor;
use tokio::sync::Mutex;

use crate::common::errors::StoreError;
use crate::database::ops::local::LocalStore;
use crate::models::content::ContentUrls;
use crate::view::controller::LibraryController;

#[derive(Debug)]
pub struct AppError {
    pub status: Status,
    pub error: anyhow::Error,
}

impl AppError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        AppError {
            status: Status::NotFound,
            error: anyhow!("{} not found", what),
        }
    }
}

#[rocket::async_trait]
impl<'r, 'o: 'r> Responder<'r, 'o> for AppError {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'o> {
        let outer_msg = self.error.to_string();

        let chain: Vec<String> = self.error.chain().map(|e| e.to_string()).collect();

        let body = json!({
            "error": outer_msg,
            "chain": chain,
        })
        .to_string();

        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

impl<E> From<E> for AppError
where
    anyhow::Error: From<E>,
{
    fn from(err: E) -> Self {
        let error = anyhow::Error::from(err);
        // 儲存空間無法使用時回傳 503
        let status = match error.downcast_ref::<StoreError>() {
            Some(StoreError::StorageUnavailable(_)) => Status::ServiceUnavailable,
            _ => Status::InternalServerError,
        };
        AppError { status, error }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct GuardError {
    pub status: Status,
    pub error: anyhow::Error,
}

impl From<GuardError> for AppError {
    fn from(err: GuardError) -> Self {
        AppError {
            status: err.status, // 使用 GuardError 攜帶的狀態碼
            error: err.error,
        }
    }
}

pub type GuardResult<T> = Result<T, GuardError>;

/// Everything the routes share: one controller behind a lock, plus the
/// store and content registry for the routes that only read.
pub struct AppState {
    pub controller: Mutex<LibraryController>,
    pub store: LocalStore,
    pub urls: ContentUrls,
}

impl AppState {
    pub async fn start(store: LocalStore) -> Self {
        let urls = ContentUrls::new();
        let controller = LibraryController::start(store.clone(), urls.clone()).await;
        Self {
            controller: Mutex::new(controller),
            store,
            urls,
        }
    }
}

/// Managed in place of `AppState` when the store could not be opened.
pub struct StorageUnavailable {
    pub reason: String,
}
