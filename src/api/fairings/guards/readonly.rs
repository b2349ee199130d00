use anyhow::anyhow;
use rocket::Request;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};

use crate::api::GuardError;
use crate::config::{APP_CONFIG, AppConfig};

/// Passes unless the server runs in read-only mode.
pub struct GuardReadOnlyMode;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GuardReadOnlyMode {
    type Error = GuardError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let read_only_mode = req
            .rocket()
            .state::<AppConfig>()
            .or_else(|| APP_CONFIG.get())
            .is_some_and(|config| config.read_only_mode);

        if read_only_mode {
            Outcome::Error((
                Status::Forbidden,
                GuardError {
                    status: Status::Forbidden,
                    error: anyhow!("Read-only mode is enabled"),
                },
            ))
        } else {
            Outcome::Success(GuardReadOnlyMode)
        }
    }
}
