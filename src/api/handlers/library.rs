use log::info;
use rocket::form::{Errors, Form, FromForm};
use rocket::http::Status;
use rocket::response::{Redirect, content};
use rocket::{State, get, post};

use crate::api::fairings::guards::readonly::GuardReadOnlyMode;
use crate::api::handlers::form_error;
use crate::api::{AppResult, AppState, GuardResult, StorageUnavailable};
use crate::view::html::{render_page, render_unavailable};
use crate::workflow::types::FormPrompter;

#[derive(Debug, FromForm)]
pub struct ConfirmForm {
    /// Set by the page's confirm dialog; a missing field means declined.
    #[field(default = false)]
    pub confirmed: bool,
}

/// The library page. `q` is the filter text; without it the current filter
/// stays as it is.
#[get("/?<q>")]
pub async fn index(state: &State<AppState>, q: Option<String>) -> content::RawHtml<String> {
    let mut controller = state.controller.lock().await;
    if let Some(query) = q {
        if query != controller.filter().query() {
            controller.set_filter(query).await;
        }
    }
    let notices = controller.take_notices();
    content::RawHtml(render_page(&controller, &notices))
}

#[post("/videos/<id>/remove", data = "<form>")]
pub async fn remove(
    read_only_mode: GuardResult<GuardReadOnlyMode>,
    state: &State<AppState>,
    id: u64,
    form: Result<Form<ConfirmForm>, Errors<'_>>,
) -> AppResult<Redirect> {
    let _ = read_only_mode?;
    let inner_form = form.map_err(form_error)?.into_inner();

    let mut controller = state.controller.lock().await;
    let mut prompter = FormPrompter::confirmed(inner_form.confirmed);
    if controller.remove_from_gallery(id, &mut prompter).await {
        info!("Removed video {} from the gallery", id);
    }
    Ok(Redirect::to("/"))
}

/// Catch-all while the store is unavailable: one error page, no library.
#[get("/<_..>", rank = 20)]
pub async fn unavailable(
    state: &State<StorageUnavailable>,
) -> (Status, content::RawHtml<String>) {
    (
        Status::ServiceUnavailable,
        content::RawHtml(render_unavailable(&state.reason)),
    )
}

pub fn generate_library_routes() -> Vec<rocket::Route> {
    routes![index, remove]
}

pub fn generate_unavailable_routes() -> Vec<rocket::Route> {
    routes![unavailable]
}
