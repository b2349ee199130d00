use rocket::form::{Errors, Form};
use rocket::response::Redirect;
use rocket::{State, get, post};

use crate::api::fairings::guards::readonly::GuardReadOnlyMode;
use crate::api::handlers::form_error;
use crate::api::handlers::library::ConfirmForm;
use crate::api::{AppResult, AppState, GuardResult};
use crate::workflow::types::FormPrompter;

#[get("/play/<id>")]
pub async fn play(state: &State<AppState>, id: u64) -> Redirect {
    state.controller.lock().await.open_player(id).await;
    Redirect::to("/")
}

#[post("/player/close")]
pub async fn close(state: &State<AppState>) -> Redirect {
    state.controller.lock().await.close_player();
    Redirect::to("/")
}

#[post("/player/delete", data = "<form>")]
pub async fn delete(
    read_only_mode: GuardResult<GuardReadOnlyMode>,
    state: &State<AppState>,
    form: Result<Form<ConfirmForm>, Errors<'_>>,
) -> AppResult<Redirect> {
    let _ = read_only_mode?;
    let inner_form = form.map_err(form_error)?.into_inner();

    let mut prompter = FormPrompter::confirmed(inner_form.confirmed);
    state
        .controller
        .lock()
        .await
        .delete_from_player(&mut prompter)
        .await;
    Ok(Redirect::to("/"))
}

pub fn generate_player_routes() -> Vec<rocket::Route> {
    routes![play, close, delete]
}
