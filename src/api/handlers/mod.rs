use anyhow::anyhow;
use rocket::form::Errors;

pub mod library;
pub mod media;
pub mod player;

/// Chain every form error into one, outermost last.
pub fn form_error(errors: Errors<'_>) -> anyhow::Error {
    let error_chain = errors
        .iter()
        .map(|e| anyhow!(e.to_string()))
        .reduce(|acc, e| acc.context(e.to_string()));

    match error_chain {
        Some(chain) => chain.context("Failed to parse form"),
        None => anyhow!("Failed to parse form with unknown error"),
    }
}
