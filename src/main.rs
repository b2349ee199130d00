use anyhow::Result;
use log::{error, info};
use std::time::Instant;

use demotube::api::AppState;
use demotube::bootstrap::setup::initialize_logger;
use demotube::common::ROCKET_RUNTIME;
use demotube::common::errors::handle_error;
use demotube::config::init_config;
use demotube::database::ops::local::LocalStore;
use demotube::{build_rocket, build_unavailable_rocket};

fn main() -> Result<()> {
    initialize_logger();
    let config = init_config().map_err(handle_error)?.clone();

    let result = ROCKET_RUNTIME.block_on(async {
        let start_time = Instant::now();
        let rocket = match LocalStore::open(config.db_path.clone()).await {
            Ok(store) => {
                let state = AppState::start(store).await;
                info!(
                    duration = &*format!("{:?}", start_time.elapsed());
                    "Library ready"
                );
                build_rocket(state, config)
            }
            Err(store_error) => {
                error!("{}", store_error);
                build_unavailable_rocket(store_error.into_reason(), config)
            }
        };
        rocket.launch().await
    });

    if let Err(e) = result {
        error!("Rocket server failed: {}", e);
        return Err(anyhow::Error::from(e));
    }
    Ok(())
}
