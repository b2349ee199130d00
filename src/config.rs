use anyhow::{Context, Result};
use dotenv::dotenv;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::common::DB_NAME;

pub const ENV_PREFIX: &str = "DEMOTUBE_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// 資料庫檔案路徑
    pub db_path: PathBuf,
    /// 上傳檔案大小限制 (MB)
    pub upload_limit_mb: u64,
    /// 唯讀模式 (不允許上傳/刪除)
    pub read_only_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(format!("./db/{}.redb", DB_NAME)),
            upload_limit_mb: 2048, // 預設 2GB
            read_only_mode: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        envy::prefixed(ENV_PREFIX)
            .from_env::<AppConfig>()
            .context("Failed to read DEMOTUBE_* environment variables")
    }

    /// Rocket limit string, e.g. "2048 MiB".
    pub fn upload_limit(&self) -> String {
        format!("{} MiB", self.upload_limit_mb)
    }
}

pub static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Load `.env` (if any) and the environment once; later calls return the
/// same config.
pub fn init_config() -> Result<&'static AppConfig> {
    if let Some(config) = APP_CONFIG.get() {
        return Ok(config);
    }
    dotenv().ok();
    let config = AppConfig::from_env()?;
    info!(
        "Config: db_path={}, upload_limit={}, read_only_mode={}",
        config.db_path.display(),
        config.upload_limit(),
        config.read_only_mode
    );
    Ok(APP_CONFIG.get_or_init(|| config))
}
