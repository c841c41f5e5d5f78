use std::path::PathBuf;

use crate::config::ConciergeConfig;
use crate::error::Result;
use crate::pipeline::AppServices;

/// Run the HTTP façade until interrupted.
pub async fn run(addr: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = match config_path {
        Some(path) => ConciergeConfig::load_from(&path)?,
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            ConciergeConfig::load_project(&cwd)?
        }
    };
    if let Some(addr) = addr {
        config.bind_addr = addr;
    }

    let services = AppServices::from_config(config)?;
    crate::server::serve(services).await
}
