use std::path::PathBuf;

use crate::config::ConciergeConfig;
use crate::error::Result;
use crate::pipeline::{run_chat, AppServices, ChatRequest};

/// Run one chat turn through the full pipeline without the HTTP façade.
pub async fn run(message: &str, user: &str, lat: Option<f64>, lng: Option<f64>) -> Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = ConciergeConfig::load_project(&cwd)?;
    let services = AppServices::from_config(config)?;

    let outcome = run_chat(
        &services,
        ChatRequest {
            user_id: user.to_string(),
            message: message.to_string(),
            lat,
            lng,
        },
    )
    .await?;

    println!("{}", outcome.reply);
    if let Some(intent) = &outcome.selected_intent {
        eprintln!("concierge: intent {intent}");
    }
    if let Some(store) = &outcome.selected_store {
        eprintln!(
            "concierge: store {} ({:.0} m)",
            store.name, store.distance_m
        );
    }
    Ok(())
}
