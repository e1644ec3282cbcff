//! Configuration command

use super::core_error;
use crate::state::AppState;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use postloom_core::AppConfig;
use postloom_generator::{ProviderKind, RoutingPolicy};
use sen::{CliResult, State};

/// Show the active configuration with secrets masked
///
/// Usage:
///   postloom config
pub async fn show(state: State<AppState>) -> CliResult<String> {
    let app = state.read().await;
    let config = app.config.as_ref();

    let config_path = AppConfig::default_path().map_err(|e| core_error("Config path", e))?;
    let database_path = config
        .database_path()
        .map_err(|e| core_error("Database path", e))?;

    let mut output = String::new();
    output.push_str(&format!("Config file:  {}\n", config_path.display()));
    output.push_str(&format!("Database:     {}\n", database_path.display()));
    output.push_str(&format!(
        "Text model:   {} (via {})\n",
        config.text_model(),
        RoutingPolicy::default().route(config.text_model())
    ));
    output.push_str(&format!("Pacing:       {} ms\n", config.settings.pacing_ms));
    output.push_str(&format!("Reddit:       {}\n", reddit_status(config)));
    output.push_str(&format!("\n{}", provider_table(config)));

    Ok(output)
}

fn provider_table(config: &AppConfig) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        Cell::new("Provider").fg(Color::Green),
        Cell::new("Model").fg(Color::Green),
        Cell::new("API key").fg(Color::Green),
    ]);

    for kind in ProviderKind::ALL {
        let Some(settings) = config.provider(kind.as_str()) else {
            continue;
        };
        let key = if settings.api_key.trim().is_empty() {
            Cell::new("missing").fg(Color::Red)
        } else {
            Cell::new(mask(&settings.api_key))
        };
        table.add_row(vec![
            Cell::new(kind.to_string()),
            Cell::new(&settings.model),
            key,
        ]);
    }

    table
}

fn reddit_status(config: &AppConfig) -> String {
    let reddit = &config.reddit;
    if !reddit.refresh_token.trim().is_empty() {
        "refresh token".to_string()
    } else if reddit.username.trim().is_empty() {
        "not configured".to_string()
    } else {
        format!("u/{}", reddit.username.trim())
    }
}

/// Keep the last four characters of a secret
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.trim().chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
