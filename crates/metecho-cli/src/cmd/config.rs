use crate::context::Context;
use crate::output::print_json;
use anyhow::Context as _;
use clap::Subcommand;
use metecho_client::{urls, Config};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration (token masked)
    Show,

    /// Set the server URL
    SetServer {
        /// e.g. https://metecho.example.com
        url: String,
    },

    /// Store an API token
    SetToken {
        token: String,
    },

    /// Print the config file location
    Path,
}

pub fn run(ctx: &Context, subcmd: ConfigSubcommand) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(ctx),
        ConfigSubcommand::SetServer { url } => set_server(ctx, &url),
        ConfigSubcommand::SetToken { token } => set_token(ctx, &token),
        ConfigSubcommand::Path => {
            println!("{}", ctx.config_path.display());
            Ok(())
        }
    }
}

fn masked(config: &Config) -> Config {
    let mut shown = config.clone();
    if shown.token.is_some() {
        shown.token = Some("********".to_string());
    }
    shown
}

fn show(ctx: &Context) -> anyhow::Result<()> {
    let shown = masked(&ctx.config);
    if ctx.json {
        return print_json(&shown);
    }
    let yaml = serde_yaml::to_string(&shown)?;
    print!("{yaml}");
    Ok(())
}

/// Reload the file itself so flag/env overrides are not persisted.
fn stored(ctx: &Context) -> anyhow::Result<Config> {
    Config::load(&ctx.config_path)
        .with_context(|| format!("failed to load config from {}", ctx.config_path.display()))
}

fn set_server(ctx: &Context, url: &str) -> anyhow::Result<()> {
    let parsed = urls::parse_server_url(url)?;
    let mut config = stored(ctx)?;
    config.server_url = Some(parsed.as_str().trim_end_matches('/').to_string());
    config
        .save(&ctx.config_path)
        .context("failed to save config")?;
    println!("Server set to {}", parsed.as_str().trim_end_matches('/'));
    Ok(())
}

fn set_token(ctx: &Context, token: &str) -> anyhow::Result<()> {
    let mut config = stored(ctx)?;
    config.token = Some(token.to_string());
    config
        .save(&ctx.config_path)
        .context("failed to save config")?;
    println!("Token saved to {}", ctx.config_path.display());
    Ok(())
}
