//! Configuration management commands.

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;
use crate::output::money;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { base_url, force } => init_config(&base_url, force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    ctx.output.info("[api]");
    let api = &ctx.config.api;
    ctx.output.kv("base_url", &api.base_url);
    ctx.output.kv("timeout_ms", &api.timeout_ms.to_string());
    ctx.output.kv("connect_timeout_ms", &api.connect_timeout_ms.to_string());
    ctx.output.kv("refresh_path", &api.refresh_path);

    ctx.output.info("[auth]");
    ctx.output.kv(
        "credentials_path",
        &ctx.config.auth.resolve_credentials_path().display().to_string(),
    );

    let rates = ctx.shipping_rates();
    ctx.output.info(if ctx.config.shipping.is_some() {
        "[shipping]"
    } else {
        "[shipping] (built-in)"
    });
    ctx.output.kv("default_fee", &money(rates.default_fee));
    ctx.output.kv("per_kg_rate", &money(rates.per_kg_rate));
    ctx.output.kv("item_weight_grams", &rates.item_weight_grams.to_string());
    for (city, fee) in &rates.city_fees {
        ctx.output.list_item(&format!("{}: {}", city, fee));
    }

    Ok(())
}

fn init_config(base_url: &str, force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("petshop.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, generate_default_config(base_url))?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = ctx.config.validate();

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}
