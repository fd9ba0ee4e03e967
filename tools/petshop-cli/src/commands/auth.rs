//! Sign-in state.

use anyhow::{bail, Context as _, Result};
use dialoguer::Password;
use petshop_auth::{CredentialStore, Credentials};
use petshop_commerce::UserId;
use serde_json::json;

use super::{AuthArgs, AuthCommand};
use crate::context::Context;

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::LoginToken {
            user,
            token,
            refresh_token,
        } => login_token(user, token, refresh_token, ctx),
        AuthCommand::Logout => logout(ctx),
        AuthCommand::Whoami => whoami(ctx),
    }
}

fn login_token(
    user: String,
    token: Option<String>,
    refresh_token: Option<String>,
    ctx: &Context,
) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => Password::new()
            .with_prompt("Access token")
            .interact()
            .context("Failed to read access token")?,
    };
    if token.trim().is_empty() {
        bail!("Access token must not be empty");
    }
    if user.trim().is_empty() {
        bail!("Customer id must not be empty");
    }

    let mut credentials = Credentials::new(UserId::new(user.trim()), token.trim());
    if let Some(refresh) = refresh_token.filter(|t| !t.trim().is_empty()) {
        credentials = credentials.with_refresh_token(refresh.trim());
    }

    let store = ctx.credential_store();
    store.save(&credentials)?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "userId": credentials.user_id,
            "canRefresh": credentials.can_refresh(),
        }));
    } else {
        ctx.output
            .success(&format!("Signed in as {}", credentials.user_id));
        ctx.output.kv("stored in", &store.path().display().to_string());
        if !credentials.can_refresh() {
            ctx.output
                .warn("No refresh token given; you will need to sign in again when the token expires");
        }
    }
    Ok(())
}

fn logout(ctx: &Context) -> Result<()> {
    let store = ctx.credential_store();
    let was_signed_in = store.load()?.is_some();
    store.clear()?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "signedOut": was_signed_in }));
    } else if was_signed_in {
        ctx.output.success("Signed out");
    } else {
        ctx.output.info("Not signed in");
    }
    Ok(())
}

fn whoami(ctx: &Context) -> Result<()> {
    let Some(credentials) = ctx.credential_store().load()? else {
        bail!("Not signed in. Run `petshop auth login-token` first.");
    };

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "userId": credentials.user_id,
            "updatedAt": credentials.updated_at,
            "canRefresh": credentials.can_refresh(),
        }));
        return Ok(());
    }

    ctx.output.header("Signed in");
    ctx.output.kv("customer", credentials.user_id.as_str());
    ctx.output.kv("since", &credentials.updated_at.to_rfc3339());
    ctx.output.kv(
        "refresh",
        if credentials.can_refresh() { "yes" } else { "no" },
    );
    Ok(())
}
