use crate::context::Context;
use crate::output::{or_dash, print_json};
use anyhow::Context as _;
use metecho_client::urls;

// ---------------------------------------------------------------------------
// whoami
// ---------------------------------------------------------------------------

pub fn whoami(ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let user = session
        .block_on(session.client.refetch_all_data(&session.store))
        .context("failed to load the current user")?;

    if ctx.json {
        return print_json(&user);
    }
    let Some(user) = user else {
        println!("Not logged in.");
        return Ok(());
    };
    println!("Logged in as {}", user.username);
    println!("  email:      {}", or_dash(user.email.as_deref()));
    if user.is_connected_to_salesforce() {
        println!(
            "  salesforce: {} ({})",
            or_dash(user.sf_username.as_deref()),
            or_dash(user.org_name.as_deref())
        );
    } else {
        println!("  salesforce: not connected");
    }
    let repos = session.store.state().repositories.items.len();
    println!("  repositories: {repos}");
    Ok(())
}

// ---------------------------------------------------------------------------
// logout
// ---------------------------------------------------------------------------

pub fn logout(ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.session()?;
    session
        .block_on(session.client.logout(&session.store))
        .context("server logout failed")?;
    if ctx.json {
        return print_json(&serde_json::json!({ "logged_out": true }));
    }
    println!("Logged out.");
    Ok(())
}

// ---------------------------------------------------------------------------
// login-url
// ---------------------------------------------------------------------------

pub fn login_url(ctx: &Context, next: Option<&str>) -> anyhow::Result<()> {
    let server = urls::parse_server_url(ctx.config.require_server()?)?;
    let url = ctx.config.urls.login_url(&server, next)?;
    if ctx.json {
        return print_json(&serde_json::json!({ "url": url.as_str() }));
    }
    println!("{url}");
    Ok(())
}
