use anyhow::Result;

use crate::core::AppConfig;
use crate::google::oauth::authorization_url;

/// Print the consent URL so the OAuth client settings can be checked
/// without a browser client.
pub fn run() -> Result<()> {
    let config = AppConfig::default();
    let auth_url = authorization_url(&config)?;
    println!(
        "\nOpen the following URL in your browser to authorize access:\n\n{}\n",
        auth_url
    );
    println!(
        "Google will redirect to {} with the authorization code.",
        config.gmail_redirect_uri
    );

    Ok(())
}
