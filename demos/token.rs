use sirene_client::auth::{mask, AuthHeader, Authenticator, DEFAULT_TOKEN_URL};

fn main() -> anyhow::Result<()> {
    let client_id = std::env::var("INSEE_CLIENT_ID")?;
    let client_secret = std::env::var("INSEE_CLIENT_SECRET")?;
    let token_url =
        std::env::var("INSEE_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string());

    let authenticator = Authenticator::client_credentials(client_id, client_secret, &token_url)?;
    println!("authenticator: {:?}", authenticator);

    if let AuthHeader::Bearer(token) = authenticator.authenticate()? {
        println!("token: {} (obtained at {})", mask(token.secret()), token.obtained_at);
    }
    Ok(())
}
