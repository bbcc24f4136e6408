use sirene_client::api::sirene::Sirene;
use sirene_client::api::Siret;
use sirene_client::auth::Authenticator;
use sirene_client::SireneApi;

fn main() -> anyhow::Result<()> {
    let api_key = std::env::var("INSEE_API_KEY")?;
    let siret: Siret = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "49778445400041".to_string())
        .parse()?;

    let mut api = SireneApi::new(Authenticator::static_key(api_key));
    api.authenticate()?;

    let sirene = Sirene::new(&api);
    for result in [sirene.lookup_by_siren(&siret.siren()), sirene.lookup_by_siret(&siret)] {
        match result.payload {
            Some(data) => println!(
                "{} {}:\n{}",
                result.query_type,
                result.query_value,
                serde_json::to_string_pretty(&data)?
            ),
            None => println!("{} {}: no data", result.query_type, result.query_value),
        }
    }
    Ok(())
}
