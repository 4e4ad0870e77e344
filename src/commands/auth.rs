use anyhow::Result;
use traincal_core::remote::provider::Provider;

pub async fn run(provider_name: &str) -> Result<()> {
    let provider = Provider::from_name(provider_name);

    println!("Authenticating with {provider_name}...");

    // Provider handles the full OAuth flow and stores credentials/tokens
    let identifier = provider.authenticate().await?;

    println!("Authenticated as: {identifier}\n");
    println!("Set `calendar_provider` or `mail_provider` to \"{provider_name}\" in your config.");

    Ok(())
}
