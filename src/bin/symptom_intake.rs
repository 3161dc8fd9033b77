use anyhow::Result;
use tokio::io::BufReader;

use symptom_checker::config::Config;
use symptom_checker::init_tracing;
use symptom_checker::intake::{RelayClient, terminal};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::load();
    let client = RelayClient::from_config(&config)?;
    tracing::info!(url = %client.endpoint(), "Starting symptom intake");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    terminal::run(&client, stdin, &mut stdout).await?;

    println!("Goodbye. Always consult a healthcare professional for medical concerns.");
    Ok(())
}
