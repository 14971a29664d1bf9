use std::{env, fs::File, io};

use tracing_subscriber::EnvFilter;

use moneybox::{
    account_repository::InMemoryAccountRepository, config::Config, dlq::StdErrDLQ,
    engine::Engine, ingestion::CsvReader, notifications::LogNotifier,
};

#[tokio::main] // using Tokio runtime for async
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env(env::args().skip(1))?;
    tracing::debug!(?config, "starting");

    let accounts = InMemoryAccountRepository::from_csv(File::open(&config.accounts_path)?)?;
    let ingestion = CsvReader::new(File::open(&config.commands_path)?)?;

    let mut engine = Engine::new(
        ingestion,
        accounts,
        LogNotifier::default(),
        StdErrDLQ::default(),
    )
    .with_persistence(config.persistence);

    engine.process().await?;

    engine.into_repository().write_csv(io::stdout())?;

    Ok(())
}
