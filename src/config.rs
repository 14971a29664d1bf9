use std::env;
use std::path::PathBuf;

use crate::domain::Error;
use crate::features::PersistenceMode;

pub const PERSISTENCE_ENV: &str = "MONEYBOX_PERSISTENCE";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub accounts_path: PathBuf,
    pub commands_path: PathBuf,
    pub persistence: PersistenceMode,
}

impl Config {
    /// Reads the two positional paths from `args` and the rest from the
    /// environment, loading `.env` first if there is one.
    pub fn from_env<A>(args: A) -> Result<Self, Error>
    where
        A: IntoIterator<Item = String>,
    {
        dotenvy::dotenv().ok();
        Self::from_parts(args, env::var(PERSISTENCE_ENV).ok())
    }

    fn from_parts<A>(args: A, persistence: Option<String>) -> Result<Self, Error>
    where
        A: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let accounts_path = args
            .next()
            .ok_or_else(|| Error::Config("missing accounts file argument".to_owned()))?;
        let commands_path = args
            .next()
            .ok_or_else(|| Error::Config("missing commands file argument".to_owned()))?;

        let persistence = match persistence {
            Some(value) => value.parse()?,
            None => PersistenceMode::default(),
        };

        Ok(Self {
            accounts_path: PathBuf::from(accounts_path),
            commands_path: PathBuf::from(commands_path),
            persistence,
        })
    }
}
