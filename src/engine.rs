use crate::domain::{
    AccountRepository, Command, Error, NotificationService,
    traits::{CommandStream, DeadLetterQueue},
};
use crate::features::{PersistenceMode, TransferMoney, WithdrawMoney};

use futures::StreamExt;

/// Feeds commands from an ingestion stream through the use cases.
#[derive(Debug)]
pub struct Engine<I, R, N, D>
where
    I: CommandStream,
    R: AccountRepository,
    N: NotificationService,
    D: DeadLetterQueue,
{
    ingestion: I,
    account_repository: R,
    notification_service: N,
    dlq: D,
    persistence: PersistenceMode,
}

impl<I, R, N, D> Engine<I, R, N, D>
where
    I: CommandStream,
    R: AccountRepository,
    N: NotificationService,
    D: DeadLetterQueue,
{
    pub fn new(ingestion: I, account_repository: R, notification_service: N, dlq: D) -> Self {
        Self {
            ingestion,
            account_repository,
            notification_service,
            dlq,
            persistence: PersistenceMode::default(),
        }
    }

    pub fn with_persistence(mut self, persistence: PersistenceMode) -> Self {
        self.persistence = persistence;
        self
    }

    pub async fn process(&mut self) -> Result<(), Error> {
        let mut res = self.ingestion.stream();

        while let Some(command) = res.next().await {
            match command {
                Ok(command) => {
                    if let Err(e) = self.apply_command(command) {
                        tracing::debug!(%command, error = %e, "command failed");
                        self.dlq.report(&e);
                    }
                }
                Err(e) => self.dlq.report(&e),
            }
        }

        Ok(())
    }

    fn apply_command(&mut self, command: Command) -> Result<(), Error> {
        match command {
            Command::Withdraw { account_id, amount } => {
                WithdrawMoney::new(&mut self.account_repository, &self.notification_service)
                    .execute(&account_id, amount)
            }
            Command::Transfer { from, to, amount } => {
                TransferMoney::new(&mut self.account_repository, &self.notification_service)
                    .with_persistence(self.persistence)
                    .execute(&from, &to, amount)
            }
        }
    }

    pub fn into_repository(self) -> R {
        self.account_repository
    }
}
