use futures::Stream;

use crate::domain::{Account, AccountId, Command, Error};

pub trait CommandStream {
    type CmdStream: Stream<Item = Result<Command, Error>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::CmdStream;
}

pub trait DeadLetterQueue {
    fn report(&self, error: &Error);
}

/// Lookup and persistence of accounts.
///
/// Every lookup hands out a private copy. Implementations are expected to
/// reject a persist whose `version` no longer matches the stored account
/// with [`Error::Conflict`].
pub trait AccountRepository {
    fn get_account_by_id(&self, id: &AccountId) -> Result<Account, Error>;

    fn update(&mut self, account: &Account) -> Result<(), Error>;

    /// Persists all accounts or none of them.
    fn update_all(&mut self, accounts: &[&Account]) -> Result<(), Error>;
}

/// Fire-and-forget delivery. Callers log failures and carry on.
pub trait NotificationService {
    fn notify_funds_low(&self, email: &str) -> Result<(), Error>;

    fn notify_approaching_pay_in_limit(&self, email: &str) -> Result<(), Error>;
}
