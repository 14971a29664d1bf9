use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::{AccountId, AccountRepository, Error, NotificationService};
use crate::features::notification_sent;

/// How a transfer hands the two mutated accounts back to the repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistenceMode {
    /// One `update_all` call; both accounts are committed or neither is.
    #[default]
    Atomic,
    /// `update(from)` followed by `update(to)`. If the second call fails the
    /// sender stays debited without the receiver being credited.
    Sequential,
}

impl FromStr for PersistenceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atomic" => Ok(Self::Atomic),
            "sequential" => Ok(Self::Sequential),
            other => Err(Error::Config(format!(
                "Unknown persistence mode: {}",
                other
            ))),
        }
    }
}

pub struct TransferMoney<'a, R, N>
where
    R: AccountRepository,
    N: NotificationService,
{
    account_repository: &'a mut R,
    notification_service: &'a N,
    persistence: PersistenceMode,
}

impl<'a, R, N> TransferMoney<'a, R, N>
where
    R: AccountRepository,
    N: NotificationService,
{
    pub fn new(account_repository: &'a mut R, notification_service: &'a N) -> Self {
        Self {
            account_repository,
            notification_service,
            persistence: PersistenceMode::default(),
        }
    }

    pub fn with_persistence(mut self, persistence: PersistenceMode) -> Self {
        self.persistence = persistence;
        self
    }

    /// Moves `amount` from one account to another.
    ///
    /// The sender's low balance notice goes out before the receiver is
    /// credited, so it is still sent when the pay in is refused, including a
    /// refusal of a negative amount. Neither account is mutated or persisted
    /// in that case.
    pub fn execute(
        &mut self,
        from_account_id: &AccountId,
        to_account_id: &AccountId,
        amount: Decimal,
    ) -> Result<(), Error> {
        let mut from = self.account_repository.get_account_by_id(from_account_id)?;
        let mut to = self.account_repository.get_account_by_id(to_account_id)?;

        if !from.can_withdraw(amount) {
            return Err(Error::InsufficientFunds);
        }

        if from.will_be_low_balance_after_withdrawal(amount) {
            notification_sent(
                self.notification_service.notify_funds_low(&from.user.email),
                &from.id,
            );
        }

        to.pay_in(amount)?;
        from.withdraw(amount)?;

        if to.near_pay_in_limit() {
            notification_sent(
                self.notification_service
                    .notify_approaching_pay_in_limit(&to.user.email),
                &to.id,
            );
        }

        match self.persistence {
            PersistenceMode::Atomic => self.account_repository.update_all(&[&from, &to])?,
            PersistenceMode::Sequential => {
                self.account_repository.update(&from)?;
                self.account_repository.update(&to)?;
            }
        }

        tracing::debug!(from = %from.id, to = %to.id, %amount, "transfer completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_repository::InMemoryAccountRepository;
    use crate::domain::{Account, User};
    use crate::notifications::{Notification, RecordingNotifier};

    fn from_id() -> AccountId {
        "3605a4f9-96a4-439e-9155-064a94736e9c".parse().unwrap()
    }

    fn to_id() -> AccountId {
        "7c8cb0f1-a101-4563-8a22-0f4cfdf56e80".parse().unwrap()
    }

    fn account(id: AccountId, email: &str, balance: i64, paid_in: i64) -> Account {
        Account {
            balance: Decimal::from(balance),
            paid_in: Decimal::from(paid_in),
            ..Account::new(id, User::new(email))
        }
    }

    fn repository(sender: Account, receiver: Account) -> InMemoryAccountRepository {
        InMemoryAccountRepository::new()
            .with_account(sender)
            .with_account(receiver)
    }

    /// Hands out receiver copies whose version has already been superseded,
    /// as if another operation persisted the receiver mid-transfer.
    struct StaleReceiver {
        inner: InMemoryAccountRepository,
    }

    impl AccountRepository for StaleReceiver {
        fn get_account_by_id(&self, id: &AccountId) -> Result<Account, Error> {
            let mut account = self.inner.get_account_by_id(id)?;
            if *id == to_id() {
                account.version += 1;
            }
            Ok(account)
        }

        fn update(&mut self, account: &Account) -> Result<(), Error> {
            self.inner.update(account)
        }

        fn update_all(&mut self, accounts: &[&Account]) -> Result<(), Error> {
            self.inner.update_all(accounts)
        }
    }

    struct BrokenNotifier;

    impl NotificationService for BrokenNotifier {
        fn notify_funds_low(&self, _email: &str) -> Result<(), Error> {
            Err(Error::Notification("mail server down".to_owned()))
        }

        fn notify_approaching_pay_in_limit(&self, _email: &str) -> Result<(), Error> {
            Err(Error::Notification("mail server down".to_owned()))
        }
    }

    #[test]
    fn insufficient_funds_is_rejected() {
        let mut repository = repository(
            account(from_id(), "sender@co.uk", 10, 0),
            account(to_id(), "reciever@co.uk", 10, 0),
        );
        let notifier = RecordingNotifier::new();

        let result = TransferMoney::new(&mut repository, &notifier).execute(
            &from_id(),
            &to_id(),
            Decimal::from(100),
        );

        assert!(matches!(result, Err(Error::InsufficientFunds)));
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn negative_amount_is_refused_by_pay_in_after_warning_sender() {
        let mut repository = repository(
            account(from_id(), "sender@co.uk", 10, 0),
            account(to_id(), "reciever@co.uk", 10, 0),
        );
        let notifier = RecordingNotifier::new();

        let result = TransferMoney::new(&mut repository, &notifier).execute(
            &from_id(),
            &to_id(),
            Decimal::from(-100),
        );

        assert!(matches!(result, Err(Error::InvalidAmount(_))));
        assert_eq!(
            notifier.sent(),
            vec![Notification::FundsLow("sender@co.uk".to_owned())]
        );
        assert_eq!(
            repository.get_account_by_id(&from_id()).unwrap().balance,
            Decimal::from(10)
        );
        assert_eq!(repository.get_account_by_id(&to_id()).unwrap().version, 0);
    }

    #[test]
    fn receiver_balance_at_the_decimal_ceiling_fails_without_panicking() {
        let receiver = Account {
            balance: Decimal::MAX - Decimal::from(10),
            ..account(to_id(), "reciever@co.uk", 0, 0)
        };
        let sender = account(from_id(), "sender@co.uk", 2000, 0);
        let mut repository = repository(sender.clone(), receiver.clone());
        let notifier = RecordingNotifier::new();

        let result = TransferMoney::new(&mut repository, &notifier).execute(
            &from_id(),
            &to_id(),
            Decimal::from(100),
        );

        assert!(matches!(result, Err(Error::Overflow)));
        assert_eq!(repository.get_account_by_id(&from_id()).unwrap(), sender);
        assert_eq!(repository.get_account_by_id(&to_id()).unwrap(), receiver);
    }

    #[test]
    fn unknown_receiver_is_not_found() {
        let mut repository = InMemoryAccountRepository::new()
            .with_account(account(from_id(), "sender@co.uk", 1000, 0));
        let notifier = RecordingNotifier::new();

        let result = TransferMoney::new(&mut repository, &notifier).execute(
            &from_id(),
            &to_id(),
            Decimal::from(100),
        );

        assert!(matches!(result, Err(Error::NotFound(id)) if id == to_id()));
    }

    #[test]
    fn low_sender_funds_notify_sender() {
        let mut repository = repository(
            account(from_id(), "sender@co.uk", 200, 0),
            account(to_id(), "", 200, 0),
        );
        let notifier = RecordingNotifier::new();

        TransferMoney::new(&mut repository, &notifier)
            .execute(&from_id(), &to_id(), Decimal::from(100))
            .unwrap();

        assert_eq!(
            notifier.sent(),
            vec![Notification::FundsLow("sender@co.uk".to_owned())]
        );
        assert_eq!(
            repository.get_account_by_id(&from_id()).unwrap().balance,
            Decimal::from(100)
        );
        assert_eq!(
            repository.get_account_by_id(&to_id()).unwrap().balance,
            Decimal::from(300)
        );
    }

    #[test]
    fn receiver_at_pay_in_limit_is_rejected() {
        let sender = account(from_id(), "sender@co.uk", 2000, 0);
        let receiver = account(to_id(), "reciever@co.uk", 5000, 3100);
        let mut repository = repository(sender.clone(), receiver.clone());
        let notifier = RecordingNotifier::new();

        let result = TransferMoney::new(&mut repository, &notifier).execute(
            &from_id(),
            &to_id(),
            Decimal::from(1000),
        );

        assert!(matches!(result, Err(Error::PayInLimitExceeded)));
        assert_eq!(repository.get_account_by_id(&from_id()).unwrap(), sender);
        assert_eq!(repository.get_account_by_id(&to_id()).unwrap(), receiver);
    }

    #[test]
    fn sender_is_warned_even_when_pay_in_is_refused() {
        let mut repository = repository(
            account(from_id(), "sender@co.uk", 1200, 0),
            account(to_id(), "reciever@co.uk", 5000, 3100),
        );
        let notifier = RecordingNotifier::new();

        let result = TransferMoney::new(&mut repository, &notifier).execute(
            &from_id(),
            &to_id(),
            Decimal::from(1000),
        );

        assert!(matches!(result, Err(Error::PayInLimitExceeded)));
        assert_eq!(
            notifier.sent(),
            vec![Notification::FundsLow("sender@co.uk".to_owned())]
        );
        assert_eq!(
            repository.get_account_by_id(&from_id()).unwrap().balance,
            Decimal::from(1200)
        );
    }

    #[test]
    fn receiver_near_pay_in_limit_is_notified() {
        let mut repository = repository(
            account(from_id(), "sender@co.uk", 2000, 0),
            account(to_id(), "reciever@co.uk", 1000, 3450),
        );
        let notifier = RecordingNotifier::new();

        TransferMoney::new(&mut repository, &notifier)
            .execute(&from_id(), &to_id(), Decimal::from(100))
            .unwrap();

        assert_eq!(
            notifier.sent(),
            vec![Notification::ApproachingPayInLimit(
                "reciever@co.uk".to_owned()
            )]
        );
        assert_eq!(
            repository.get_account_by_id(&to_id()).unwrap().paid_in,
            Decimal::from(3550)
        );
    }

    #[test]
    fn successful_transfer_updates_both_accounts() {
        let mut repository = repository(
            account(from_id(), "test", 1000, 0),
            account(to_id(), "test", 1000, 0),
        );
        let notifier = RecordingNotifier::new();

        TransferMoney::new(&mut repository, &notifier)
            .execute(&from_id(), &to_id(), Decimal::from(100))
            .unwrap();

        let sender = repository.get_account_by_id(&from_id()).unwrap();
        let receiver = repository.get_account_by_id(&to_id()).unwrap();
        assert_eq!(sender.withdrawn, Decimal::from(-100));
        assert_eq!(sender.balance, Decimal::from(900));
        assert_eq!(receiver.balance, Decimal::from(1100));
        assert_eq!(receiver.paid_in, Decimal::from(100));
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn notification_failures_do_not_abort_the_transfer() {
        let mut repository = repository(
            account(from_id(), "sender@co.uk", 200, 0),
            account(to_id(), "reciever@co.uk", 1000, 3450),
        );

        TransferMoney::new(&mut repository, &BrokenNotifier)
            .execute(&from_id(), &to_id(), Decimal::from(100))
            .unwrap();

        assert_eq!(
            repository.get_account_by_id(&from_id()).unwrap().balance,
            Decimal::from(100)
        );
    }

    #[test]
    fn transfer_to_self_commits_nothing() {
        let mut repository = InMemoryAccountRepository::new()
            .with_account(account(from_id(), "sender@co.uk", 1000, 0));
        let notifier = RecordingNotifier::new();

        let result = TransferMoney::new(&mut repository, &notifier).execute(
            &from_id(),
            &from_id(),
            Decimal::from(100),
        );

        assert!(matches!(result, Err(Error::Conflict(_))));
        let account = repository.get_account_by_id(&from_id()).unwrap();
        assert_eq!(account.balance, Decimal::from(1000));
        assert_eq!(account.paid_in, Decimal::ZERO);
    }

    #[test]
    fn sequential_persistence_leaves_sender_debited_when_receiver_update_fails() {
        let mut repository = StaleReceiver {
            inner: repository(
                account(from_id(), "sender@co.uk", 1000, 0),
                account(to_id(), "reciever@co.uk", 1000, 0),
            ),
        };
        let notifier = RecordingNotifier::new();

        let result = TransferMoney::new(&mut repository, &notifier)
            .with_persistence(PersistenceMode::Sequential)
            .execute(&from_id(), &to_id(), Decimal::from(100));

        assert!(matches!(result, Err(Error::Conflict(id)) if id == to_id()));
        assert_eq!(
            repository.inner.get_account_by_id(&from_id()).unwrap().balance,
            Decimal::from(900)
        );
        assert_eq!(
            repository.inner.get_account_by_id(&to_id()).unwrap().balance,
            Decimal::from(1000)
        );
    }

    #[test]
    fn atomic_persistence_commits_nothing_when_receiver_update_fails() {
        let mut repository = StaleReceiver {
            inner: repository(
                account(from_id(), "sender@co.uk", 1000, 0),
                account(to_id(), "reciever@co.uk", 1000, 0),
            ),
        };
        let notifier = RecordingNotifier::new();

        let result = TransferMoney::new(&mut repository, &notifier)
            .execute(&from_id(), &to_id(), Decimal::from(100));

        assert!(matches!(result, Err(Error::Conflict(id)) if id == to_id()));
        assert_eq!(
            repository.inner.get_account_by_id(&from_id()).unwrap().balance,
            Decimal::from(1000)
        );
        assert_eq!(
            repository.inner.get_account_by_id(&to_id()).unwrap().balance,
            Decimal::from(1000)
        );
    }

    #[test]
    fn persistence_mode_parses_case_insensitively() {
        assert_eq!(
            "Sequential".parse::<PersistenceMode>().unwrap(),
            PersistenceMode::Sequential
        );
        assert_eq!(
            "atomic".parse::<PersistenceMode>().unwrap(),
            PersistenceMode::Atomic
        );
        assert!(matches!(
            "eventual".parse::<PersistenceMode>(),
            Err(Error::Config(_))
        ));
    }
}
