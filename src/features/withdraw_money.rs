use rust_decimal::Decimal;

use crate::domain::{Account, AccountId, AccountRepository, Error, NotificationService};
use crate::features::notification_sent;

pub struct WithdrawMoney<'a, R, N>
where
    R: AccountRepository,
    N: NotificationService,
{
    account_repository: &'a mut R,
    notification_service: &'a N,
}

impl<'a, R, N> WithdrawMoney<'a, R, N>
where
    R: AccountRepository,
    N: NotificationService,
{
    pub fn new(account_repository: &'a mut R, notification_service: &'a N) -> Self {
        Self {
            account_repository,
            notification_service,
        }
    }

    pub fn execute(&mut self, account_id: &AccountId, amount: Decimal) -> Result<(), Error> {
        let mut account = self.account_repository.get_account_by_id(account_id)?;

        Account::validate_amount(amount)?;
        if !account.can_withdraw(amount) {
            return Err(Error::InsufficientFunds);
        }

        if account.will_be_low_balance_after_withdrawal(amount) {
            notification_sent(
                self.notification_service
                    .notify_funds_low(&account.user.email),
                &account.id,
            );
        }

        account.withdraw(amount)?;
        self.account_repository.update(&account)?;

        tracing::debug!(
            account = %account.id,
            %amount,
            balance = %account.balance,
            "withdrawal completed"
        );
        Ok(())
    }
}
