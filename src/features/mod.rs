pub mod transfer_money;
pub mod withdraw_money;

pub use transfer_money::{PersistenceMode, TransferMoney};
pub use withdraw_money::WithdrawMoney;

use crate::domain::{AccountId, Error};

// Notifications never abort a use case.
fn notification_sent(result: Result<(), Error>, account_id: &AccountId) {
    if let Err(e) = result {
        tracing::warn!(account = %account_id, error = %e, "notification failed");
    }
}
