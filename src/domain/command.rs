use rust_decimal::Decimal;

use crate::domain::AccountId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Withdraw {
        account_id: AccountId,
        amount: Decimal,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    },
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Command::Withdraw { account_id, amount } => {
                write!(f, "withdraw,account={},amount={}", account_id, amount)
            }
            Command::Transfer { from, to, amount } => {
                write!(f, "transfer,from={},to={},amount={}", from, to, amount)
            }
        }
    }
}
