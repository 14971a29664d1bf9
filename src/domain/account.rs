use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AccountId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| Error::Ingestion(format!("Invalid account id {}: {}", s, e)))
    }
}

/// Account holder. The email is the only contact channel notifications use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub email: String,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub user: User,
    pub balance: Decimal,   // spendable funds
    pub withdrawn: Decimal, // running sum of withdrawals, decremented on each one
    pub paid_in: Decimal,   // deposits counted against PAY_IN_LIMIT
    pub version: u64,       // bumped by the repository on every persist
}

impl Account {
    pub const PAY_IN_LIMIT: Decimal = Decimal::from_parts(4000, 0, 0, false, 0);
    pub const LOW_BALANCE_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);
    pub const MIN_BALANCE_FOR_WITHDRAWAL: Decimal = Decimal::ZERO;
    pub const NEAR_PAY_IN_LIMIT_MARGIN: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

    pub fn new(id: AccountId, user: User) -> Self {
        Self {
            id,
            user,
            balance: Decimal::ZERO,
            withdrawn: Decimal::ZERO,
            paid_in: Decimal::ZERO,
            version: 0,
        }
    }

    /// Rejects negative amounts. Zero is accepted.
    pub fn validate_amount(amount: Decimal) -> Result<(), Error> {
        if amount < Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }
        Ok(())
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), Error> {
        Self::validate_amount(amount)?;

        if !self.can_withdraw(amount) {
            return Err(Error::InsufficientFunds);
        }

        let balance = self.balance.checked_sub(amount).ok_or(Error::Overflow)?;
        // Downstream consumers read this as a negative running total.
        let withdrawn = self.withdrawn.checked_sub(amount).ok_or(Error::Overflow)?;

        self.balance = balance;
        self.withdrawn = withdrawn;
        Ok(())
    }

    /// Does not check the sign of `amount`.
    pub fn can_withdraw(&self, amount: Decimal) -> bool {
        match self.balance.checked_sub(amount) {
            Some(balance) => balance >= Self::MIN_BALANCE_FOR_WITHDRAWAL,
            // Out of range above when withdrawing a negative amount.
            None => amount.is_sign_negative(),
        }
    }

    pub fn will_be_low_balance_after_withdrawal(&self, amount: Decimal) -> bool {
        match self.balance.checked_sub(amount) {
            Some(balance) => balance < Self::LOW_BALANCE_THRESHOLD,
            None => amount.is_sign_positive(),
        }
    }

    pub fn is_low_balance(&self) -> bool {
        self.will_be_low_balance_after_withdrawal(Decimal::ZERO)
    }

    pub fn pay_in(&mut self, amount: Decimal) -> Result<(), Error> {
        if !self.can_pay_in(amount)? {
            return Err(Error::PayInLimitExceeded);
        }

        let balance = self.balance.checked_add(amount).ok_or(Error::Overflow)?;
        let paid_in = self.paid_in.checked_add(amount).ok_or(Error::Overflow)?;

        self.balance = balance;
        self.paid_in = paid_in;
        Ok(())
    }

    pub fn can_pay_in(&self, amount: Decimal) -> Result<bool, Error> {
        Self::validate_amount(amount)?;
        Ok(self
            .paid_in
            .checked_add(amount)
            .is_some_and(|paid_in| paid_in <= Self::PAY_IN_LIMIT))
    }

    pub fn near_pay_in_limit(&self) -> bool {
        Self::PAY_IN_LIMIT
            .checked_sub(self.paid_in)
            .is_some_and(|headroom| headroom < Self::NEAR_PAY_IN_LIMIT_MARGIN)
    }
}
