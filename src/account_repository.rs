use std::collections::{BTreeMap, btree_map::Entry};
use std::io::{Read, Write};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Account, AccountId, AccountRepository, Error, User};

/// Accounts held in memory, guarded by optimistic versioning.
#[derive(Default, Debug)]
pub struct InMemoryAccountRepository {
    accounts: BTreeMap<AccountId, Account>,
}

/// On-disk shape of an account, shared by the loader and the writer.
#[derive(Debug, Deserialize, Serialize)]
struct AccountRow {
    id: AccountId,
    email: String,
    #[serde(with = "rust_decimal::serde::str")]
    balance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    withdrawn: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    paid_in: Decimal,
}

impl TryFrom<AccountRow> for Account {
    type Error = Error;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        if row.balance < Decimal::ZERO {
            return Err(Error::Ingestion(format!(
                "Account {} has a negative balance: {}",
                row.id, row.balance
            )));
        }
        if row.paid_in < Decimal::ZERO || row.paid_in > Account::PAY_IN_LIMIT {
            return Err(Error::Ingestion(format!(
                "Account {} has paid in {} outside the pay in limit",
                row.id, row.paid_in
            )));
        }

        Ok(Account {
            balance: row.balance,
            withdrawn: row.withdrawn,
            paid_in: row.paid_in,
            ..Account::new(row.id, User::new(row.email))
        })
    }
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        AccountRow {
            id: account.id,
            email: account.user.email.clone(),
            balance: account.balance,
            withdrawn: account.withdrawn,
            paid_in: account.paid_in,
        }
    }
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
        }
    }

    pub fn with_account(mut self, account: Account) -> Self {
        self.insert(account);
        self
    }

    /// Seeds or replaces an account, bypassing the version check.
    pub fn insert(&mut self, account: Account) {
        self.accounts.insert(account.id, account);
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn from_csv<R: Read>(reader: R) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut repository = Self::new();
        for row in rdr.deserialize::<AccountRow>() {
            let account = Account::try_from(row?)?;
            match repository.accounts.entry(account.id) {
                Entry::Vacant(e) => {
                    e.insert(account);
                }
                Entry::Occupied(e) => {
                    return Err(Error::Ingestion(format!(
                        "Account ID {} already exists",
                        e.key()
                    )));
                }
            }
        }

        tracing::debug!(accounts = repository.accounts.len(), "loaded accounts");
        Ok(repository)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for account in self.accounts.values() {
            wtr.serialize(AccountRow::from(account))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn check_version(&self, account: &Account) -> Result<(), Error> {
        match self.accounts.get(&account.id) {
            Some(stored) if stored.version == account.version => Ok(()),
            Some(_) => Err(Error::Conflict(account.id)),
            None => Err(Error::NotFound(account.id)),
        }
    }

    fn store(&mut self, account: &Account) {
        let mut stored = account.clone();
        stored.version += 1;
        self.accounts.insert(stored.id, stored);
    }
}

impl AccountRepository for InMemoryAccountRepository {
    fn get_account_by_id(&self, id: &AccountId) -> Result<Account, Error> {
        self.accounts.get(id).cloned().ok_or(Error::NotFound(*id))
    }

    fn update(&mut self, account: &Account) -> Result<(), Error> {
        self.check_version(account)?;
        self.store(account);
        Ok(())
    }

    fn update_all(&mut self, accounts: &[&Account]) -> Result<(), Error> {
        // Stage versions so a unit that touches one account twice conflicts
        // with itself instead of letting the later write win.
        let mut staged: BTreeMap<AccountId, u64> = BTreeMap::new();
        for account in accounts {
            let expected = match staged.get(&account.id) {
                Some(version) => *version,
                None => {
                    self.check_version(account)?;
                    account.version
                }
            };
            if expected != account.version {
                return Err(Error::Conflict(account.id));
            }
            staged.insert(account.id, expected + 1);
        }

        for account in accounts {
            self.store(account);
        }
        Ok(())
    }
}
