//! Named balance-bearing accounts and atomic settlement transfers.

use std::collections::BTreeMap;

use rand::Rng;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("account {0} is already registered")]
    DuplicateAccount(String),
    #[error("account {0} is not registered")]
    AccountNotFound(String),
    #[error("account {0} holds insufficient funds")]
    InsufficientFunds(String),
}

/// Key material generated for an account at registration. Identification
/// cosmetics only: nothing in the market ever signs with these.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    /// Hex-encoded 16-byte random secret.
    pub secret: String,
    /// SHA-256 of the secret, hex-encoded. Doubles as a display tag.
    pub public: String,
}

impl KeyMaterial {
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let seed: [u8; 16] = rng.gen();
        let secret = hex::encode(seed);

        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        let public = hex::encode(hasher.finalize());

        KeyMaterial { secret, public }
    }
}

/// A named account. Balance stays non-negative after every operation the
/// registry accepts.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub balance: Decimal,
    pub keys: KeyMaterial,
}

/// Registry of all accounts in the market, keyed by id.
///
/// The registry exclusively owns every balance: mutation goes through
/// [AccountRegistry::debit], [AccountRegistry::credit], and
/// [AccountRegistry::transfer_with_split], never through external writes.
/// Iteration order is the `BTreeMap` id order, so display output is
/// deterministic.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    accounts: BTreeMap<String, Account>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new account with the given starting balance (callers
    /// pre-validate it as non-negative) and freshly generated key material.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        initial_balance: Decimal,
    ) -> Result<(), AccountError> {
        let id = id.into();
        if self.accounts.contains_key(&id) {
            return Err(AccountError::DuplicateAccount(id));
        }

        let keys = KeyMaterial::generate(&mut rand::thread_rng());
        self.accounts.insert(
            id.clone(),
            Account {
                id,
                balance: initial_balance,
                keys,
            },
        );

        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    /// Current balance of `id`, if registered.
    pub fn balance(&self, id: &str) -> Option<Decimal> {
        self.accounts.get(id).map(|account| account.balance)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.accounts.contains_key(id)
    }

    /// Number of registered accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Accounts in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Registered ids in id order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.accounts.keys().map(String::as_str)
    }

    /// Subtracts `amount` from `id`. Fails without effect if the account is
    /// unknown or the debit would drive the balance negative.
    pub fn debit(&mut self, id: &str, amount: Decimal) -> Result<(), AccountError> {
        let account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| AccountError::AccountNotFound(id.to_string()))?;
        if amount > account.balance {
            return Err(AccountError::InsufficientFunds(id.to_string()));
        }
        account.balance -= amount;

        Ok(())
    }

    /// Adds `amount` to `id`; no upper bound.
    pub fn credit(&mut self, id: &str, amount: Decimal) -> Result<(), AccountError> {
        let account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| AccountError::AccountNotFound(id.to_string()))?;
        account.balance += amount;

        Ok(())
    }

    /// Atomically debits `payer` by `amount` and splits it between two
    /// payees: `secondary` receives `amount * secondary_share` and
    /// `primary` the remainder, so the split conserves the debited amount
    /// exactly.
    ///
    /// All three accounts are resolved and the payer's balance checked
    /// before any mutation, so a failure leaves every balance untouched.
    pub fn transfer_with_split(
        &mut self,
        payer: &str,
        primary: &str,
        secondary: &str,
        amount: Decimal,
        secondary_share: Decimal,
    ) -> Result<(), AccountError> {
        for id in [payer, primary, secondary] {
            if !self.accounts.contains_key(id) {
                return Err(AccountError::AccountNotFound(id.to_string()));
            }
        }
        if amount > self.accounts[payer].balance {
            return Err(AccountError::InsufficientFunds(payer.to_string()));
        }

        let bonus = amount * secondary_share;

        // No fallible step remains; apply all three legs.
        self.debit(payer, amount)?;
        self.credit(primary, amount - bonus)?;
        self.credit(secondary, bonus)?;

        tracing::debug!(
            payer,
            primary,
            secondary,
            %amount,
            %bonus,
            "settlement transfer applied"
        );
        Ok(())
    }
}
