//! Ledger store interface and the rewards service.
//!
//! The store is the abstract persistence seam: versioned account reads, a
//! compare-and-swap write, and an append-only transaction log. The
//! [`RewardsService`] drives the core state machine through that seam with
//! optimistic concurrency - read, apply the pure transition, CAS write,
//! retry on conflict - so two concurrent redemptions against one
//! redemption's worth of points can never both succeed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sipclub_core::rewards::{
    RewardsAccount, RewardsConfig, RewardsError, RewardsTransaction, TransactionKind,
};
use sipclub_core::token::{RedemptionTokenService, TokenInvalid};
use sipclub_core::types::{ClubId, UserId};
use thiserror::Error;
use tokio::sync::RwLock;

/// How many CAS conflicts to absorb before giving up on a transition.
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Errors surfaced by ledger store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The account changed between read and write.
    #[error("version conflict: expected {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },

    /// Backend failure in a real store implementation.
    #[error("ledger store unavailable: {0}")]
    Unavailable(String),
}

/// Failures applying a ledger operation end to end.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Business-rule failure from the core state machine.
    #[error(transparent)]
    Rewards(#[from] RewardsError),

    /// The presented redemption token was refused.
    #[error(transparent)]
    Token(#[from] TokenInvalid),

    /// No account exists for the (user, club) pair.
    #[error("no rewards account for user {user_id} at club {club_id}")]
    AccountNotFound { user_id: UserId, club_id: ClubId },

    /// The CAS retry budget ran out under sustained contention.
    #[error("account update contention exceeded {MAX_WRITE_ATTEMPTS} attempts")]
    Contention,

    /// Store backend failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An account snapshot together with its store version.
#[derive(Debug, Clone)]
pub struct VersionedAccount {
    pub account: RewardsAccount,
    pub version: u64,
}

/// Atomic persistence for rewards accounts and their transaction log.
///
/// `write_account` with `expected_version == 0` creates the account;
/// otherwise it must match the version returned by `read_account` or the
/// write fails with [`StoreError::Conflict`].
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn read_account(
        &self,
        user_id: &UserId,
        club_id: &ClubId,
    ) -> Result<Option<VersionedAccount>, StoreError>;

    async fn write_account(
        &self,
        account: RewardsAccount,
        expected_version: u64,
    ) -> Result<u64, StoreError>;

    async fn append_transaction(&self, tx: RewardsTransaction) -> Result<(), StoreError>;
}

/// In-memory ledger store for local operation and tests.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    accounts: RwLock<HashMap<(UserId, ClubId), (RewardsAccount, u64)>>,
    transactions: RwLock<Vec<RewardsTransaction>>,
}

impl InMemoryLedgerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the transaction log, oldest first.
    pub async fn transactions(&self) -> Vec<RewardsTransaction> {
        self.transactions.read().await.clone()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn read_account(
        &self,
        user_id: &UserId,
        club_id: &ClubId,
    ) -> Result<Option<VersionedAccount>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .get(&(user_id.clone(), club_id.clone()))
            .map(|(account, version)| VersionedAccount {
                account: account.clone(),
                version: *version,
            }))
    }

    async fn write_account(
        &self,
        account: RewardsAccount,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let mut accounts = self.accounts.write().await;
        let key = (account.user_id.clone(), account.club_id.clone());
        let actual = accounts.get(&key).map_or(0, |(_, version)| *version);
        if actual != expected_version {
            return Err(StoreError::Conflict {
                expected: expected_version,
                actual,
            });
        }
        let next = expected_version + 1;
        accounts.insert(key, (account, next));
        Ok(next)
    }

    async fn append_transaction(&self, tx: RewardsTransaction) -> Result<(), StoreError> {
        self.transactions.write().await.push(tx);
        Ok(())
    }
}

/// Outcome of an earn or bonus transition.
#[derive(Debug, Clone)]
pub struct EarnOutcome {
    /// The account after the credit.
    pub account: RewardsAccount,
    /// Minted when the purchase streak reached the free-drink milestone.
    pub redemption_token: Option<String>,
}

/// The loyalty ledger: applies core transitions through the store with
/// optimistic-concurrency retry, appending one transaction per mutation.
#[derive(Clone)]
pub struct RewardsService {
    store: Arc<dyn LedgerStore>,
    config: RewardsConfig,
    tokens: RedemptionTokenService,
}

impl RewardsService {
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        config: RewardsConfig,
        tokens: RedemptionTokenService,
    ) -> Self {
        Self {
            store,
            config,
            tokens,
        }
    }

    /// Current account snapshot. Never mutates.
    ///
    /// # Errors
    ///
    /// Store backend failures only.
    pub async fn get_account(
        &self,
        user_id: &UserId,
        club_id: &ClubId,
    ) -> Result<Option<RewardsAccount>, LedgerError> {
        Ok(self
            .store
            .read_account(user_id, club_id)
            .await?
            .map(|versioned| versioned.account))
    }

    /// Credit a qualifying purchase, creating the account on first earn.
    ///
    /// When the purchase streak reaches the free-drink milestone the
    /// outcome carries a freshly minted redemption token for this club.
    ///
    /// # Errors
    ///
    /// Store failures or retry exhaustion under contention.
    pub async fn earn(
        &self,
        user_id: &UserId,
        club_id: &ClubId,
        points: u64,
        order_id: Option<String>,
    ) -> Result<EarnOutcome, LedgerError> {
        let now = Utc::now();
        let mut milestone_reached = false;
        let account = self
            .apply(user_id, club_id, true, |account| {
                milestone_reached = account.earn(points, now, &self.config);
                Ok(())
            })
            .await?;

        self.store
            .append_transaction(RewardsTransaction::record(
                user_id.clone(),
                club_id.clone(),
                TransactionKind::Earn,
                points,
                now,
                order_id,
            ))
            .await?;

        let redemption_token = milestone_reached
            .then(|| self.tokens.issue(user_id, club_id, now));
        if redemption_token.is_some() {
            tracing::info!(%user_id, %club_id, "free-drink milestone reached, token minted");
        }

        Ok(EarnOutcome {
            account,
            redemption_token,
        })
    }

    /// Administrative credit; does not extend the purchase streak and
    /// never mints a token.
    ///
    /// # Errors
    ///
    /// Store failures or retry exhaustion under contention.
    pub async fn bonus(
        &self,
        user_id: &UserId,
        club_id: &ClubId,
        points: u64,
    ) -> Result<RewardsAccount, LedgerError> {
        let now = Utc::now();
        let account = self
            .apply(user_id, club_id, true, |account| {
                account.bonus(points, now, &self.config);
                Ok(())
            })
            .await?;

        self.store
            .append_transaction(RewardsTransaction::record(
                user_id.clone(),
                club_id.clone(),
                TransactionKind::Bonus,
                points,
                now,
                None,
            ))
            .await?;

        Ok(account)
    }

    /// Spend points from an existing account.
    ///
    /// # Errors
    ///
    /// `InsufficientPoints` when the balance is short; `AccountNotFound`
    /// when no account exists for the pair.
    pub async fn redeem_points(
        &self,
        user_id: &UserId,
        club_id: &ClubId,
        cost: u64,
    ) -> Result<RewardsAccount, LedgerError> {
        let account = self
            .apply(user_id, club_id, false, |account| {
                account.redeem_points(cost).map_err(LedgerError::from)
            })
            .await?;

        self.store
            .append_transaction(RewardsTransaction::record(
                user_id.clone(),
                club_id.clone(),
                TransactionKind::Redeem,
                cost,
                Utc::now(),
                None,
            ))
            .await?;

        Ok(account)
    }

    /// Redeem a free-drink milestone token presented at `presenting_club`.
    ///
    /// Validates the token (parse, club match, expiry - in that order)
    /// before touching the account; on success the purchase streak resets.
    ///
    /// # Errors
    ///
    /// `Token` for an invalid token, `MilestoneNotReached` when the streak
    /// no longer qualifies, `AccountNotFound` for an unknown account.
    pub async fn redeem_token(
        &self,
        token: &str,
        presenting_club: &ClubId,
    ) -> Result<RewardsAccount, LedgerError> {
        let payload = self.tokens.validate(token, presenting_club, Utc::now())?;
        let milestone = self.config.free_drink_milestone;

        let account = self
            .apply(&payload.local_customer_id, presenting_club, false, |account| {
                account.redeem_milestone(milestone).map_err(LedgerError::from)
            })
            .await?;

        self.store
            .append_transaction(RewardsTransaction::record(
                payload.local_customer_id,
                presenting_club.clone(),
                TransactionKind::Redeem,
                0,
                Utc::now(),
                None,
            ))
            .await?;

        Ok(account)
    }

    /// Read-apply-write with CAS retry.
    ///
    /// `create_if_missing` distinguishes credits (first earn creates the
    /// account) from debits (missing account is an error).
    async fn apply<F>(
        &self,
        user_id: &UserId,
        club_id: &ClubId,
        create_if_missing: bool,
        mut transition: F,
    ) -> Result<RewardsAccount, LedgerError>
    where
        F: FnMut(&mut RewardsAccount) -> Result<(), LedgerError>,
    {
        for attempt in 0..MAX_WRITE_ATTEMPTS {
            let versioned = self.store.read_account(user_id, club_id).await?;
            let (mut account, expected_version) = match versioned {
                Some(v) => (v.account, v.version),
                None if create_if_missing => {
                    (RewardsAccount::new(user_id.clone(), club_id.clone()), 0)
                }
                None => {
                    return Err(LedgerError::AccountNotFound {
                        user_id: user_id.clone(),
                        club_id: club_id.clone(),
                    });
                }
            };

            transition(&mut account)?;

            match self.store.write_account(account.clone(), expected_version).await {
                Ok(_) => return Ok(account),
                Err(StoreError::Conflict { .. }) => {
                    tracing::debug!(%user_id, %club_id, attempt, "account CAS conflict, retrying");
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(LedgerError::Contention)
    }
}
