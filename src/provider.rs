// Collaborator Integration
//
// The sizing core never talks to a chain directly. Market data, wallet accounts
// and transaction submission come in through the traits below, so the core is
// agnostic to whether they are backed by an RPC node, an injected wallet, or
// the in-memory mocks at the bottom of this file.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::{mpsc, Mutex};

use crate::types::{Address, Timestamp};

/// Errors from market data or wallet lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider returned non-positive asset price {0}")]
    InvalidPrice(Decimal),

    #[error("Provider returned negative liquidity {0}")]
    InvalidLiquidity(Decimal),
}

/// Errors from the submission flow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Transaction failed: {0}")]
    Rejected(String),

    #[error("No wallet account available")]
    NoAccount,

    #[error("Inputs are outside the current bounds")]
    OutOfBounds,
}

/// Source of the two market figures the sizing model needs.
#[async_trait]
pub trait MarketDataProvider: Send + Sync + fmt::Debug {
    /// Quote units per unit of asset.
    async fn fetch_asset_price(&self) -> Result<Decimal, ProviderError>;

    /// Funds held by the leverage facility, in asset units.
    async fn fetch_counterparty_liquidity(&self) -> Result<Decimal, ProviderError>;
}

/// Accounts exposed by the connected wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync + fmt::Debug {
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;

    async fn balance(&self, account: &Address) -> Result<Decimal, ProviderError>;
}

/// Submits the leverage transaction. Unit conversion to the chain's native
/// integer representation happens on this side of the seam.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync + fmt::Debug {
    async fn submit_leverage_position(
        &self,
        collateral: Decimal,
        debt: Decimal,
        capital: Decimal,
        account: &Address,
    ) -> Result<Receipt, SubmissionError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: String,
    pub account: Address,
    pub submitted_at: Timestamp,
}

/// Something about the wallet changed; market state must be refetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountChange {
    AccountsChanged,
    NetworkChanged,
}

/// Sending half of the account change channel. Held by the wallet integration.
#[derive(Debug, Clone)]
pub struct AccountChangeNotifier {
    tx: mpsc::Sender<AccountChange>,
}

impl AccountChangeNotifier {
    /// Returns false once the receiving session is gone.
    pub async fn notify(&self, change: AccountChange) -> bool {
        self.tx.send(change).await.is_ok()
    }
}

/// Receiving half of the account change channel. Held by the session owner.
#[derive(Debug)]
pub struct AccountChanges {
    rx: mpsc::Receiver<AccountChange>,
}

impl AccountChanges {
    /// Next notification, or None when every notifier has been dropped.
    pub async fn recv(&mut self) -> Option<AccountChange> {
        self.rx.recv().await
    }
}

pub fn account_change_channel(buffer: usize) -> (AccountChangeNotifier, AccountChanges) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (AccountChangeNotifier { tx }, AccountChanges { rx })
}

// In-memory collaborators for tests and the simulation binary.

#[derive(Debug, Clone)]
struct MarketFigures {
    price: Decimal,
    liquidity: Decimal,
    failure: Option<String>,
}

/// Market data with settable figures and injectable failures.
#[derive(Debug)]
pub struct MockMarketData {
    figures: Mutex<MarketFigures>,
}

impl MockMarketData {
    pub fn new(price: Decimal, liquidity: Decimal) -> Self {
        Self {
            figures: Mutex::new(MarketFigures {
                price,
                liquidity,
                failure: None,
            }),
        }
    }

    pub async fn set_price(&self, price: Decimal) {
        self.figures.lock().await.price = price;
    }

    pub async fn set_liquidity(&self, liquidity: Decimal) {
        self.figures.lock().await.liquidity = liquidity;
    }

    /// Make every fetch fail with `reason` until cleared with None.
    pub async fn set_failure(&self, reason: Option<&str>) {
        self.figures.lock().await.failure = reason.map(str::to_string);
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketData {
    async fn fetch_asset_price(&self) -> Result<Decimal, ProviderError> {
        let figures = self.figures.lock().await;
        match &figures.failure {
            Some(reason) => Err(ProviderError::Request(reason.clone())),
            None => Ok(figures.price),
        }
    }

    async fn fetch_counterparty_liquidity(&self) -> Result<Decimal, ProviderError> {
        let figures = self.figures.lock().await;
        match &figures.failure {
            Some(reason) => Err(ProviderError::Request(reason.clone())),
            None => Ok(figures.liquidity),
        }
    }
}

/// Wallet with a fixed set of funded accounts.
#[derive(Debug, Default)]
pub struct MockWallet {
    accounts: Mutex<Vec<(Address, Decimal)>>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account: Address, balance: Decimal) -> Self {
        self.accounts.get_mut().push((account, balance));
        self
    }

    /// Replace the exposed accounts, as a wallet does when the user switches.
    pub async fn set_accounts(&self, accounts: Vec<(Address, Decimal)>) {
        *self.accounts.lock().await = accounts;
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.iter().map(|(addr, _)| addr.clone()).collect())
    }

    async fn balance(&self, account: &Address) -> Result<Decimal, ProviderError> {
        let accounts = self.accounts.lock().await;
        accounts
            .iter()
            .find(|(addr, _)| addr == account)
            .map(|(_, balance)| *balance)
            .ok_or_else(|| ProviderError::Request(format!("unknown account {account}")))
    }
}

/// A call recorded by `MockSubmitter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub collateral: Decimal,
    pub debt: Decimal,
    pub capital: Decimal,
    pub account: Address,
}

/// Submitter that records calls and can be told to fail.
#[derive(Debug, Default)]
pub struct MockSubmitter {
    submissions: Mutex<Vec<Submission>>,
    failure: Mutex<Option<String>>,
    next_nonce: Mutex<u64>,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_failure(&self, reason: Option<&str>) {
        *self.failure.lock().await = reason.map(str::to_string);
    }

    pub async fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().await.clone()
    }
}

#[async_trait]
impl TransactionSubmitter for MockSubmitter {
    async fn submit_leverage_position(
        &self,
        collateral: Decimal,
        debt: Decimal,
        capital: Decimal,
        account: &Address,
    ) -> Result<Receipt, SubmissionError> {
        if let Some(reason) = self.failure.lock().await.clone() {
            return Err(SubmissionError::Rejected(reason));
        }

        self.submissions.lock().await.push(Submission {
            collateral,
            debt,
            capital,
            account: account.clone(),
        });

        let mut nonce = self.next_nonce.lock().await;
        *nonce += 1;

        Ok(Receipt {
            tx_hash: format!("0x{:064x}", *nonce),
            account: account.clone(),
            submitted_at: Timestamp::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn mock_market_data_failure_toggle() {
        let market = MockMarketData::new(dec!(200), dec!(100));
        assert_eq!(market.fetch_asset_price().await, Ok(dec!(200)));

        market.set_failure(Some("rpc down")).await;
        assert_eq!(
            market.fetch_counterparty_liquidity().await,
            Err(ProviderError::Request("rpc down".to_string()))
        );

        market.set_failure(None).await;
        assert_eq!(market.fetch_counterparty_liquidity().await, Ok(dec!(100)));
    }

    #[tokio::test]
    async fn mock_wallet_lookup() {
        let alice = Address::new("0xa11ce");
        let wallet = MockWallet::new().with_account(alice.clone(), dec!(3));

        assert_eq!(wallet.accounts().await, Ok(vec![alice.clone()]));
        assert_eq!(wallet.balance(&alice).await, Ok(dec!(3)));
        assert!(wallet.balance(&Address::new("0xb0b")).await.is_err());
    }

    #[tokio::test]
    async fn mock_submitter_records_and_fails() {
        let submitter = MockSubmitter::new();
        let alice = Address::new("0xa11ce");

        let receipt = submitter
            .submit_leverage_position(dec!(0.1875), dec!(18.75), dec!(0.1), &alice)
            .await
            .unwrap();
        assert_eq!(receipt.account, alice);
        assert_eq!(submitter.submissions().await.len(), 1);

        submitter.set_failure(Some("user denied")).await;
        let result = submitter
            .submit_leverage_position(dec!(0.1875), dec!(18.75), dec!(0.1), &alice)
            .await;
        assert_eq!(
            result,
            Err(SubmissionError::Rejected("user denied".to_string()))
        );
        assert_eq!(submitter.submissions().await.len(), 1);
    }

    #[tokio::test]
    async fn notifications_end_when_notifiers_drop() {
        let (notifier, mut changes) = account_change_channel(4);
        assert!(notifier.notify(AccountChange::NetworkChanged).await);
        drop(notifier);

        assert_eq!(changes.recv().await, Some(AccountChange::NetworkChanged));
        assert_eq!(changes.recv().await, None);
    }
}
