// 8.0 session.rs: owning layer around the pure sizing functions. holds the current
// market snapshot, bounds, inputs and outputs, and sequences every change to them.
//
// the pure functions never see a partial snapshot: a refresh builds the whole new
// MarketState first and only then swaps it in. a failed refresh leaves the previous
// snapshot, bounds and outputs in place.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::bounds::{resolve_bounds, Bounds};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::events::{
    BoundsResolvedEvent, Event, EventLog, EventPayload, InputAcceptedEvent, InputRejectedEvent,
    MarketRefreshedEvent, ProviderFailedEvent, SubmissionFailedEvent, SubmissionSentEvent,
};
use crate::input::{InputField, RawInput};
use crate::market::MarketState;
use crate::position::{compute, PositionInputs, PositionOutputs};
use crate::provider::{
    AccountChanges, MarketDataProvider, ProviderError, Receipt, SubmissionError,
    TransactionSubmitter, WalletProvider,
};
use crate::risk::{classify, RiskLabel};
use crate::types::{Address, Price, Timestamp};

/// Wallet account the position would be opened from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub address: Address,
    /// Native asset balance.
    pub balance: Decimal,
}

/// Everything fetched in one refresh.
#[derive(Debug)]
struct Fetched {
    market: MarketState,
    account: Option<AccountSnapshot>,
}

/** 8.1: one sizing form's worth of state */
#[derive(Debug)]
pub struct SizingSession {
    config: SessionConfig,
    market_data: Arc<dyn MarketDataProvider>,
    wallet: Arc<dyn WalletProvider>,
    market: MarketState,
    bounds: Bounds,
    inputs: PositionInputs,
    outputs: PositionOutputs,
    account: Option<AccountSnapshot>,
    events: EventLog,
}

impl SizingSession {
    /// Fetch market data, resolve bounds and project the default position.
    pub async fn start(
        config: SessionConfig,
        market_data: Arc<dyn MarketDataProvider>,
        wallet: Arc<dyn WalletProvider>,
    ) -> Result<Self> {
        config.policy.validate()?;

        let fetched = fetch(market_data.as_ref(), wallet.as_ref()).await?;
        let bounds = resolve_bounds(fetched.market.counterparty_liquidity, &config.policy)?;
        let inputs = bounds.default_inputs();
        let outputs = compute(&inputs, &fetched.market);

        info!(
            asset_price = %fetched.market.asset_price,
            liquidity = %fetched.market.counterparty_liquidity,
            max_capital = %bounds.max_capital,
            "sizing session started"
        );

        let mut session = Self {
            events: EventLog::new(config.max_events),
            config,
            market_data,
            wallet,
            market: fetched.market,
            bounds,
            inputs,
            outputs,
            account: fetched.account,
        };
        session.record_refresh();
        Ok(session)
    }

    pub fn market(&self) -> &MarketState {
        &self.market
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn inputs(&self) -> &PositionInputs {
        &self.inputs
    }

    pub fn outputs(&self) -> &PositionOutputs {
        &self.outputs
    }

    pub fn account(&self) -> Option<&AccountSnapshot> {
        self.account.as_ref()
    }

    pub fn risk(&self) -> RiskLabel {
        classify(self.inputs.leverage_percent)
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    /// Last `count` events, oldest first.
    pub fn recent_events(&self, count: usize) -> &[Event] {
        self.events.recent(count)
    }

    /// Refetch market and account, then recompute bounds and outputs.
    /// On provider failure the previous snapshot stays in place.
    pub async fn refresh(&mut self) -> Result<()> {
        let fetched = match fetch(self.market_data.as_ref(), self.wallet.as_ref()).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(error = %e, "market refresh failed, keeping previous snapshot");
                self.events.record(
                    Timestamp::now(),
                    EventPayload::ProviderFailed(ProviderFailedEvent {
                        reason: e.to_string(),
                        kept_stale: true,
                    }),
                );
                return Err(e.into());
            }
        };

        let bounds = resolve_bounds(fetched.market.counterparty_liquidity, &self.config.policy)?;

        self.market = fetched.market;
        self.account = fetched.account;
        self.bounds = bounds;
        self.outputs = compute(&self.inputs, &self.market);

        debug!(
            asset_price = %self.market.asset_price,
            max_capital = %self.bounds.max_capital,
            "market refreshed"
        );
        self.record_refresh();
        Ok(())
    }

    /// Apply one form edit. A rejected value leaves inputs and outputs untouched.
    pub fn edit(&mut self, field: InputField, raw: &RawInput) -> Result<&PositionOutputs> {
        match self.inputs.apply_edit(field, raw) {
            Ok(next) => {
                self.inputs = next;
                self.outputs = compute(&self.inputs, &self.market);
                self.events.record(
                    Timestamp::now(),
                    EventPayload::InputAccepted(InputAcceptedEvent {
                        field,
                        inputs: next,
                    }),
                );
                Ok(&self.outputs)
            }
            Err(rejected) => {
                debug!(?field, reason = %rejected, "edit rejected");
                self.events.record(
                    Timestamp::now(),
                    EventPayload::InputRejected(InputRejectedEvent {
                        field,
                        reason: rejected.to_string(),
                    }),
                );
                Err(rejected.into())
            }
        }
    }

    /// Whether the current inputs can be submitted as they stand.
    pub fn can_submit(&self) -> bool {
        self.account.is_some() && self.bounds.contains(&self.inputs)
    }

    /// Submit the current projection. Inputs and outputs are unchanged either way.
    pub async fn submit(&mut self, submitter: &dyn TransactionSubmitter) -> Result<Receipt> {
        let result = self.try_submit(submitter).await;

        match &result {
            Ok(receipt) => {
                info!(tx_hash = %receipt.tx_hash, account = %receipt.account, "leverage position submitted");
                self.events.record(
                    Timestamp::now(),
                    EventPayload::SubmissionSent(SubmissionSentEvent {
                        account: receipt.account.clone(),
                        tx_hash: receipt.tx_hash.clone(),
                        collateral: self.outputs.collateral,
                        debt: self.outputs.debt,
                        capital: self.inputs.capital,
                    }),
                );
            }
            Err(e) => {
                warn!(error = %e, "leverage submission failed");
                self.events.record(
                    Timestamp::now(),
                    EventPayload::SubmissionFailed(SubmissionFailedEvent {
                        reason: e.to_string(),
                    }),
                );
            }
        }

        result.map_err(Error::from)
    }

    async fn try_submit(
        &self,
        submitter: &dyn TransactionSubmitter,
    ) -> std::result::Result<Receipt, SubmissionError> {
        let account = self.account.as_ref().ok_or(SubmissionError::NoAccount)?;
        if !self.bounds.contains(&self.inputs) {
            return Err(SubmissionError::OutOfBounds);
        }

        submitter
            .submit_leverage_position(
                self.outputs.collateral,
                self.outputs.debt,
                self.inputs.capital,
                &account.address,
            )
            .await
    }

    /// Refresh once per account or network change until every notifier is gone.
    /// Provider failures keep the stale snapshot and wait for the next change.
    pub async fn run_notifications(&mut self, changes: &mut AccountChanges) -> Result<()> {
        while let Some(change) = changes.recv().await {
            info!(?change, "account change received");
            self.events
                .record(Timestamp::now(), EventPayload::AccountChangeReceived(change));

            match self.refresh().await {
                Ok(()) | Err(Error::Provider(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn record_refresh(&mut self) {
        let now = Timestamp::now();
        self.events.record(
            now,
            EventPayload::MarketRefreshed(MarketRefreshedEvent {
                asset_price: self.market.asset_price,
                counterparty_liquidity: self.market.counterparty_liquidity,
                account: self.account.as_ref().map(|a| a.address.clone()),
            }),
        );
        self.events.record(
            now,
            EventPayload::BoundsResolved(BoundsResolvedEvent {
                bounds: self.bounds,
            }),
        );
    }
}

// fetch a complete snapshot before anything is replaced
async fn fetch(
    market_data: &dyn MarketDataProvider,
    wallet: &dyn WalletProvider,
) -> std::result::Result<Fetched, ProviderError> {
    let raw_price = market_data.fetch_asset_price().await?;
    let asset_price = Price::new(raw_price).ok_or(ProviderError::InvalidPrice(raw_price))?;
    let liquidity = market_data.fetch_counterparty_liquidity().await?;
    if liquidity < Decimal::ZERO {
        return Err(ProviderError::InvalidLiquidity(liquidity));
    }

    // first exposed account is the active one
    let account = match wallet.accounts().await?.into_iter().next() {
        Some(address) => {
            let balance = wallet.balance(&address).await?;
            Some(AccountSnapshot { address, balance })
        }
        None => None,
    };

    Ok(Fetched {
        market: MarketState::new(asset_price, liquidity, Timestamp::now()),
        account,
    })
}
