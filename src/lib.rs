// loop-core: leveraged collateralized debt position sizing.
// risk-first: bounds and liquidation projection come before anything is submitted.
// all sizing math is pure and deterministic; I/O lives behind the provider traits.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Price, Percent, Address, Timestamp
//   2.x  input.rs: raw form values → model numbers
//   3.x  bounds.rs: liquidity derived capital ceiling, default inputs
//   4.x  position.rs: compounding collateral/debt projection
//   6.x  risk.rs: safe/danger labelling
//   7.x  config.rs: sizing policy, env presets
//   8.x  session.rs: owning layer, refresh on account change, submission
//   8.0.2 error.rs: error taxonomy
//   9.x  provider.rs: market data, wallet, submitter traits + mocks
//   11.x events.rs: session transition events for audit
//   12.x market.rs: market snapshot

// sizing modules
pub mod bounds;
pub mod input;
pub mod market;
pub mod position;
pub mod risk;
pub mod types;

// orchestration modules
pub mod config;
pub mod error;
pub mod events;
pub mod provider;
pub mod session;

// re exports for convenience
pub use bounds::*;
pub use input::*;
pub use market::*;
pub use position::*;
pub use risk::*;
pub use types::*;
pub use config::{ConfigError, Environment, SessionConfig, SizingPolicy};
pub use error::{Error, Result};
pub use events::{Event, EventId, EventPayload};
pub use provider::{
    account_change_channel, AccountChange, AccountChangeNotifier, AccountChanges,
    MarketDataProvider, MockMarketData, MockSubmitter, MockWallet, ProviderError, Receipt,
    SubmissionError, TransactionSubmitter, WalletProvider,
};
pub use session::{AccountSnapshot, SizingSession};
