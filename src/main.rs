//! Leverage loop sizing simulation.
//!
//! Walks a sizing session through startup, form edits, a market refresh
//! triggered by a wallet change, a failed refresh, and submission, all
//! against in-memory collaborators.

use std::sync::Arc;

use loop_core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> loop_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Leveraged CDP Sizing Simulation");
    println!("Compounding leverage loop, liquidity bounded\n");

    scenario_1_default_projection().await?;
    scenario_2_leverage_sweep();
    scenario_3_form_edits().await?;
    scenario_4_account_change().await?;
    scenario_5_submission().await?;

    println!("\nAll simulations completed successfully.");
    Ok(())
}

fn collaborators(price: Decimal, liquidity: Decimal) -> (Arc<MockMarketData>, Arc<MockWallet>) {
    let market = Arc::new(MockMarketData::new(price, liquidity));
    let wallet = Arc::new(MockWallet::new().with_account(Address::new("0xa11ce"), dec!(4)));
    (market, wallet)
}

fn print_outputs(session: &SizingSession) {
    let out = session.outputs();
    let ratio = match out.collateralization_ratio {
        CollateralizationRatio::Finite(v) => format!("{}%", v),
        CollateralizationRatio::Infinite => "infinite".to_string(),
    };
    println!("    Collateral: {:.3}, debt: ${:.2}, change: ${:.2}", out.collateral, out.debt, out.return_value);
    println!("    Liquidation price: ${:.2}, ratio: {}, status: {}", out.liquidation_price, ratio, session.risk().as_str());
}

/// Session start with default inputs.
async fn scenario_1_default_projection() -> loop_core::Result<()> {
    println!("Scenario 1: Default Projection\n");

    let (market, wallet) = collaborators(dec!(200), dec!(100));
    let session = SizingSession::start(SessionConfig::default(), market, wallet).await?;

    let bounds = session.bounds();
    println!("  Asset price ${}, facility liquidity {}", session.market().asset_price, session.market().counterparty_liquidity);
    println!("  Capital range {} to {}, percent range {} to {}", bounds.min_capital, bounds.max_capital, bounds.min_percent, bounds.max_percent);
    println!("  Defaults: capital {}, leverage {}", session.inputs().capital, session.inputs().leverage_percent);
    print_outputs(&session);
    println!();
    Ok(())
}

/// Same capital across the percent range.
fn scenario_2_leverage_sweep() {
    println!("Scenario 2: Leverage Sweep\n");

    for percent in [dec!(0), dec!(10), dec!(30), dec!(50), dec!(60)] {
        let p = Percent::new(percent);
        let out = compute_outputs(dec!(1), p, dec!(200));
        println!(
            "  {:>4}: collateral {:.4}, debt ${:.2}, liquidation ${:.2}, {}",
            p.to_string(),
            out.collateral,
            out.debt,
            out.liquidation_price,
            classify(p).as_str()
        );
    }
    println!();
}

/// Accepted and rejected form edits.
async fn scenario_3_form_edits() -> loop_core::Result<()> {
    println!("Scenario 3: Form Edits\n");

    let (market, wallet) = collaborators(dec!(200), dec!(100));
    let mut session = SizingSession::start(SessionConfig::default(), market, wallet).await?;

    session.edit(InputField::LeveragePercent, &RawInput::Number(60.0))?;
    println!("  Leverage raised to 60%");
    print_outputs(&session);

    if let Err(e) = session.edit(InputField::Capital, &RawInput::Empty) {
        println!("  Cleared capital field: {}", e);
    }
    println!("  Capital still {}", session.inputs().capital);
    println!();
    Ok(())
}

/// Wallet change refetches the market; a failed refetch keeps the old snapshot.
async fn scenario_4_account_change() -> loop_core::Result<()> {
    println!("Scenario 4: Account Change\n");

    let (market, wallet) = collaborators(dec!(200), dec!(100));
    let mut session = SizingSession::start(SessionConfig::default(), market.clone(), wallet).await?;
    let (notifier, mut changes) = account_change_channel(8);

    market.set_price(dec!(180)).await;
    market.set_liquidity(dec!(20)).await;
    notifier.notify(AccountChange::NetworkChanged).await;

    drop(notifier);
    session.run_notifications(&mut changes).await?;
    println!("  After network change: price ${}, max capital {}", session.market().asset_price, session.bounds().max_capital);
    print_outputs(&session);

    market.set_failure(Some("node unreachable")).await;
    if let Err(e) = session.refresh().await {
        println!("  Refresh failed ({}), still at price ${}", e, session.market().asset_price);
    }
    println!();
    Ok(())
}

/// Submission success and a rejected transaction.
async fn scenario_5_submission() -> loop_core::Result<()> {
    println!("Scenario 5: Submission\n");

    let (market, wallet) = collaborators(dec!(200), dec!(100));
    let mut session = SizingSession::start(SessionConfig::default(), market, wallet).await?;
    let submitter = MockSubmitter::new();

    let receipt = session.submit(&submitter).await?;
    println!("  Sent from {}: {}", receipt.account, receipt.tx_hash);

    submitter.set_failure(Some("user denied transaction signature")).await;
    if let Err(e) = session.submit(&submitter).await {
        println!("  Second attempt failed: {}", e);
    }
    println!("  Events recorded: {}", session.events().len());
    for event in session.recent_events(2) {
        println!("    #{} {:?}", event.id.0, event.payload);
    }
    Ok(())
}
