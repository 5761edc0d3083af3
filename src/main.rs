//! Stable Engine Simulation.
//!
//! Walks the engine through its lifecycle against mock tokens and feeds:
//! deposits, minting, multi-collateral backing, rejected operations, a price
//! crash with liquidations, and a randomized stress run.

use rust_decimal::Decimal;
use stable_engine::*;
use std::rc::Rc;

const ENGINE: AccountId = AccountId(0);
const WETH: AssetId = AssetId(1);
const WBTC: AssetId = AssetId(2);
const PRICE_UNIT: i128 = 100_000_000;

struct World {
    engine: Engine,
    weth: Rc<MockCollateralToken>,
    wbtc: Rc<MockCollateralToken>,
    weth_feed: Rc<MockPriceFeed>,
    stable: Rc<MockStableToken>,
}

fn main() -> Result<(), EngineError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let risk = EngineConfig::default().risk;
    println!("Stable Engine Simulation");
    println!(
        "WETH and WBTC collateral, {}% threshold, {}% liquidation bonus\n",
        (risk.liquidation_threshold().as_fraction() * Decimal::ONE_HUNDRED).normalize(),
        (risk.liquidation_bonus().as_fraction() * Decimal::ONE_HUNDRED).normalize()
    );

    scenario_1_deposit_and_mint()?;
    scenario_2_multi_collateral()?;
    scenario_3_rejected_operations()?;
    scenario_4_price_crash_and_liquidation()?;
    scenario_5_stress_test()?;

    println!("\nAll simulations completed successfully.");
    Ok(())
}

fn setup(config: EngineConfig) -> Result<World, EngineError> {
    let weth = Rc::new(MockCollateralToken::new(WETH, 18, ENGINE));
    let wbtc = Rc::new(MockCollateralToken::new(WBTC, 8, ENGINE));
    let weth_feed = Rc::new(MockPriceFeed::new(FeedId(1), 2_000 * PRICE_UNIT, 8));
    let wbtc_feed = Rc::new(MockPriceFeed::new(FeedId(2), 30_000 * PRICE_UNIT, 8));
    let stable = Rc::new(MockStableToken::new(18, ENGINE));

    let mut engine = Engine::new(
        config,
        vec![
            weth.clone() as Rc<dyn CollateralToken>,
            wbtc.clone() as Rc<dyn CollateralToken>,
        ],
        vec![weth_feed.clone() as Rc<dyn PriceFeed>, wbtc_feed as Rc<dyn PriceFeed>],
        stable.clone() as Rc<dyn StableToken>,
    )?;
    // stamp events with wall-clock time
    engine.set_time(Timestamp::now());

    Ok(World {
        engine,
        weth,
        wbtc,
        weth_feed,
        stable,
    })
}

// whole units of an 18 decimal token, weth and stable alike
fn units(n: u128) -> Result<Amount, EngineError> {
    Ok(Amount::from_units(n, 18)?)
}

fn usd(value: UsdValue) -> String {
    match value.to_decimal(18) {
        Some(d) => format!("${}", d.round_dp(2)),
        None => format!("{} raw", value),
    }
}

fn show_stable(amount: Amount) -> String {
    usd(UsdValue::from_stable(amount))
}

/// Single asset deposit, valuation and mint.
fn scenario_1_deposit_and_mint() -> Result<(), EngineError> {
    println!("Scenario 1: Deposit and Mint\n");

    let mut world = setup(EngineConfig::default())?;
    let alice = AccountId(1);
    world.weth.mint_to(alice, units(15)?);

    world.engine.deposit_collateral(alice, WETH, units(15)?)?;
    let value = world.engine.get_usd_value(WETH, units(15)?)?;
    println!("  Alice deposits 15 WETH @ $2,000, worth {}", usd(value));

    let hundred = UsdValue::from_stable(units(100)?);
    let amount = world.engine.get_token_amount_from_usd(WETH, hundred)?;
    println!("  $100 buys {} raw WETH", amount);

    let headroom = world.engine.max_mintable(alice)?;
    println!("  Max mintable: {}", show_stable(headroom));

    world.engine.mint_stable(alice, units(10_000)?)?;
    let info = world.engine.get_account_information(alice)?;
    println!(
        "  Minted {}, collateral {}, health factor {}\n",
        show_stable(info.debt_minted),
        usd(info.collateral_value),
        world.engine.get_health_factor(alice)?
    );
    Ok(())
}

/// Two collateral assets with different decimals backing one position.
fn scenario_2_multi_collateral() -> Result<(), EngineError> {
    println!("Scenario 2: Multi-Collateral Position\n");

    let mut world = setup(EngineConfig::default())?;
    let bob = AccountId(2);
    let half_btc = Amount::new(50_000_000);
    world.weth.mint_to(bob, units(5)?);
    world.wbtc.mint_to(bob, half_btc);

    world
        .engine
        .deposit_collateral_and_mint(bob, WETH, units(5)?, units(2_000)?)?;
    world.engine.deposit_collateral(bob, WBTC, half_btc)?;

    let value = world.engine.account_collateral_value(bob)?;
    println!("  Bob holds 5 WETH and 0.5 WBTC, total {}", usd(value));
    println!("  Health factor with {} debt: {}", show_stable(world.engine.debt_of(bob)), world.engine.get_health_factor(bob)?);

    world.engine.mint_stable(bob, world.engine.max_mintable(bob)?)?;
    println!("  Minted up to the limit, health factor {}", world.engine.get_health_factor(bob)?);

    let totals = world.engine.system_totals()?;
    println!(
        "  System: {} debt, {} collateral, fully backed: {}\n",
        show_stable(totals.total_debt),
        usd(totals.total_collateral_value),
        totals.is_fully_backed(world.engine.health_params())?
    );
    Ok(())
}

/// Operations the engine refuses, and proof nothing changed.
fn scenario_3_rejected_operations() -> Result<(), EngineError> {
    println!("Scenario 3: Rejected Operations\n");

    let mut world = setup(EngineConfig::default())?;
    let carol = AccountId(3);
    world.weth.mint_to(carol, units(10)?);
    world.engine.deposit_collateral(carol, WETH, units(10)?)?;
    let before = world.engine.position(carol).clone();

    let attempts = [
        ("mint zero", world.engine.mint_stable(carol, Amount::ZERO)),
        ("mint past threshold", world.engine.mint_stable(carol, units(10_001)?)),
        ("redeem unknown asset", world.engine.redeem_collateral(carol, AssetId(9), units(1)?)),
        ("burn without debt", world.engine.burn_stable(carol, units(1)?)),
    ];
    for (label, result) in attempts {
        match result {
            Ok(()) => println!("  {}: accepted", label),
            Err(e) => println!("  {}: {:?} ({})", label, e.kind(), e),
        }
    }

    world.stable.set_fail_mint(true);
    let err = world.engine.mint_stable(carol, units(1_000)?);
    println!("  mint with a failing token: {:?}", err.map_err(|e| e.kind()));
    world.stable.set_fail_mint(false);

    println!("  Position unchanged: {}\n", world.engine.position(carol) == &before);
    Ok(())
}

/// Price crash, then a keeper liquidates the underwater position.
fn scenario_4_price_crash_and_liquidation() -> Result<(), EngineError> {
    println!("Scenario 4: Price Crash and Liquidation\n");

    let mut world = setup(EngineConfig::default())?;
    let borrower = AccountId(4);
    let keeper = AccountId(5);

    world.weth.mint_to(borrower, units(10)?);
    world
        .engine
        .deposit_collateral_and_mint(borrower, WETH, units(10)?, units(9_000)?)?;
    world.stable.mint(keeper, units(20_000)?);

    println!("  Borrower: 10 WETH, 9,000 debt, health factor {}", world.engine.get_health_factor(borrower)?);

    for price in [1_900, 1_800, 1_700] {
        world.weth_feed.set_price(price * PRICE_UNIT);
        println!(
            "  WETH @ ${}: health factor {}, liquidatable {}",
            price,
            world.engine.get_health_factor(borrower)?,
            world.engine.is_liquidatable(borrower)?
        );
    }

    let result = world.engine.liquidate(keeper, borrower, WETH, units(4_500)?)?;
    println!(
        "  Keeper covers {}, seizes {} raw WETH (bonus {})",
        show_stable(result.debt_covered),
        result.collateral_seized,
        result.bonus
    );
    println!("  Health factor {} -> {}", result.health_before, result.health_after);
    println!("  Keeper WETH balance: {} raw\n", world.weth.balance_of(keeper));
    Ok(())
}

/// Many borrowers, a volatile price path, and a keeper sweeping liquidations.
fn scenario_5_stress_test() -> Result<(), EngineError> {
    println!("Scenario 5: Stress Test\n");

    let mut world = setup(EngineConfig::default())?;
    let keeper = AccountId(1_000);
    world.stable.mint(keeper, units(1_000_000)?);

    let num_borrowers = 20;
    let mut borrowers = Vec::new();
    for i in 0..num_borrowers {
        let account = AccountId(100 + i);
        let collateral = units(5 + i as u128)?;
        world.weth.mint_to(account, collateral);
        world.engine.deposit_collateral(account, WETH, collateral)?;

        // leverage spread from 50% to 97% of the limit
        let headroom = world.engine.max_mintable(account)?;
        let debt = Amount::new(headroom.raw() / 100 * (50 + (i as u128 * 5) % 48));
        world.engine.mint_stable(account, debt)?;
        borrowers.push(account);
    }
    println!("  Opened {} positions", num_borrowers);

    let prices = [2_050, 1_950, 1_850, 1_700, 1_800, 1_600, 1_500, 1_650, 1_900];
    let mut liquidations = 0;
    let mut rejected = 0;

    for price in prices {
        world.weth_feed.set_price(price * PRICE_UNIT);
        for &account in &borrowers {
            if !world.engine.is_liquidatable(account)? {
                continue;
            }
            let cover = Amount::new(world.engine.debt_of(account).raw() / 2);
            match world.engine.liquidate(keeper, account, WETH, cover) {
                Ok(_) => liquidations += 1,
                Err(_) => rejected += 1,
            }
        }
    }

    let totals = world.engine.system_totals()?;
    println!("  Price range: $1,500 to $2,050");
    println!("  Liquidations: {}, rejected: {}", liquidations, rejected);
    println!(
        "  Outstanding debt {}, collateral {}",
        show_stable(totals.total_debt),
        usd(totals.total_collateral_value)
    );
    println!("  Stable supply: {}", show_stable(world.stable.total_supply()));
    println!("  Events generated: {}\n", world.engine.events().len());
    Ok(())
}
