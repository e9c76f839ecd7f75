//! End-to-end engine tests: the full cycle pipeline through the public API.

use std::sync::Arc;

use fincycle_core::config::SimConfig;
use fincycle_core::domain::{
    AccountState, ExecStatus, PlannedAction, Portfolio, RiskProfile, StateSnapshot, TradeStatus,
};
use fincycle_core::engine::{compute_reward, CycleEngine};
use fincycle_core::signals::SignalConfig;
use fincycle_core::sink::MemorySink;
use fincycle_core::sizing::SizingPolicy;

fn engine_with_sink(seed: u64) -> (CycleEngine, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let engine = CycleEngine::with_sinks(SimConfig::seeded(seed), sink.clone(), sink.clone());
    (engine, sink)
}

#[test]
fn hundred_cycles_stay_structurally_sound() {
    let (mut engine, sink) = engine_with_sink(101);
    for _ in 0..100 {
        let output = engine.run_cycle();
        assert!(output.reward.is_finite());
        assert!(output.state.portfolio_value.is_finite());
        assert!(matches!(
            output.result.status,
            ExecStatus::Filled
                | ExecStatus::Noop
                | ExecStatus::Failed
                | ExecStatus::Saved
                | ExecStatus::Repaid
                | ExecStatus::Hold
        ));
        // Invest plans must carry a positive amount; passive plans must not.
        match output.plan.action {
            PlannedAction::Invest => assert!(output.plan.invest_amount > 0.0),
            _ => assert_eq!(output.plan.invest_amount, 0.0),
        }
    }
    assert_eq!(sink.cycles().len(), 100);
    assert_eq!(engine.account().nav_history.len(), 100);
}

#[test]
fn nav_history_is_marked_to_market() {
    let (mut engine, _sink) = engine_with_sink(102);
    for _ in 0..30 {
        engine.run_cycle();
    }
    let prices = engine.market().prices();
    let expected = engine.ledger().value(&prices);
    let last_nav = *engine.account().nav_history.last().unwrap();
    assert!((last_nav - expected).abs() < 1e-9);
}

#[test]
fn balance_conservation_over_run() {
    // Balance = initial + all income - all expenses - all investments -
    // all repayments. Repay amounts are part of the expense-tagged flows
    // only in the transaction log, so recompute from the plan stream.
    let (mut engine, sink) = engine_with_sink(103);
    for _ in 0..50 {
        engine.run_cycle();
    }
    let account = engine.account();
    let invested: f64 = account.sip_history.iter().sum::<f64>()
        + account.lumpsum_history.iter().sum::<f64>();
    let repaid: f64 = sink
        .cycles()
        .iter()
        .filter(|r| r.result.status == ExecStatus::Repaid)
        .map(|r| r.result.amount)
        .sum();
    let expected =
        account.initial_balance() + account.total_inflow() - account.total_outflow() - invested - repaid;
    assert!(
        (account.balance - expected).abs() < 1e-6,
        "balance {} != expected {expected}",
        account.balance
    );
}

#[test]
fn unknown_symbol_reads_fall_back_to_default() {
    let (engine, _sink) = engine_with_sink(104);
    let known = engine.market_metrics("INDEX");
    let unknown = engine.market_metrics("DOES_NOT_EXIST");
    assert_eq!(known.current_price, unknown.current_price);
    assert_eq!(known.history, unknown.history);
}

#[test]
fn reward_sign_matches_nav_credit_rule() {
    // NAV rose 50. An invested cycle takes the full +50; a passive cycle
    // takes 0.2 * 50 = +10.
    let nav = [1_000.0, 1_050.0];
    let invested = compute_reward(&nav, 50.0, true, 0.01, ExecStatus::Filled);
    assert!((invested - 50.05).abs() < 1e-9);
    let passive = compute_reward(&nav, 0.0, true, 0.01, ExecStatus::Hold);
    assert!((passive - 10.0).abs() < 1e-9);
}

#[test]
fn emergency_buffer_caps_contribution() {
    // cash 1000, buffer 900: the contribution can never exceed 100 no
    // matter how large the income-driven base is.
    let policy = SizingPolicy::new("INDEX", SignalConfig::default());
    let state = StateSnapshot {
        balance: 1_000.0,
        income_rate: 1_000_000.0,
        expense_rate: 300.0,
        volatility: 0.01,
        portfolio_value: 1_000.0,
        emergency_buffer: 900.0,
        emergency_buffer_ok: true,
        risk_profile: RiskProfile::Balanced,
        suggested_sip: 0.0,
    };
    let sip = policy.recurring_contribution(&state, &RiskProfile::Balanced.params());
    assert!(sip <= 100.0 + 1e-9, "got {sip}");
}

#[test]
fn ledger_round_trip_with_over_request() {
    // buy(sym, 100) at price 50 -> 2 units; sell requesting 1000 at price
    // 50 clamps to 100 cash, returns to 0 units, ledger cash += 100.
    let mut ledger = Portfolio::new(0.0);
    let buy = ledger.buy("INDEX", 100.0, 50.0);
    assert_eq!(buy.status, TradeStatus::Filled);
    assert_eq!(buy.units, 2.0);

    let sell = ledger.sell("INDEX", 1_000.0, 50.0);
    assert_eq!(sell.status, TradeStatus::Filled);
    assert_eq!(sell.amount, 100.0);
    assert_eq!(ledger.units("INDEX"), 0.0);
    assert_eq!(ledger.cash, 100.0);
}

#[test]
fn failed_buy_does_not_refund_debit() {
    // Documented limitation: execution debits the balance before the ledger
    // buy and performs no rollback when the buy fails. Accepted for the
    // simulated-money domain; this test pins the executor's debit-then-buy
    // sequence.
    let mut account = AccountState::new(10_000.0, 5_000.0, 3_000.0);
    let mut ledger = Portfolio::new(0.0);

    let debit = 100.0;
    account.balance -= debit;
    let trade = ledger.buy("INDEX", debit, 0.0); // non-positive price
    assert_eq!(trade.status, TradeStatus::Failed);

    // The cash is gone from the account and nowhere in the ledger.
    assert_eq!(account.balance, 9_900.0);
    assert!(ledger.positions.is_empty());
    assert_eq!(ledger.cash, 0.0);
}

#[test]
fn reset_then_rerun_produces_fresh_series() {
    let (mut engine, sink) = engine_with_sink(105);
    for _ in 0..10 {
        engine.run_cycle();
    }
    engine.reset();
    let output = engine.run_cycle();
    assert_eq!(output.cycle_id, 1);
    assert_eq!(engine.account().nav_history.len(), 1);
    assert_eq!(sink.cycles().len(), 1);
}

#[test]
fn entropy_seeded_engines_still_run() {
    // No seed injected: the walk is non-reproducible but must stay sound.
    let mut engine = CycleEngine::new(SimConfig::default());
    let output = engine.run_cycle();
    assert!(output.reward.is_finite());
    assert!(engine.market().history("INDEX").iter().all(|&p| p > 0.0));
}

#[test]
fn save_plan_when_buffer_breached_and_no_investment() {
    // Drain the balance below the buffer with a hostile config: enormous
    // expenses and no income make save/repay the only sensible plans once
    // the buffer is gone and the contribution hits zero.
    let config = SimConfig {
        initial_balance: 1_000.0,
        base_income: 0.0,
        base_expense: 4_000.0,
        seed: Some(106),
        ..SimConfig::default()
    };
    let mut engine = CycleEngine::new(config);
    let mut saw_passive = false;
    for _ in 0..10 {
        let output = engine.run_cycle();
        if !output.state.emergency_buffer_ok {
            assert_ne!(output.plan.action, PlannedAction::Invest);
            saw_passive = true;
        }
    }
    assert!(saw_passive, "buffer never breached under hostile config");
}
