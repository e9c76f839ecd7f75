//! The cycle engine — one full decision tick per `run_cycle` call.
//!
//! Eight phases per cycle, strictly sequential, no branching back:
//! 1. Advance market: step every instrument once
//! 2. Synthesize cash-flow: draw income and expense, apply to the balance
//! 3. Observe: snapshot merged account + market state
//! 4. Plan: map the sizing decision to invest / save / repay / hold
//! 5. Execute: move cash and convert currency to units
//! 6. Update valuation: append NAV
//! 7. Score reward
//! 8. Record: append the immutable cycle record
//!
//! `run_cycle` takes `&mut self`, so cycles are serialized by ownership —
//! there is no window where a second cycle can interleave with the mutation
//! phases. Read-only queries take `&self` and may run concurrently with each
//! other. `run_cycle` never panics and never returns `Err`; every failure
//! mode folds into a status field or the degraded-persistence marker.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::config::SimConfig;
use crate::domain::{
    AccountState, ContributionMode, CycleOutput, CyclePlan, CycleRecord, ExecStatus,
    ExecutionResult, PlannedAction, Portfolio, RiskProfile, StateSnapshot, TradeStatus,
    Transaction, TransactionCategory, TransactionKind,
};
use crate::engine::reward::compute_reward;
use crate::engine::views::{MarketView, PortfolioSummary};
use crate::market::{MarketMetrics, MarketProcess};
use crate::rng::SeedBank;
use crate::sink::{CycleSink, MemorySink, TransactionSink};
use crate::sizing::SizingPolicy;

/// Relative standard deviations of the cash-flow draws.
const INCOME_STD_FRACTION: f64 = 0.3;
const EXPENSE_STD_FRACTION: f64 = 0.2;

/// Owns all mutable simulation state and drives the per-cycle pipeline.
pub struct CycleEngine {
    config: SimConfig,
    account: AccountState,
    ledger: Portfolio,
    market: MarketProcess,
    sizing: SizingPolicy,
    cashflow_rng: StdRng,
    tx_sink: Arc<dyn TransactionSink>,
    cycle_sink: Arc<dyn CycleSink>,
    cycle_count: u64,
}

impl CycleEngine {
    /// Engine with in-memory sinks. Keep your own `Arc<MemorySink>` and use
    /// [`CycleEngine::with_sinks`] if you need to read records back.
    pub fn new(config: SimConfig) -> Self {
        let sink = Arc::new(MemorySink::new());
        Self::with_sinks(config, sink.clone(), sink)
    }

    /// Engine with explicit persistence collaborators.
    pub fn with_sinks(
        config: SimConfig,
        tx_sink: Arc<dyn TransactionSink>,
        cycle_sink: Arc<dyn CycleSink>,
    ) -> Self {
        let seeds = SeedBank::from_option(config.seed);
        let market = MarketProcess::new(&config.market, seeds.stream("market"));
        let sizing = SizingPolicy::new(&config.target_symbol, config.signal.clone());
        let account = AccountState::new(config.initial_balance, config.base_income, config.base_expense);

        Self {
            config,
            account,
            ledger: Portfolio::new(0.0),
            market,
            sizing,
            cashflow_rng: seeds.stream("cashflow"),
            tx_sink,
            cycle_sink,
            cycle_count: 0,
        }
    }

    /// Run one full cycle and return its record-shaped output.
    pub fn run_cycle(&mut self) -> CycleOutput {
        let timestamp = Utc::now();
        self.cycle_count += 1;
        let mut sink_errors: Vec<String> = Vec::new();

        // 1. Market moves.
        self.market.advance();

        // 2. Income and expenses land on the balance.
        self.synthesize_cashflow(timestamp, &mut sink_errors);

        // 3. Observe the updated state.
        let state = self.observe();
        self.account.last_suggested_sip = state.suggested_sip;

        // 4. Plan the action.
        let plan = self.plan(&state);

        // 5. Execute it.
        let result = self.execute(&plan, timestamp, &mut sink_errors);
        self.account.last_invest_amount = match plan.action {
            PlannedAction::Invest => result.amount,
            _ => 0.0,
        };

        // 6. Mark holdings to market.
        self.update_valuation();

        // 7. Score.
        let reward = compute_reward(
            &self.account.nav_history,
            self.account.last_invest_amount,
            state.emergency_buffer_ok,
            state.volatility,
            result.status,
        );

        // 8. Record.
        let record = CycleRecord {
            cycle_id: self.cycle_count,
            timestamp,
            state: state.clone(),
            plan: plan.clone(),
            result: result.clone(),
            reward,
        };
        if let Err(err) = self.cycle_sink.record(&record) {
            sink_errors.push(err.to_string());
        }

        CycleOutput {
            cycle_id: self.cycle_count,
            timestamp,
            state,
            plan,
            result,
            reward,
            persistence_error: if sink_errors.is_empty() {
                None
            } else {
                Some(sink_errors.join("; "))
            },
        }
    }

    /// Snapshot the merged account + market state without mutating anything.
    pub fn state_snapshot(&self) -> StateSnapshot {
        self.observe()
    }

    /// Aggregate portfolio view for presentation layers.
    pub fn portfolio_summary(&self) -> PortfolioSummary {
        let prices = self.market.prices();
        let cash = self.account.balance;
        let total_value = cash + self.ledger.value(&prices);
        let invested_amount = self.account.invested_amount;
        let absolute_pnl = total_value - invested_amount;
        let pnl_pct = if invested_amount > 0.0 {
            absolute_pnl / invested_amount * 100.0
        } else {
            0.0
        };
        let nav = &self.account.nav_history;
        let cycle_pnl = if nav.len() >= 2 {
            nav[nav.len() - 1] - nav[nav.len() - 2]
        } else {
            0.0
        };

        PortfolioSummary {
            cash,
            positions: self.ledger.positions.clone(),
            total_value,
            invested_amount,
            absolute_pnl,
            pnl_pct,
            cycle_pnl,
            suggested_sip: self.account.last_suggested_sip,
            total_inflow: self.account.total_inflow(),
            total_outflow: self.account.total_outflow(),
        }
    }

    /// Market metrics for one instrument (default instrument on unknowns).
    pub fn market_metrics(&self, symbol: &str) -> MarketMetrics {
        self.market.metrics(symbol)
    }

    /// Metrics plus all account series, for charting.
    pub fn market_view(&self, symbol: &str) -> MarketView {
        MarketView {
            symbol: symbol.to_string(),
            metrics: self.market.metrics(symbol),
            nav_history: self.account.nav_history.clone(),
            sip_history: self.account.sip_history.clone(),
            lumpsum_history: self.account.lumpsum_history.clone(),
            income_history: self.account.income_history.clone(),
            expense_history: self.account.expense_history.clone(),
            balance_history: self.account.balance_history.clone(),
        }
    }

    /// Reset account, ledger, cycle counter, and sink contents to initial
    /// values. The market's accumulated history deliberately survives.
    /// Sink truncation is best-effort: a sink that cannot reset is left
    /// as-is rather than failing the reset.
    pub fn reset(&mut self) {
        self.account.reset();
        self.ledger = Portfolio::new(0.0);
        self.cycle_count = 0;
        let _ = self.tx_sink.reset();
        let _ = self.cycle_sink.reset();
    }

    /// Adjust an instrument's walk volatility (clamped into the market's
    /// safety band). Unknown symbols resolve to the default instrument.
    pub fn set_market_volatility(&mut self, symbol: &str, sigma: f64) {
        self.market.set_volatility(symbol, sigma);
    }

    pub fn account(&self) -> &AccountState {
        &self.account
    }

    pub fn ledger(&self) -> &Portfolio {
        &self.ledger
    }

    pub fn market(&self) -> &MarketProcess {
        &self.market
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    // ─── Cycle phases ────────────────────────────────────────────────────

    fn synthesize_cashflow(&mut self, timestamp: DateTime<Utc>, sink_errors: &mut Vec<String>) {
        let income = self.draw_flow(self.account.base_income, INCOME_STD_FRACTION);
        let expense = self.draw_flow(self.account.base_expense, EXPENSE_STD_FRACTION);

        self.account.balance += income;
        self.account.income_history.push(income);
        self.log_transaction(
            timestamp,
            TransactionKind::Income,
            TransactionCategory::Income,
            income,
            "unstable income",
            sink_errors,
        );

        self.account.balance -= expense;
        self.account.expense_history.push(expense);
        self.log_transaction(
            timestamp,
            TransactionKind::Expense,
            TransactionCategory::Expense,
            expense,
            "variable expense",
            sink_errors,
        );

        self.account.balance_history.push(self.account.balance);
    }

    /// Gaussian draw around `mean` with a relative std, floored at zero.
    fn draw_flow(&mut self, mean: f64, std_fraction: f64) -> f64 {
        let z: f64 = self.cashflow_rng.sample(StandardNormal);
        (mean + std_fraction * mean * z).max(0.0)
    }

    fn observe(&self) -> StateSnapshot {
        let metrics = self.market.metrics(self.sizing.symbol());
        let holdings = self.ledger.value(&self.market.prices());
        let balance = self.account.balance;
        let income_rate = self.account.last_income();
        let expense_rate = self.account.last_expense();
        let emergency_buffer = if expense_rate > 0.0 {
            self.config.emergency_buffer_factor * expense_rate
        } else {
            0.0
        };

        let mut snapshot = StateSnapshot {
            balance,
            income_rate,
            expense_rate,
            volatility: metrics.volatility,
            portfolio_value: balance + holdings,
            emergency_buffer,
            emergency_buffer_ok: balance >= emergency_buffer,
            risk_profile: RiskProfile::from_volatility(metrics.volatility),
            suggested_sip: 0.0,
        };
        snapshot.suggested_sip = self.sizing.evaluate(&snapshot, &self.market).suggested_sip;
        snapshot
    }

    fn plan(&self, state: &StateSnapshot) -> CyclePlan {
        let decision = self.sizing.evaluate(state, &self.market);

        let (action, invest_amount) = if decision.should_invest {
            (PlannedAction::Invest, decision.amount)
        } else if !state.emergency_buffer_ok {
            (PlannedAction::Save, 0.0)
        } else if state.expense_rate > state.income_rate {
            (PlannedAction::Repay, 0.0)
        } else {
            (PlannedAction::Hold, 0.0)
        };

        CyclePlan {
            action,
            invest_amount,
            mode: decision.mode,
            symbol: decision.symbol,
            signal: decision.signal,
            confidence: decision.confidence,
            suggested_sip: decision.suggested_sip,
        }
    }

    fn execute(
        &mut self,
        plan: &CyclePlan,
        timestamp: DateTime<Utc>,
        sink_errors: &mut Vec<String>,
    ) -> ExecutionResult {
        match plan.action {
            PlannedAction::Invest => {
                self.apply_investment(timestamp, plan.mode, &plan.symbol, plan.invest_amount, sink_errors)
            }
            PlannedAction::Repay => {
                let amount = plan.invest_amount.max(0.0);
                self.account.balance -= amount;
                self.log_transaction(
                    timestamp,
                    TransactionKind::Repay,
                    TransactionCategory::Expense,
                    amount,
                    "debt repayment",
                    sink_errors,
                );
                self.account.balance_history.push(self.account.balance);
                ExecutionResult {
                    status: ExecStatus::Repaid,
                    amount,
                    trade: None,
                }
            }
            PlannedAction::Save => ExecutionResult::passive(ExecStatus::Saved),
            PlannedAction::Hold => ExecutionResult::passive(ExecStatus::Hold),
        }
    }

    /// Move cash from the balance into ledger units.
    ///
    /// Not transactional: the balance is debited before the ledger buy, and
    /// a failed buy does not refund the debit. Accepted for simulated money;
    /// pinned by the engine integration tests.
    fn apply_investment(
        &mut self,
        timestamp: DateTime<Utc>,
        mode: ContributionMode,
        symbol: &str,
        amount: f64,
        sink_errors: &mut Vec<String>,
    ) -> ExecutionResult {
        let invest = amount.min(self.account.balance);
        if invest <= 0.0 {
            self.account.sip_history.push(0.0);
            self.account.lumpsum_history.push(0.0);
            return ExecutionResult {
                status: ExecStatus::Noop,
                amount: 0.0,
                trade: None,
            };
        }

        self.account.balance -= invest;
        match mode {
            ContributionMode::Sip => {
                self.account.sip_history.push(invest);
                self.account.lumpsum_history.push(0.0);
                self.log_transaction(
                    timestamp,
                    TransactionKind::Sip,
                    TransactionCategory::Invest,
                    invest,
                    "SIP investment",
                    sink_errors,
                );
            }
            ContributionMode::LumpSum => {
                self.account.sip_history.push(0.0);
                self.account.lumpsum_history.push(invest);
                self.log_transaction(
                    timestamp,
                    TransactionKind::LumpSum,
                    TransactionCategory::Invest,
                    invest,
                    "lump-sum investment",
                    sink_errors,
                );
            }
        }

        let price = self.market.price(symbol);
        let trade = self.ledger.buy(symbol, invest, price);
        self.log_transaction(
            timestamp,
            TransactionKind::PortfolioBuy,
            TransactionCategory::Portfolio,
            invest,
            &format!("portfolio buy {symbol}"),
            sink_errors,
        );

        self.account.balance_history.push(self.account.balance);
        self.account.invested_amount += invest;

        let status = match trade.status {
            TradeStatus::Filled => ExecStatus::Filled,
            TradeStatus::Noop => ExecStatus::Noop,
            TradeStatus::Failed => ExecStatus::Failed,
        };
        ExecutionResult {
            status,
            amount: invest,
            trade: Some(trade),
        }
    }

    fn update_valuation(&mut self) -> f64 {
        let nav = self.ledger.value(&self.market.prices());
        self.account.nav_history.push(nav);
        nav
    }

    fn log_transaction(
        &mut self,
        timestamp: DateTime<Utc>,
        kind: TransactionKind,
        category: TransactionCategory,
        amount: f64,
        description: &str,
        sink_errors: &mut Vec<String>,
    ) {
        let tx = Transaction {
            timestamp,
            kind,
            category,
            amount,
            description: description.to_string(),
            balance_after: self.account.balance,
        };
        if let Err(err) = self.tx_sink.append(&tx) {
            sink_errors.push(err.to_string());
        }
    }
}
