//! Windowing engine: applies decomposition and the rate solver over asset
//! partitions, cumulative calendar periods, and rolling time cuts.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use log::debug;
use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::constants::{DECIMAL_PRECISION, PORTFOLIO_TOTAL_ID};
use crate::ledger::{
    classify_transaction, LedgerFilter, LedgerRepositoryTrait, Transaction, TransactionRole,
};
use crate::portfolio::decomposition::{decompose, Decomposition};
use crate::portfolio::performance::growth_calculator::annualized_growth;
use crate::portfolio::performance::mwr_calculator::money_weighted_rate;
use crate::portfolio::performance::performance_model::{
    AssetPerformance, EvolutionPoint, GrowthPeriod, GrowthSummary, MetricsConfig,
    PeriodGrain, PeriodPerformance, PortfolioSummary, RateOutcome, RollingPoint,
};
use crate::Result;

pub trait PerformanceServiceTrait: Send + Sync {
    fn portfolio_summary(&self, filter: &LedgerFilter) -> Result<PortfolioSummary>;
    fn asset_performance(&self, filter: &LedgerFilter) -> Result<Vec<AssetPerformance>>;
    fn period_performance(
        &self,
        filter: &LedgerFilter,
        grain: PeriodGrain,
    ) -> Result<Vec<PeriodPerformance>>;
    fn rolling_returns(&self, filter: &LedgerFilter) -> Result<Vec<RollingPoint>>;
    fn capital_evolution(&self, filter: &LedgerFilter) -> Result<Vec<EvolutionPoint>>;
    fn growth_summary(&self, filter: &LedgerFilter) -> Result<Option<GrowthSummary>>;
}

pub struct PortfolioPerformanceService {
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    config: MetricsConfig,
}

impl PortfolioPerformanceService {
    pub fn new(
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        config: MetricsConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(PortfolioPerformanceService {
            ledger_repository,
            config,
        })
    }

    /// Loads the ledger snapshot, applies the caller's filter, and orders
    /// the result by timestamp. Every window computation starts here.
    fn snapshot(&self, filter: &LedgerFilter) -> Result<Vec<Transaction>> {
        let transactions = self.ledger_repository.get_transactions()?;
        let mut selected = filter.apply(&transactions)?;
        selected.sort_by_key(|tx| tx.timestamp);
        Ok(selected)
    }

    /// Headline aggregate plus the return quartet for one transaction set.
    fn summarize(&self, transactions: &[Transaction]) -> PortfolioSummary {
        let decomposition = decompose(transactions);
        let threshold = self.config.min_contribution;

        let money_weighted_rate_pct = match transactions.last() {
            Some(last) => money_weighted_rate(
                transactions,
                decomposition.current_value,
                last.effective_date(),
                &self.config.solver,
            ),
            None => RateOutcome::Undefined,
        }
        .to_percent();
        let value_growth_pct = RateOutcome::from_value_growth(
            decomposition.net_contribution,
            decomposition.current_value,
            threshold,
        )
        .to_percent();
        let realized_over_gross_pct = RateOutcome::from_guarded_ratio(
            decomposition.realized_gain,
            decomposition.gross_contribution,
            threshold,
        )
        .to_percent();
        let realized_over_net_pct = RateOutcome::from_guarded_ratio(
            decomposition.realized_gain,
            decomposition.net_contribution,
            threshold,
        )
        .to_percent();
        let net_gain_over_gross_pct = RateOutcome::from_guarded_ratio(
            decomposition.net_gain,
            decomposition.gross_contribution,
            threshold,
        )
        .to_percent();

        PortfolioSummary {
            decomposition: decomposition.round(),
            money_weighted_rate_pct,
            value_growth_pct,
            realized_over_gross_pct,
            realized_over_net_pct,
            net_gain_over_gross_pct,
        }
    }

    /// One per-asset output row. Used both for real assets and for the
    /// synthetic whole-portfolio total row.
    fn asset_row(
        &self,
        asset_id: &str,
        transactions: &[Transaction],
        names: &HashMap<String, String>,
    ) -> AssetPerformance {
        let decomposition = decompose(transactions);
        let threshold = self.config.min_contribution;

        let last_activity = transactions.last().map(|tx| tx.effective_date());
        let money_weighted_rate_pct = match last_activity {
            Some(cutoff) => money_weighted_rate(
                transactions,
                decomposition.current_value,
                cutoff,
                &self.config.solver,
            ),
            None => RateOutcome::Undefined,
        }
        .to_percent();
        let gain_return_pct = RateOutcome::from_guarded_ratio(
            decomposition.net_gain,
            decomposition.net_contribution,
            threshold,
        )
        .to_percent();
        let value_growth_pct = RateOutcome::from_value_growth(
            decomposition.net_contribution,
            decomposition.current_value,
            threshold,
        )
        .to_percent();
        let contribution_count = transactions
            .iter()
            .filter(|tx| classify_transaction(tx) == TransactionRole::ContributionPrincipal)
            .count() as u32;

        AssetPerformance {
            asset_id: asset_id.to_string(),
            name: names.get(asset_id).cloned(),
            decomposition: decomposition.round(),
            money_weighted_rate_pct,
            gain_return_pct,
            value_growth_pct,
            contribution_count,
            first_activity: transactions.first().map(|tx| tx.effective_date()),
            last_activity,
        }
    }

    /// Growth with the minimum-contribution guard applied to the base.
    fn guarded_growth(
        &self,
        start_value: Decimal,
        end_value: Decimal,
        periods: u32,
    ) -> RateOutcome {
        if start_value > Decimal::ZERO && start_value <= self.config.min_contribution {
            return RateOutcome::Undefined;
        }
        annualized_growth(start_value, end_value, periods)
    }
}

impl PerformanceServiceTrait for PortfolioPerformanceService {
    fn portfolio_summary(&self, filter: &LedgerFilter) -> Result<PortfolioSummary> {
        debug!("Computing portfolio summary");
        let transactions = self.snapshot(filter)?;
        Ok(self.summarize(&transactions))
    }

    fn asset_performance(&self, filter: &LedgerFilter) -> Result<Vec<AssetPerformance>> {
        debug!("Computing per-asset performance");
        let transactions = self.snapshot(filter)?;
        if transactions.is_empty() {
            return Ok(Vec::new());
        }

        let names: HashMap<String, String> = self
            .ledger_repository
            .get_assets()?
            .into_iter()
            .map(|asset| (asset.id, asset.name))
            .collect();

        let mut partitions: BTreeMap<String, Vec<Transaction>> = BTreeMap::new();
        for tx in &transactions {
            partitions
                .entry(tx.asset_id.clone())
                .or_default()
                .push(tx.clone());
        }
        let partitions: Vec<(String, Vec<Transaction>)> = partitions.into_iter().collect();

        let mut rows: Vec<AssetPerformance> = partitions
            .par_iter()
            .map(|(asset_id, asset_txs)| self.asset_row(asset_id, asset_txs, &names))
            .collect();
        rows.sort_by(|a, b| {
            b.decomposition
                .net_contribution
                .cmp(&a.decomposition.net_contribution)
        });
        rows.push(self.asset_row(PORTFOLIO_TOTAL_ID, &transactions, &names));

        Ok(rows)
    }

    fn period_performance(
        &self,
        filter: &LedgerFilter,
        grain: PeriodGrain,
    ) -> Result<Vec<PeriodPerformance>> {
        debug!("Computing per-period performance");
        let transactions = self.snapshot(filter)?;
        if transactions.is_empty() {
            return Ok(Vec::new());
        }

        // One entry per period present in the ledger, keyed so that the
        // BTreeMap order is chronological.
        let mut periods: BTreeMap<String, NaiveDate> = BTreeMap::new();
        for tx in &transactions {
            let (key, end) = period_bounds(tx, grain);
            periods.insert(key, end);
        }

        let threshold = self.config.min_contribution;
        let rows = periods
            .into_iter()
            .map(|(period, period_end)| {
                // The snapshot is timestamp-sorted, so the cumulative
                // window through a period end is a prefix.
                let cut = transactions.partition_point(|tx| tx.effective_date() <= period_end);
                let window = &transactions[..cut];
                let decomposition = decompose(window);

                let gain_return_pct = RateOutcome::from_guarded_ratio(
                    decomposition.net_gain,
                    decomposition.net_contribution,
                    threshold,
                )
                .to_percent();
                let money_weighted_rate_pct = money_weighted_rate(
                    window,
                    decomposition.current_value,
                    period_end,
                    &self.config.solver,
                )
                .to_percent();

                PeriodPerformance {
                    period,
                    period_end,
                    decomposition: decomposition.round(),
                    gain_return_pct,
                    money_weighted_rate_pct,
                }
            })
            .collect();

        Ok(rows)
    }

    fn rolling_returns(&self, filter: &LedgerFilter) -> Result<Vec<RollingPoint>> {
        debug!("Computing rolling return curve");
        let transactions = self.snapshot(filter)?;
        let (first, last) = match (transactions.first(), transactions.last()) {
            (Some(first), Some(last)) => (first.effective_date(), last.effective_date()),
            _ => return Ok(Vec::new()),
        };

        // Strictly ascending cut dates at the configured cadence; the
        // ledger's last date always closes the curve.
        let mut cuts = Vec::new();
        let mut cut = first;
        while cut < last {
            cuts.push(cut);
            cut += Duration::days(self.config.cadence.days());
        }
        cuts.push(last);

        let points = cuts
            .par_iter()
            .map(|&cut| {
                let end = transactions.partition_point(|tx| tx.effective_date() <= cut);
                let window = &transactions[..end];
                let decomposition = decompose(window);

                RollingPoint {
                    date: cut,
                    money_weighted_rate_pct: money_weighted_rate(
                        window,
                        decomposition.current_value,
                        cut,
                        &self.config.solver,
                    )
                    .to_percent(),
                    net_contribution: decomposition.net_contribution.round_dp(DECIMAL_PRECISION),
                    current_value: decomposition.current_value.round_dp(DECIMAL_PRECISION),
                }
            })
            .collect();

        Ok(points)
    }

    fn capital_evolution(&self, filter: &LedgerFilter) -> Result<Vec<EvolutionPoint>> {
        debug!("Computing capital evolution series");
        let transactions = self.snapshot(filter)?;
        if transactions.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_date: BTreeMap<NaiveDate, Vec<Transaction>> = BTreeMap::new();
        for tx in transactions {
            by_date.entry(tx.effective_date()).or_default().push(tx);
        }

        let mut running = Decomposition::default();
        let mut points = Vec::with_capacity(by_date.len());
        for (date, batch) in by_date {
            running.accumulate(&decompose(&batch));
            points.push(EvolutionPoint {
                date,
                net_contribution: running.net_contribution.round_dp(DECIMAL_PRECISION),
                current_value: running.current_value.round_dp(DECIMAL_PRECISION),
                net_gain: running.net_gain.round_dp(DECIMAL_PRECISION),
            });
        }

        Ok(points)
    }

    fn growth_summary(&self, filter: &LedgerFilter) -> Result<Option<GrowthSummary>> {
        debug!("Computing compound growth summary");
        let transactions = self.snapshot(filter)?;
        let (first_date, last_date) = match (transactions.first(), transactions.last()) {
            (Some(first), Some(last)) => (first.effective_date(), last.effective_date()),
            _ => return Ok(None),
        };
        let first_year = first_date.year();

        let years_present: BTreeSet<i32> = transactions
            .iter()
            .map(|tx| tx.effective_date().year())
            .collect();

        let mut by_year = Vec::with_capacity(years_present.len());
        for year in years_present {
            let year_end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(last_date);
            let cut = transactions.partition_point(|tx| tx.effective_date() <= year_end);
            let decomposition = decompose(&transactions[..cut]);
            let periods = (year - first_year + 1) as u32;
            // Year rows measure growth as if every gain stayed in the
            // portfolio, so the end value re-adds realized results.
            let end_value = decomposition.net_contribution + decomposition.net_gain;

            by_year.push(GrowthPeriod {
                period: year.to_string(),
                years: periods,
                net_contribution: decomposition.net_contribution.round_dp(DECIMAL_PRECISION),
                net_gain: decomposition.net_gain.round_dp(DECIMAL_PRECISION),
                end_value: end_value.round_dp(DECIMAL_PRECISION),
                annualized_growth_pct: self
                    .guarded_growth(decomposition.net_contribution, end_value, periods)
                    .to_percent(),
            });
        }

        let decomposition = decompose(&transactions);
        let periods = (last_date.year() - first_year + 1) as u32;
        let overall = GrowthPeriod {
            period: PORTFOLIO_TOTAL_ID.to_string(),
            years: periods,
            net_contribution: decomposition.net_contribution.round_dp(DECIMAL_PRECISION),
            net_gain: decomposition.net_gain.round_dp(DECIMAL_PRECISION),
            end_value: decomposition.current_value.round_dp(DECIMAL_PRECISION),
            annualized_growth_pct: self
                .guarded_growth(
                    decomposition.net_contribution,
                    decomposition.current_value,
                    periods,
                )
                .to_percent(),
        };

        Ok(Some(GrowthSummary { by_year, overall }))
    }
}

/// Period key and inclusive end date for one transaction under a grain.
fn period_bounds(tx: &Transaction, grain: PeriodGrain) -> (String, NaiveDate) {
    let date = tx.effective_date();
    match grain {
        PeriodGrain::Year => (
            tx.year_key(),
            NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date),
        ),
        PeriodGrain::Month => {
            let (next_year, next_month) = if date.month() == 12 {
                (date.year() + 1, 1)
            } else {
                (date.year(), date.month() + 1)
            };
            let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
                .and_then(|first_of_next| first_of_next.pred_opt())
                .unwrap_or(date);
            (tx.month_key(), end)
        }
    }
}
