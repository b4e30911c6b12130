#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    use crate::constants::PORTFOLIO_TOTAL_ID;
    use crate::errors::{Error, Result as AppResult, ValidationError};
    use crate::ledger::{
        Asset, LedgerFilter, LedgerRepositoryTrait, Transaction, OPERATION_KIND_CONTRIBUTION,
        OPERATION_KIND_REALIZED_RESULT, OPERATION_KIND_UNREALIZED_RESULT,
        OPERATION_KIND_WITHDRAWAL,
    };
    use crate::portfolio::performance::{
        CutCadence, MetricsConfig, PeriodGrain, PerformanceServiceTrait,
        PortfolioPerformanceService, RateOutcome, SolverConfig,
    };

    // ==================== MOCKS AND FIXTURES ====================

    struct StubLedger {
        transactions: Vec<Transaction>,
        assets: Vec<Asset>,
    }

    impl LedgerRepositoryTrait for StubLedger {
        fn get_transactions(&self) -> AppResult<Vec<Transaction>> {
            Ok(self.transactions.clone())
        }

        fn get_assets(&self) -> AppResult<Vec<Asset>> {
            Ok(self.assets.clone())
        }
    }

    struct FailingLedger;

    impl LedgerRepositoryTrait for FailingLedger {
        fn get_transactions(&self) -> AppResult<Vec<Transaction>> {
            Err(Error::repository("ledger store offline"))
        }

        fn get_assets(&self) -> AppResult<Vec<Asset>> {
            Err(Error::repository("ledger store offline"))
        }
    }

    fn create_test_transaction(
        year: i32,
        month: u32,
        day: u32,
        asset_id: &str,
        kind: &str,
        subtype: Option<&str>,
        amount: Decimal,
    ) -> Transaction {
        Transaction {
            timestamp: Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap(),
            asset_id: asset_id.to_string(),
            amount,
            original_amount: amount,
            currency: "USD".to_string(),
            fx_rate: None,
            kind: kind.to_string(),
            subtype: subtype.map(|s| s.to_string()),
            owner: "ana".to_string(),
            participation: Decimal::ONE,
        }
    }

    fn create_test_assets() -> Vec<Asset> {
        vec![
            Asset {
                id: "FUND-A".to_string(),
                name: "Fund Alpha".to_string(),
                tags: vec!["equity".to_string()],
            },
            Asset {
                id: "FUND-B".to_string(),
                name: "Fund Beta".to_string(),
                tags: Vec::new(),
            },
        ]
    }

    /// Two assets over two calendar years:
    /// FUND-A: 1000 purchased, 50 realized, 100 unrealized appreciation.
    /// FUND-B: 500 purchased, 200 withdrawn, 50 unrealized depreciation.
    fn sample_ledger() -> Vec<Transaction> {
        vec![
            create_test_transaction(
                2023,
                1,
                1,
                "FUND-A",
                OPERATION_KIND_CONTRIBUTION,
                Some("purchase"),
                dec!(1000),
            ),
            create_test_transaction(
                2023,
                1,
                1,
                "FUND-B",
                OPERATION_KIND_CONTRIBUTION,
                Some("purchase"),
                dec!(500),
            ),
            create_test_transaction(
                2023,
                6,
                1,
                "FUND-B",
                OPERATION_KIND_WITHDRAWAL,
                Some("withdrawal"),
                dec!(-200),
            ),
            create_test_transaction(
                2023,
                7,
                1,
                "FUND-A",
                OPERATION_KIND_REALIZED_RESULT,
                None,
                dec!(50),
            ),
            create_test_transaction(
                2024,
                1,
                1,
                "FUND-A",
                OPERATION_KIND_UNREALIZED_RESULT,
                Some("appreciation"),
                dec!(100),
            ),
            create_test_transaction(
                2024,
                1,
                1,
                "FUND-B",
                OPERATION_KIND_UNREALIZED_RESULT,
                Some("depreciation"),
                dec!(-50),
            ),
        ]
    }

    fn build_service(transactions: Vec<Transaction>) -> PortfolioPerformanceService {
        build_service_with(MetricsConfig::default(), transactions)
    }

    fn build_service_with(
        config: MetricsConfig,
        transactions: Vec<Transaction>,
    ) -> PortfolioPerformanceService {
        PortfolioPerformanceService::new(
            Arc::new(StubLedger {
                transactions,
                assets: create_test_assets(),
            }),
            config,
        )
        .unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn rate_of(outcome: &RateOutcome) -> Decimal {
        outcome.as_decimal().unwrap()
    }

    // ==================== PORTFOLIO SUMMARY TESTS ====================

    #[test]
    fn test_summary_decomposition() {
        let service = build_service(sample_ledger());

        let summary = service.portfolio_summary(&LedgerFilter::default()).unwrap();

        let d = &summary.decomposition;
        assert_eq!(d.gross_contribution, dec!(1300));
        assert_eq!(d.net_reinvestment, dec!(0));
        assert_eq!(d.net_contribution, dec!(1300));
        assert_eq!(d.realized_gain, dec!(50));
        assert_eq!(d.unrealized_gain, dec!(50));
        assert_eq!(d.net_gain, dec!(100));
        assert_eq!(d.current_value, dec!(1350));
        assert_eq!(d.fees, dec!(0));
        assert_eq!(d.unclassified_count, 0);
    }

    #[test]
    fn test_summary_return_percentages() {
        let service = build_service(sample_ledger());

        let summary = service.portfolio_summary(&LedgerFilter::default()).unwrap();

        // 50 / 1300 and 100 / 1300, in percentage points.
        assert_eq!(rate_of(&summary.value_growth_pct), dec!(3.846154));
        assert_eq!(rate_of(&summary.realized_over_gross_pct), dec!(3.846154));
        assert_eq!(rate_of(&summary.realized_over_net_pct), dec!(3.846154));
        assert_eq!(rate_of(&summary.net_gain_over_gross_pct), dec!(7.692308));

        let mwr = rate_of(&summary.money_weighted_rate_pct);
        assert!(mwr > dec!(3) && mwr < dec!(4), "unexpected rate {}", mwr);
    }

    #[test]
    fn test_summary_single_asset_rate() {
        // -1000 at day 0, value 1100 one year later: 10% money-weighted.
        let transactions = vec![
            create_test_transaction(
                2023,
                1,
                1,
                "FUND-A",
                OPERATION_KIND_CONTRIBUTION,
                Some("purchase"),
                dec!(1000),
            ),
            create_test_transaction(
                2024,
                1,
                1,
                "FUND-A",
                OPERATION_KIND_UNREALIZED_RESULT,
                Some("appreciation"),
                dec!(100),
            ),
        ];
        let service = build_service(transactions);

        let summary = service.portfolio_summary(&LedgerFilter::default()).unwrap();

        let mwr = rate_of(&summary.money_weighted_rate_pct);
        assert!((mwr - dec!(10)).abs() < dec!(0.01), "unexpected rate {}", mwr);
    }

    #[test]
    fn test_summary_empty_ledger() {
        let service = build_service(Vec::new());

        let summary = service.portfolio_summary(&LedgerFilter::default()).unwrap();

        assert_eq!(summary.decomposition.net_contribution, dec!(0));
        assert_eq!(summary.decomposition.current_value, dec!(0));
        assert_eq!(summary.money_weighted_rate_pct, RateOutcome::Undefined);
        assert_eq!(summary.realized_over_gross_pct, RateOutcome::Undefined);
        assert_eq!(summary.realized_over_net_pct, RateOutcome::Undefined);
        assert_eq!(summary.net_gain_over_gross_pct, RateOutcome::Undefined);
        // Zero contributed with zero (non-negative) value is the unbounded
        // case, not a zero rate.
        assert_eq!(summary.value_growth_pct, RateOutcome::Unbounded);
    }

    #[test]
    fn test_summary_below_threshold_is_undefined() {
        let transactions = vec![
            create_test_transaction(
                2023,
                1,
                1,
                "FUND-A",
                OPERATION_KIND_CONTRIBUTION,
                Some("purchase"),
                dec!(50),
            ),
            create_test_transaction(
                2023,
                6,
                1,
                "FUND-A",
                OPERATION_KIND_UNREALIZED_RESULT,
                Some("appreciation"),
                dec!(10),
            ),
        ];
        let service = build_service(transactions);

        let summary = service.portfolio_summary(&LedgerFilter::default()).unwrap();

        assert_eq!(summary.value_growth_pct, RateOutcome::Undefined);
        assert_eq!(summary.net_gain_over_gross_pct, RateOutcome::Undefined);
        // The solver is not threshold-guarded; only ratio percentages are.
        assert!(summary.money_weighted_rate_pct.is_defined());
    }

    #[test]
    fn test_summary_zero_contribution_with_value_is_unbounded() {
        let transactions = vec![
            create_test_transaction(
                2023,
                1,
                1,
                "FUND-A",
                OPERATION_KIND_CONTRIBUTION,
                Some("purchase"),
                dec!(100),
            ),
            create_test_transaction(
                2023,
                6,
                1,
                "FUND-A",
                OPERATION_KIND_WITHDRAWAL,
                Some("withdrawal"),
                dec!(-100),
            ),
            create_test_transaction(
                2023,
                9,
                1,
                "FUND-A",
                OPERATION_KIND_UNREALIZED_RESULT,
                Some("appreciation"),
                dec!(50),
            ),
        ];
        let service = build_service(transactions);

        let summary = service.portfolio_summary(&LedgerFilter::default()).unwrap();

        assert_eq!(summary.value_growth_pct, RateOutcome::Unbounded);
        assert_eq!(summary.net_gain_over_gross_pct, RateOutcome::Undefined);
    }

    #[test]
    fn test_summary_respects_asset_filter() {
        let service = build_service(sample_ledger());
        let filter = LedgerFilter {
            asset_ids: Some(vec!["FUND-A".to_string()]),
            ..LedgerFilter::default()
        };

        let summary = service.portfolio_summary(&filter).unwrap();

        assert_eq!(summary.decomposition.net_contribution, dec!(1000));
        assert_eq!(summary.decomposition.current_value, dec!(1100));
    }

    // ==================== PER-ASSET TESTS ====================

    #[test]
    fn test_asset_rows_sorted_with_total_last() {
        let service = build_service(sample_ledger());

        let rows = service.asset_performance(&LedgerFilter::default()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].asset_id, "FUND-A");
        assert_eq!(rows[1].asset_id, "FUND-B");
        assert_eq!(rows[2].asset_id, PORTFOLIO_TOTAL_ID);
        assert_eq!(rows[0].name, Some("Fund Alpha".to_string()));
        assert_eq!(rows[1].name, Some("Fund Beta".to_string()));
        assert_eq!(rows[2].name, None);
    }

    #[test]
    fn test_asset_row_values() {
        let service = build_service(sample_ledger());

        let rows = service.asset_performance(&LedgerFilter::default()).unwrap();

        let fund_a = &rows[0];
        assert_eq!(fund_a.decomposition.net_contribution, dec!(1000));
        assert_eq!(fund_a.decomposition.net_gain, dec!(150));
        assert_eq!(fund_a.decomposition.current_value, dec!(1100));
        assert_eq!(fund_a.gain_return_pct, RateOutcome::Rate(dec!(15)));
        assert_eq!(fund_a.value_growth_pct, RateOutcome::Rate(dec!(10)));
        assert_eq!(fund_a.contribution_count, 1);
        assert_eq!(fund_a.first_activity, Some(date(2023, 1, 1)));
        assert_eq!(fund_a.last_activity, Some(date(2024, 1, 1)));

        let mwr_a = rate_of(&fund_a.money_weighted_rate_pct);
        assert!((mwr_a - dec!(10)).abs() < dec!(0.01), "unexpected rate {}", mwr_a);

        let fund_b = &rows[1];
        assert_eq!(fund_b.decomposition.net_contribution, dec!(300));
        assert_eq!(fund_b.decomposition.current_value, dec!(250));
        let mwr_b = rate_of(&fund_b.money_weighted_rate_pct);
        assert!(mwr_b < dec!(0), "loss-making asset should have a negative rate");
    }

    #[test]
    fn test_asset_rows_reconcile_to_total() {
        let service = build_service(sample_ledger());

        let rows = service.asset_performance(&LedgerFilter::default()).unwrap();

        let total = &rows[rows.len() - 1];
        let net: Decimal = rows[..rows.len() - 1]
            .iter()
            .map(|r| r.decomposition.net_contribution)
            .sum();
        let gain: Decimal = rows[..rows.len() - 1]
            .iter()
            .map(|r| r.decomposition.net_gain)
            .sum();
        let value: Decimal = rows[..rows.len() - 1]
            .iter()
            .map(|r| r.decomposition.current_value)
            .sum();

        assert_eq!(net, total.decomposition.net_contribution);
        assert_eq!(gain, total.decomposition.net_gain);
        assert_eq!(value, total.decomposition.current_value);
        assert_eq!(total.contribution_count, 2);
    }

    #[test]
    fn test_asset_performance_empty_ledger() {
        let service = build_service(Vec::new());

        let rows = service.asset_performance(&LedgerFilter::default()).unwrap();

        assert!(rows.is_empty());
    }

    // ==================== PER-PERIOD TESTS ====================

    #[test]
    fn test_yearly_periods_are_cumulative() {
        let service = build_service(sample_ledger());

        let rows = service
            .period_performance(&LedgerFilter::default(), PeriodGrain::Year)
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period, "2023");
        assert_eq!(rows[0].period_end, date(2023, 12, 31));
        assert_eq!(rows[1].period, "2024");
        assert_eq!(rows[1].period_end, date(2024, 12, 31));

        // Through 2023: contributions and the realized result only.
        assert_eq!(rows[0].decomposition.net_contribution, dec!(1300));
        assert_eq!(rows[0].decomposition.net_gain, dec!(50));
        assert_eq!(rate_of(&rows[0].gain_return_pct), dec!(3.846154));

        // Through 2024: everything.
        assert_eq!(rows[1].decomposition.net_contribution, dec!(1300));
        assert_eq!(rows[1].decomposition.net_gain, dec!(100));
        assert_eq!(rate_of(&rows[1].gain_return_pct), dec!(7.692308));
    }

    #[test]
    fn test_monthly_periods() {
        let service = build_service(sample_ledger());

        let rows = service
            .period_performance(&LedgerFilter::default(), PeriodGrain::Month)
            .unwrap();

        let keys: Vec<&str> = rows.iter().map(|r| r.period.as_str()).collect();
        assert_eq!(keys, vec!["2023-01", "2023-06", "2023-07", "2024-01"]);
        assert_eq!(rows[0].period_end, date(2023, 1, 31));
        assert_eq!(rows[3].period_end, date(2024, 1, 31));

        // January holds both purchases; June is cumulative, not an
        // isolated bucket holding only the withdrawal.
        assert_eq!(rows[0].decomposition.net_contribution, dec!(1500));
        assert_eq!(rows[1].decomposition.net_contribution, dec!(1300));
    }

    #[test]
    fn test_period_performance_empty_ledger() {
        let service = build_service(Vec::new());

        let rows = service
            .period_performance(&LedgerFilter::default(), PeriodGrain::Month)
            .unwrap();

        assert!(rows.is_empty());
    }

    // ==================== ROLLING CURVE TESTS ====================

    #[test]
    fn test_rolling_curve_shape() {
        let service = build_service(sample_ledger());

        let points = service.rolling_returns(&LedgerFilter::default()).unwrap();

        // Weekly cuts across 2023-01-01..2024-01-01 plus the closing date.
        assert_eq!(points.len(), 54);
        assert_eq!(points[0].date, date(2023, 1, 1));
        assert_eq!(points[points.len() - 1].date, date(2024, 1, 1));
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));

        // The final cut sees the whole ledger.
        let last = &points[points.len() - 1];
        assert_eq!(last.net_contribution, dec!(1300));
        assert_eq!(last.current_value, dec!(1350));
    }

    #[test]
    fn test_rolling_first_cut_is_undefined() {
        let service = build_service(sample_ledger());

        let points = service.rolling_returns(&LedgerFilter::default()).unwrap();

        // At the first cut every flow sits on the cutoff itself, so the
        // NPV derivative vanishes and no rate is defensible.
        assert_eq!(points[0].money_weighted_rate_pct, RateOutcome::Undefined);
        assert_eq!(points[0].net_contribution, dec!(1500));
    }

    #[test]
    fn test_rolling_cuts_keep_accumulated_flows() {
        let transactions = vec![
            create_test_transaction(
                2023,
                1,
                1,
                "FUND-A",
                OPERATION_KIND_CONTRIBUTION,
                Some("purchase"),
                dec!(1000),
            ),
            create_test_transaction(
                2023,
                1,
                11,
                "FUND-A",
                OPERATION_KIND_CONTRIBUTION,
                Some("purchase"),
                dec!(500),
            ),
        ];
        let config = MetricsConfig {
            cadence: CutCadence::Daily,
            ..MetricsConfig::default()
        };
        let service = build_service_with(config, transactions);

        let points = service.rolling_returns(&LedgerFilter::default()).unwrap();

        // Ten daily cuts before the second purchase, then the close.
        assert_eq!(points.len(), 11);
        assert!(points[..10].iter().all(|p| p.net_contribution == dec!(1000)));
        assert_eq!(points[10].net_contribution, dec!(1500));
    }

    #[test]
    fn test_rolling_returns_empty_ledger() {
        let service = build_service(Vec::new());

        let points = service.rolling_returns(&LedgerFilter::default()).unwrap();

        assert!(points.is_empty());
    }

    // ==================== CAPITAL EVOLUTION TESTS ====================

    #[test]
    fn test_capital_evolution_series() {
        let service = build_service(sample_ledger());

        let points = service.capital_evolution(&LedgerFilter::default()).unwrap();

        assert_eq!(points.len(), 4);

        assert_eq!(points[0].date, date(2023, 1, 1));
        assert_eq!(points[0].net_contribution, dec!(1500));
        assert_eq!(points[0].net_gain, dec!(0));
        assert_eq!(points[0].current_value, dec!(1500));

        assert_eq!(points[1].date, date(2023, 6, 1));
        assert_eq!(points[1].net_contribution, dec!(1300));
        assert_eq!(points[1].current_value, dec!(1300));

        assert_eq!(points[2].date, date(2023, 7, 1));
        assert_eq!(points[2].net_gain, dec!(50));
        // Realized gains do not move the carried value.
        assert_eq!(points[2].current_value, dec!(1300));

        assert_eq!(points[3].date, date(2024, 1, 1));
        assert_eq!(points[3].net_gain, dec!(100));
        assert_eq!(points[3].current_value, dec!(1350));
    }

    #[test]
    fn test_capital_evolution_empty_ledger() {
        let service = build_service(Vec::new());

        let points = service.capital_evolution(&LedgerFilter::default()).unwrap();

        assert!(points.is_empty());
    }

    // ==================== GROWTH SUMMARY TESTS ====================

    #[test]
    fn test_growth_summary_rows() {
        let service = build_service(sample_ledger());

        let summary = service
            .growth_summary(&LedgerFilter::default())
            .unwrap()
            .unwrap();

        assert_eq!(summary.by_year.len(), 2);

        let first = &summary.by_year[0];
        assert_eq!(first.period, "2023");
        assert_eq!(first.years, 1);
        assert_eq!(first.net_contribution, dec!(1300));
        assert_eq!(first.net_gain, dec!(50));
        assert_eq!(first.end_value, dec!(1350));
        let growth = rate_of(&first.annualized_growth_pct);
        assert!((growth - dec!(3.846154)).abs() < dec!(0.000001));

        let second = &summary.by_year[1];
        assert_eq!(second.period, "2024");
        assert_eq!(second.years, 2);
        assert_eq!(second.end_value, dec!(1400));
        // (1400/1300)^(1/2) - 1, about 3.775% per year.
        let growth = rate_of(&second.annualized_growth_pct);
        assert!((growth - dec!(3.7749)).abs() < dec!(0.001));
    }

    #[test]
    fn test_growth_summary_overall_row() {
        let service = build_service(sample_ledger());

        let summary = service
            .growth_summary(&LedgerFilter::default())
            .unwrap()
            .unwrap();

        let overall = &summary.overall;
        assert_eq!(overall.period, PORTFOLIO_TOTAL_ID);
        assert_eq!(overall.years, 2);
        assert_eq!(overall.net_contribution, dec!(1300));
        // The overall row measures against the marked-to-market value,
        // not the as-if-retained 1400.
        assert_eq!(overall.end_value, dec!(1350));
        let growth = rate_of(&overall.annualized_growth_pct);
        assert!((growth - dec!(1.9049)).abs() < dec!(0.001));
    }

    #[test]
    fn test_growth_summary_below_threshold() {
        let config = MetricsConfig {
            min_contribution: dec!(2000),
            ..MetricsConfig::default()
        };
        let service = build_service_with(config, sample_ledger());

        let summary = service
            .growth_summary(&LedgerFilter::default())
            .unwrap()
            .unwrap();

        assert!(summary
            .by_year
            .iter()
            .all(|row| row.annualized_growth_pct == RateOutcome::Undefined));
        assert_eq!(summary.overall.annualized_growth_pct, RateOutcome::Undefined);
    }

    #[test]
    fn test_growth_summary_empty_ledger() {
        let service = build_service(Vec::new());

        assert!(service.growth_summary(&LedgerFilter::default()).unwrap().is_none());
    }

    // ==================== CONFIGURATION AND ERROR TESTS ====================

    #[test]
    fn test_invalid_solver_config_rejected() {
        let config = MetricsConfig {
            solver: SolverConfig {
                max_iterations: 0,
                ..SolverConfig::default()
            },
            ..MetricsConfig::default()
        };

        let result = PortfolioPerformanceService::new(
            Arc::new(StubLedger {
                transactions: Vec::new(),
                assets: Vec::new(),
            }),
            config,
        );

        assert!(matches!(
            result.err(),
            Some(Error::Validation(ValidationError::InvalidConfiguration(_)))
        ));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let config = MetricsConfig {
            min_contribution: dec!(-1),
            ..MetricsConfig::default()
        };

        let result = PortfolioPerformanceService::new(
            Arc::new(StubLedger {
                transactions: Vec::new(),
                assets: Vec::new(),
            }),
            config,
        );

        assert!(matches!(
            result.err(),
            Some(Error::Validation(ValidationError::InvalidConfiguration(_)))
        ));
    }

    #[test]
    fn test_repository_error_propagates() {
        let service =
            PortfolioPerformanceService::new(Arc::new(FailingLedger), MetricsConfig::default())
                .unwrap();

        let result = service.portfolio_summary(&LedgerFilter::default());
        assert!(matches!(result.err(), Some(Error::Repository(_))));

        let result = service.asset_performance(&LedgerFilter::default());
        assert!(matches!(result.err(), Some(Error::Repository(_))));
    }

    #[test]
    fn test_inverted_filter_range_rejected() {
        let service = build_service(sample_ledger());
        let filter = LedgerFilter {
            start: Some(date(2024, 1, 1)),
            end: Some(date(2023, 1, 1)),
            ..LedgerFilter::default()
        };

        let result = service.portfolio_summary(&filter);

        assert!(matches!(
            result.err(),
            Some(Error::Validation(ValidationError::InvalidDateRange { .. }))
        ));
    }
}
