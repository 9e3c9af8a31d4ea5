mod common;

use common::*;
use phrasetrader::domain::ast_builder::compile_dsl;
use phrasetrader::domain::backtest::run_backtest;
use phrasetrader::domain::indicator::sma::calculate_sma;
use phrasetrader::domain::indicator::IndicatorKind;
use phrasetrader::domain::rule::{CompareOp, IndicatorCall, LogicOp, Operand, PriceField, Rule};
use phrasetrader::domain::rule_eval::{compile, Signals};
use phrasetrader::domain::strategy::Strategy as TradingStrategy;
use proptest::prelude::*;

fn field() -> impl Strategy<Value = PriceField> {
    prop::sample::select(PriceField::ALL.to_vec())
}

fn operand() -> impl Strategy<Value = Operand> {
    prop_oneof![
        (-1.0e6f64..1.0e6).prop_map(Operand::Value),
        field().prop_map(Operand::Series),
        (field(), 1usize..30).prop_map(|(field, period)| Operand::Indicator(IndicatorCall {
            kind: IndicatorKind::Sma,
            field,
            period,
        })),
    ]
}

fn compare_op() -> impl Strategy<Value = CompareOp> {
    prop::sample::select(vec![
        CompareOp::Gt,
        CompareOp::Lt,
        CompareOp::Gte,
        CompareOp::Lte,
        CompareOp::Eq,
        CompareOp::Neq,
    ])
}

fn rule() -> impl Strategy<Value = Rule> {
    let leaf = (compare_op(), operand(), operand())
        .prop_map(|(op, left, right)| Rule::Comparison { op, left, right });
    leaf.prop_recursive(4, 16, 2, |inner| {
        (
            prop::sample::select(vec![LogicOp::And, LogicOp::Or]),
            inner.clone(),
            inner,
        )
            .prop_map(|(op, left, right)| Rule::BinaryLogic {
                op,
                left: Box::new(left),
                right: Box::new(right),
            })
    })
}

fn bars() -> impl Strategy<Value = Vec<OhlcvBar>> {
    prop::collection::vec(1.0f64..1000.0, 1..60).prop_map(|closes| closes_to_bars(&closes))
}

fn bars_and_signals() -> impl Strategy<Value = (Vec<OhlcvBar>, Signals)> {
    bars().prop_flat_map(|bars| {
        let n = bars.len();
        (
            Just(bars),
            prop::collection::vec(any::<bool>(), n),
            prop::collection::vec(any::<bool>(), n),
        )
            .prop_map(|(bars, entry, exit)| (bars, Signals { entry, exit }))
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn canonical_text_parses_back_to_same_tree(entry in rule(), exit in rule()) {
        let strategy = TradingStrategy { entry, exit };
        let reparsed = compile_dsl(&strategy.to_string()).unwrap();
        prop_assert_eq!(reparsed, strategy);
    }

    #[test]
    fn signals_align_with_series(entry in rule(), exit in rule(), bars in bars()) {
        let signals = compile(&TradingStrategy { entry, exit }).unwrap().evaluate(&bars);
        prop_assert_eq!(signals.entry.len(), bars.len());
        prop_assert_eq!(signals.exit.len(), bars.len());
    }

    #[test]
    fn warmup_bars_never_signal(period in 1usize..20, op in compare_op(), bars in bars()) {
        let strategy = TradingStrategy::entry_only(Rule::Comparison {
            op,
            left: Operand::Series(PriceField::Close),
            right: Operand::Indicator(IndicatorCall {
                kind: IndicatorKind::Sma,
                field: PriceField::Close,
                period,
            }),
        });
        let signals = compile(&strategy).unwrap().evaluate(&bars);
        for i in 0..bars.len().min(period - 1) {
            prop_assert!(!signals.entry[i]);
        }
        prop_assert!(signals.exit.iter().all(|&s| !s));
    }

    #[test]
    fn rolling_sma_matches_direct_mean(
        closes in prop::collection::vec(1.0f64..1000.0, 1..120),
        period in 1usize..40,
    ) {
        let bars = closes_to_bars(&closes);
        let series = calculate_sma(&bars, PriceField::Close, period);
        prop_assert_eq!(series.values.len(), closes.len());
        for (i, point) in series.values.iter().enumerate() {
            if i + 1 < period {
                prop_assert!(!point.valid);
            } else {
                let direct = closes[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
                prop_assert!(point.valid);
                prop_assert!((point.value - direct).abs() <= 1e-9 * direct.max(1.0));
            }
        }
    }

    #[test]
    fn trades_are_ordered_and_disjoint((bars, signals) in bars_and_signals()) {
        let report = run_backtest(&bars, &signals).unwrap();
        prop_assert_eq!(report.trade_count, report.trades.len());
        for trade in &report.trades {
            prop_assert!(trade.entry_date < trade.exit_date);
        }
        for pair in report.trades.windows(2) {
            prop_assert!(pair[0].entry_date < pair[1].entry_date);
            prop_assert!(pair[0].exit_date <= pair[1].entry_date);
        }
        if let (Some(open), Some(last)) = (&report.open_position, report.trades.last()) {
            prop_assert!(last.exit_date <= open.entry_date);
        }
    }

    #[test]
    fn drawdown_is_non_negative_and_zero_iff_never_below_peak((bars, signals) in bars_and_signals()) {
        let report = run_backtest(&bars, &signals).unwrap();
        prop_assert!(report.max_drawdown >= 0.0);

        let mut peak = f64::MIN;
        let mut dipped = false;
        for &equity in &report.equity_curve {
            peak = peak.max(equity);
            dipped |= equity < peak;
        }
        prop_assert_eq!(report.max_drawdown == 0.0, !dipped);
    }

    #[test]
    fn equity_curve_has_start_plus_one_per_bar((bars, signals) in bars_and_signals()) {
        let report = run_backtest(&bars, &signals).unwrap();
        prop_assert_eq!(report.equity_curve.len(), bars.len() + 1);
        prop_assert!((report.equity_curve[0] - 1.0).abs() < f64::EPSILON);
        prop_assert!((report.total_return - (report.final_equity() - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn rerun_is_identical((bars, signals) in bars_and_signals()) {
        let a = serde_json::to_string(&run_backtest(&bars, &signals).unwrap()).unwrap();
        let b = serde_json::to_string(&run_backtest(&bars, &signals).unwrap()).unwrap();
        prop_assert_eq!(a, b);
    }
}
