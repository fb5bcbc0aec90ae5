//! Integration tests: many irregular series -> parallel extraction -> feature table.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use chronotrend_extract::{
    Calculator, ExtractionConfig, GroupId, SignalName, SignalSeries, compare_trends,
};
use chronotrend_trend::{Sample, TimeUnit, TimedSeries, TrendAttr, compute_index_trend, compute_time_trend};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn origin() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// `n_groups` groups, each with `temperature` and `humidity` series of 1..12
/// irregular samples, supplied in shuffled order.
fn random_dataset(rng: &mut ChaCha8Rng, n_groups: usize) -> Vec<SignalSeries> {
    let mut out = Vec::new();
    for g in 0..n_groups {
        for signal in ["temperature", "humidity"] {
            let n = rng.gen_range(1..12);
            let mut t = origin();
            let mut samples = Vec::with_capacity(n);
            for _ in 0..n {
                t += TimeDelta::minutes(rng.gen_range(1..600));
                samples.push(Sample::new(t, rng.gen_range(-10.0..40.0)));
            }
            samples.shuffle(rng);
            out.push(
                SignalSeries::from_unsorted(
                    GroupId::new(format!("g{g:04}")).unwrap(),
                    SignalName::new(signal).unwrap(),
                    samples,
                )
                .unwrap(),
            );
        }
    }
    out
}

fn column(signal: &str, calculator: Calculator, attr: TrendAttr) -> String {
    format!("{signal}__{}__attr_\"{attr}\"", calculator.name())
}

#[test]
fn parallel_table_matches_direct_estimator_calls() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let dataset = random_dataset(&mut rng, 200);
    let config = ExtractionConfig::new(Calculator::ALL.to_vec()).unwrap();
    let table = config.fit(&dataset).unwrap();

    assert_eq!(table.n_groups(), 200);
    // 2 signals x (length + mean + 5 + 5)
    assert_eq!(table.n_columns(), 24);

    for s in &dataset {
        let samples: Vec<Sample> = s.series.samples().collect();
        let group = s.group.as_str();
        let signal = s.signal.as_str();

        let length = table.get(group, &format!("{signal}__length")).unwrap();
        assert_eq!(length, Some(samples.len() as f64));

        let timewise = compute_time_trend(&samples);
        let ordinal = compute_index_trend(s.series.values());
        for attr in TrendAttr::ALL {
            let tw_cell = table
                .get(group, &column(signal, Calculator::LinearTrendTimewise, attr))
                .unwrap();
            let ord_cell = table
                .get(group, &column(signal, Calculator::LinearTrend, attr))
                .unwrap();
            assert_eq!(tw_cell, timewise.as_ref().ok().map(|r| r.get(attr)), "{group}/{signal}/{attr}");
            assert_eq!(ord_cell, ordinal.as_ref().ok().map(|r| r.get(attr)), "{group}/{signal}/{attr}");
        }
    }
}

#[test]
fn extraction_is_deterministic_across_thread_counts() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let dataset = random_dataset(&mut rng, 64);
    let config = ExtractionConfig::new(vec![Calculator::LinearTrendTimewise]).unwrap();

    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| config.fit(&dataset).unwrap());
    let many = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap()
        .install(|| config.fit(&dataset).unwrap());
    assert_eq!(single, many);
}

#[test]
fn notebook_scenario_two_groups() {
    let ts = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
    let make = |group: &str, rows: &[(&str, f64)]| {
        SignalSeries::from_unsorted(
            GroupId::new(group).unwrap(),
            SignalName::new("temperature").unwrap(),
            rows.iter().map(|&(t, v)| Sample::new(ts(t), v)).collect(),
        )
        .unwrap()
    };
    let dataset = vec![
        make("a", &[("2019-03-01 10:04:00", 1.0), ("2019-03-01 10:50:00", 2.0)]),
        make("b", &[("2019-03-02 23:54:00", 3.0), ("2019-03-03 08:55:00", 4.0)]),
    ];

    let table = ExtractionConfig::new(vec![Calculator::LinearTrendTimewise, Calculator::LinearTrend])
        .unwrap()
        .fit(&dataset)
        .unwrap();

    let slope_tw = column("temperature", Calculator::LinearTrendTimewise, TrendAttr::Slope);
    let slope_ord = column("temperature", Calculator::LinearTrend, TrendAttr::Slope);
    let a_tw = table.get("a", &slope_tw).unwrap().unwrap();
    let b_tw = table.get("b", &slope_tw).unwrap().unwrap();
    assert!((a_tw - 1.304348).abs() < 1e-6);
    // 9h01m between the two samples of group b
    assert!((b_tw - 60.0 / 541.0).abs() < 1e-9);
    assert_eq!(table.get("a", &slope_ord), Some(Some(1.0)));
    assert_eq!(table.get("b", &slope_ord), Some(Some(1.0)));

    let intercept_tw = column("temperature", Calculator::LinearTrendTimewise, TrendAttr::Intercept);
    assert!((table.get("b", &intercept_tw).unwrap().unwrap() - 3.0).abs() < 1e-12);
}

#[test]
fn comparison_matches_extraction() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let dataset = random_dataset(&mut rng, 20);
    let comparisons = compare_trends(&dataset, TimeUnit::Hours);
    assert_eq!(comparisons.len(), dataset.len());
    for (c, s) in comparisons.iter().zip(&dataset) {
        assert_eq!(c.group, s.group);
        assert_eq!(c.n_samples, s.series.len());
        let direct = chronotrend_trend::TimeTrend::new().fit(&s.series);
        assert_eq!(c.timewise, direct);
    }
}

#[test]
fn equal_timestamps_in_one_group_are_undefined() {
    let t = origin();
    let s = SignalSeries {
        group: GroupId::new("flat").unwrap(),
        signal: SignalName::new("temperature").unwrap(),
        series: TimedSeries::new(vec![t, t, t], vec![1.0, 2.0, 3.0]).unwrap(),
    };
    let table = ExtractionConfig::new(vec![Calculator::LinearTrendTimewise, Calculator::LinearTrend])
        .unwrap()
        .fit(&[s])
        .unwrap();
    let tw = column("temperature", Calculator::LinearTrendTimewise, TrendAttr::Slope);
    let ord = column("temperature", Calculator::LinearTrend, TrendAttr::Slope);
    assert_eq!(table.get("flat", &tw), Some(None));
    assert_eq!(table.get("flat", &ord), Some(Some(1.0)));
}
