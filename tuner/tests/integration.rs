//! End-to-end scenarios exercising the full request/report loop through [`Tuner`].

use std::collections::HashMap;

use ordered_float::OrderedFloat;

use tuner::abort::{Evaluations, Speedup, Window};
use tuner::technique::Exhaustive;
use tuner::{Config, Constraint, Cost, CostError, IndexTechnique, Parameter, Range, Technique, Tuner, Value};

fn int_param(name: &str, values: &[i64]) -> Parameter {
    Parameter::new(name, Range::set(values.iter().map(|&v| Value::Int(v))))
}

#[test]
fn unconstrained_exhaustive_finds_best() {
    let params = vec![int_param("P1", &[1, 2]), int_param("P2", &[10, 20])];
    let mut tuner = Tuner::new(params, Technique::from(Exhaustive::new()), "exhaustive", Config::default())
        .unwrap();

    let data = tuner
        .tune(
            &mut |config| {
                let p1 = config.get("P1").unwrap().as_int().unwrap();
                let p2 = config.get("P2").unwrap().as_int().unwrap();
                Ok(OrderedFloat((p1 + p2) as f64))
            },
            None,
        )
        .unwrap();

    assert_eq!(data.search_space_size(), 4);
    assert_eq!(data.num_evaluated(), 4);
    assert_eq!(data.best_cost(), Some(OrderedFloat(11.0)));
    let best = data.best_configuration().unwrap();
    assert_eq!(best.get("P1").unwrap().as_int(), Some(1));
    assert_eq!(best.get("P2").unwrap().as_int(), Some(10));
}

/// Scenario 2: `N = 12`, `WPT` divides `N`, `LS` divides `N / WPT`. The number of valid
/// `(WPT, LS)` pairs is `sum_{d | 12} tau(12 / d) = 28`.
#[test]
fn simple_interdependency_matches_divisor_count() {
    const N: i64 = 12;
    let wpt = Parameter::new("WPT", Range::interval(1, N, 1));
    let ls = Parameter::with_constraint(
        "LS",
        Range::interval(1, N, 1),
        Constraint::new(["WPT"], |b| {
            let wpt = b.get("WPT").unwrap().as_int().unwrap();
            let ls = b.get("LS").unwrap().as_int().unwrap();
            N % wpt == 0 && (N / wpt) % ls == 0
        }),
    );

    let mut brute_force = 0u64;
    for w in 1..=N {
        if N % w != 0 {
            continue;
        }
        for l in 1..=N {
            if (N / w) % l == 0 {
                brute_force += 1;
            }
        }
    }
    assert_eq!(brute_force, 28);

    let mut tuner = Tuner::new(
        vec![wpt, ls],
        Technique::from(Exhaustive::new()),
        "exhaustive",
        Config::default(),
    )
    .unwrap();
    assert_eq!(tuner.search_space().size(), brute_force);

    let data = tuner.tune(&mut |_config| Ok(OrderedFloat(0.0)), None).unwrap();
    assert_eq!(data.num_evaluated(), brute_force);
}

/// Scenario 4: some configurations are reported invalid; the invalid count matches, and
/// best-so-far is the minimum over only the valid ones.
#[test]
fn invalid_configurations_are_tracked_and_excluded_from_best() {
    let params = vec![int_param("x", &[1, 2, 3, 4, 5, 6])];
    let mut tuner = Tuner::new(params, Technique::from(Exhaustive::new()), "exhaustive", Config::default())
        .unwrap();

    let data = tuner
        .tune(
            &mut |config| {
                let x = config.get("x").unwrap().as_int().unwrap();
                if x % 2 == 0 {
                    Err(CostError::InvalidConfiguration)
                } else {
                    Ok(OrderedFloat(x as f64))
                }
            },
            None,
        )
        .unwrap();

    assert_eq!(data.num_evaluated(), 6);
    assert_eq!(data.num_invalid(), 3);
    assert_eq!(data.num_valid(), 3);
    assert_eq!(data.best_cost(), Some(OrderedFloat(1.0)));
}

/// Scenario 5: `Evaluations(10)` over a `|SP| = 100` space stops after exactly 10 distinct
/// configurations, marking the run terminated early.
#[test]
fn evaluations_abort_stops_at_exact_count() {
    let params = vec![int_param("x", &(0..100).collect::<Vec<_>>())];
    let mut tuner = Tuner::new(params, Technique::from(Exhaustive::new()), "exhaustive", Config::default())
        .unwrap();
    assert_eq!(tuner.search_space().size(), 100);

    let mut abort = Evaluations(10);
    let data = tuner
        .tune(&mut |_config| Ok(OrderedFloat(0.0)), Some(&mut abort))
        .unwrap();

    assert_eq!(data.num_evaluated(), 10);
    assert!(data.terminated_early());
}

/// Scenario 6: a constant cost function never improves on its first recorded cost, so
/// `Speedup(2.0, Evaluations(5))` must fire within a handful of evaluations after that first one.
#[test]
fn speedup_stall_aborts_quickly_on_constant_cost() {
    let params = vec![int_param("x", &(0..100).collect::<Vec<_>>())];
    let mut tuner = Tuner::new(params, Technique::from(Exhaustive::new()), "exhaustive", Config::default())
        .unwrap();

    let mut abort = Speedup::new(2.0, Window::Evaluations(5));
    let data = tuner
        .tune(&mut |_config| Ok(OrderedFloat(1.0)), Some(&mut abort))
        .unwrap();

    assert!(data.terminated_early());
    assert!(data.num_evaluated() <= 6, "expected a stall abort within a handful of evaluations, got {}", data.num_evaluated());
}

/// A fixed schedule of proposals, to exercise repeated proposals of the same index without
/// depending on any particular technique's exploration order.
#[derive(Default)]
struct Scripted {
    schedule: Vec<Vec<u64>>,
    cursor: usize,
}

impl IndexTechnique for Scripted {
    fn initialize(&mut self, _size: u64) {}

    fn get_next_indices(&mut self) -> Vec<u64> {
        let batch = self.schedule.get(self.cursor).cloned().unwrap_or_default();
        self.cursor += 1;
        batch
    }

    fn report_costs(&mut self, _costs: HashMap<u64, Cost>) {}
}

/// Previously-invalid configurations are retried when re-proposed, not permanently skipped;
/// previously-valid ones are served from the cache rather than re-invoking the cost function.
#[test]
fn repeated_proposals_retry_invalid_but_cache_valid() {
    let params = vec![int_param("x", &[1, 2])];
    let technique = Scripted {
        schedule: vec![vec![0, 1], vec![0, 1]],
        cursor: 0,
    };
    let mut tuner = Tuner::new(
        params,
        Technique::Index(Box::new(technique)),
        "scripted",
        Config::default(),
    )
    .unwrap();

    let mut call_counts: HashMap<i64, u32> = HashMap::new();
    let mut abort = Evaluations(10);
    tuner
        .tune(
            &mut |config| {
                let x = config.get("x").unwrap().as_int().unwrap();
                let count = call_counts.entry(x).or_insert(0);
                *count += 1;
                if x == 2 && *count == 1 {
                    Err(CostError::InvalidConfiguration)
                } else {
                    Ok(OrderedFloat(x as f64))
                }
            },
            Some(&mut abort),
        )
        .unwrap();

    // x=1 came back valid on the first pass, so the second pass's proposal is served from cache.
    assert_eq!(call_counts[&1], 1);
    // x=2 came back invalid on the first pass, so it's re-evaluated on the second.
    assert_eq!(call_counts[&2], 2);
}
