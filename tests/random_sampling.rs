use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use casewise::datatype::Value;
use casewise::schema::Row;
use casewise::select::{select_random_sample, RandomSampleConfig};

fn rows(n: usize) -> Vec<Row> {
    (0..n).map(|i| vec![Value::Number(i as f64)]).collect()
}

fn distinct(selection: &[usize]) -> bool {
    selection.iter().collect::<HashSet<_>>().len() == selection.len()
}

#[test]
fn approximate_sample_size_is_rounded_percentage() {
    let data = rows(5);
    let config = RandomSampleConfig::Approximate { percentage: 50.0 };
    let mut rng = StdRng::seed_from_u64(7);
    let selection = select_random_sample(&data, &config, &mut rng);
    // round(0.5 * 5) = 3
    assert_eq!(selection.len(), 3);
    assert!(selection.iter().all(|&i| i < 5));
    assert!(distinct(&selection));
}

#[test]
fn approximate_sample_extremes() {
    let data = rows(10);
    let mut rng = StdRng::seed_from_u64(7);
    let none = select_random_sample(
        &data,
        &RandomSampleConfig::Approximate { percentage: 0.0 },
        &mut rng,
    );
    assert!(none.is_empty());
    let all = select_random_sample(
        &data,
        &RandomSampleConfig::Approximate { percentage: 100.0 },
        &mut rng,
    );
    assert_eq!(all.len(), 10);
    assert!(distinct(&all));
    // defensive bounds: an over-range percentage cannot select more rows
    // than exist
    let capped = select_random_sample(
        &data,
        &RandomSampleConfig::Approximate { percentage: 250.0 },
        &mut rng,
    );
    assert_eq!(capped.len(), 10);
}

#[test]
fn seeded_sampling_is_reproducible() {
    let data = rows(100);
    let config = RandomSampleConfig::Approximate { percentage: 25.0 };
    let mut first_rng = StdRng::seed_from_u64(42);
    let mut second_rng = StdRng::seed_from_u64(42);
    let first = select_random_sample(&data, &config, &mut first_rng);
    let second = select_random_sample(&data, &config, &mut second_rng);
    assert_eq!(first, second);
    assert_eq!(first.len(), 25);
}

#[test]
fn exact_sample_draws_from_the_leading_pool() {
    let data = rows(10);
    let config = RandomSampleConfig::Exact {
        exact_count: 2,
        from_first_count: Some(3),
    };
    let mut rng = StdRng::seed_from_u64(1);
    let selection = select_random_sample(&data, &config, &mut rng);
    assert_eq!(selection.len(), 2);
    assert!(selection.iter().all(|&i| i < 3));
    assert!(distinct(&selection));
}

#[test]
fn exact_sample_clamps_to_pool_size() {
    let data = rows(5);
    let config = RandomSampleConfig::Exact {
        exact_count: 99,
        from_first_count: Some(3),
    };
    let mut rng = StdRng::seed_from_u64(1);
    let selection = select_random_sample(&data, &config, &mut rng);
    assert_eq!(selection.len(), 3);
    assert!(selection.iter().all(|&i| i < 3));

    // with no leading bound the pool is the whole dataset
    let config = RandomSampleConfig::Exact {
        exact_count: 99,
        from_first_count: None,
    };
    let selection = select_random_sample(&data, &config, &mut rng);
    assert_eq!(selection.len(), 5);
    assert!(distinct(&selection));
}

#[test]
fn empty_dataset_yields_empty_sample() {
    let data = rows(0);
    let mut rng = StdRng::seed_from_u64(1);
    for config in [
        RandomSampleConfig::Approximate { percentage: 50.0 },
        RandomSampleConfig::Exact {
            exact_count: 3,
            from_first_count: None,
        },
    ] {
        assert!(select_random_sample(&data, &config, &mut rng).is_empty());
    }
}
