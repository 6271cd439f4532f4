use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rand::rngs::StdRng;
use rand::SeedableRng;

use casewise::condition::Evaluator;
use casewise::datatype::Value;
use casewise::schema::{Measure, Row, Schema, Variable, VariableType};
use casewise::select::{
    select_by_condition, select_by_range, select_random_sample, RandomSampleConfig, RangeConfig,
};

fn schema() -> Schema {
    Schema::new(vec![
        Variable::new("age", 0, VariableType::Numeric, Measure::Scale),
        Variable::new("gender", 1, VariableType::Text, Measure::Nominal),
        Variable::new("income", 2, VariableType::Numeric, Measure::Scale),
    ])
    .unwrap()
}

fn rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            vec![
                Value::Number((18 + i % 60) as f64),
                Value::from(if i % 2 == 0 { "M" } else { "F" }),
                Value::Number((i % 5000) as f64),
            ]
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let schema = schema();
    let evaluator = Evaluator::new(&schema);
    let row = vec![Value::Number(30.0), Value::from("M"), Value::Number(900.0)];

    c.bench_function("evaluate simple", |b| {
        b.iter(|| evaluator.evaluate(black_box("age > 25"), &row))
    });
    c.bench_function("evaluate compound", |b| {
        b.iter(|| {
            evaluator.evaluate(
                black_box("age > 25 & gender == \"M\" | income / 2 > 400"),
                &row,
            )
        })
    });
    c.bench_function("evaluate with function", |b| {
        b.iter(|| evaluator.evaluate(black_box("SQRT(age) > 5 & MEAN(age, income) > 100"), &row))
    });

    for n in [1_000usize, 100_000] {
        let data = rows(n);
        c.bench_function(&format!("select_by_condition {n}"), |b| {
            b.iter(|| select_by_condition(&data, &schema, black_box("age > 40")))
        });
        c.bench_function(&format!("select_random_sample {n}"), |b| {
            let config = RandomSampleConfig::Approximate { percentage: 10.0 };
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(42);
                select_random_sample(&data, &config, &mut rng)
            })
        });
        c.bench_function(&format!("select_by_range {n}"), |b| {
            let range = RangeConfig {
                first_case: Some(String::from("10")),
                last_case: Some(String::from("500")),
            };
            b.iter(|| select_by_range(&data, &range))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
