use criterion::{criterion_group, criterion_main, Criterion};
use legfit::{statistics::BasisSize, CurveFit, Polynomial};
use std::hint::black_box;

fn gen_sample_data(n: f64) -> Vec<(f64, f64)> {
    let count = n as usize;
    (1..=count)
        .map(|i| {
            let x = i as f64;
            (x, 1.0 + 3.0 * x + 5.3 * x * x + (x * 0.37).sin())
        })
        .collect()
}

fn fit(data: &[(f64, f64)], base: usize) -> CurveFit<'_> {
    CurveFit::new(data, base).expect("Failed to fit data")
}

fn criterion_benchmark(c: &mut Criterion) {
    //
    // How the solver scales with data size
    println!("Benchmarking fit vs n (base=4)...");
    test_linear_criterion_group(
        c,
        "fit_vs_n",
        &[
            CriterionTestEntry::new("n=100", 1e2, gen_sample_data(1e2)),
            CriterionTestEntry::new("n=1_000", 1e3, gen_sample_data(1e3)),
            CriterionTestEntry::new("n=10_000", 1e4, gen_sample_data(1e4)),
            CriterionTestEntry::new("n=100_000", 1e5, gen_sample_data(1e5)),
        ],
        |b, data| b.iter(|| fit(black_box(data), 4)),
    );

    //
    // The same, scaling with the number of terms
    println!("Benchmarking fit vs base (n=1000)...");
    let samples = gen_sample_data(1e3);
    let mut group = c.benchmark_group("fit_vs_base");
    for base in [1, 2, 4, 8, 10, 16, 24] {
        group.bench_with_input(format!("base={base}"), &base, |b, base| {
            b.iter(|| fit(black_box(&samples), *base));
        });
    }
    group.finish();

    //
    // Default policy
    println!("Benchmarking stable fit (n=1000)...");
    c.bench_function("fit_stable", |b| {
        b.iter(|| {
            CurveFit::with_size(black_box(&samples[..]), BasisSize::Stable)
                .expect("Failed to fit data")
        });
    });

    //
    // Evaluation of a fitted model
    println!("Benchmarking evaluation (base=10)...");
    let model: Polynomial = fit(&samples, 10).into_polynomial();
    let mut group = c.benchmark_group("evaluate");
    group.bench_function("y", |b| b.iter(|| model.y(black_box(500.5))));
    group.bench_function("tabulate_1000", |b| {
        b.iter(|| {
            model
                .tabulate(black_box(1.0), black_box(1000.0), 1000)
                .expect("Failed to tabulate")
        });
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

fn get_data_for_run<V>(
    group_id: &str,
    tests: &[CriterionTestEntry<V>],
) -> Option<Vec<(f64, f64)>> {
    // Each test corresponds to a different x value in the series
    tests
        .iter()
        .map(|test| Some((test.x, get_sample_for_run(group_id, &test.id)?)))
        .collect()
}

fn get_sample_for_run(group_id: &str, test_id: &str) -> Option<f64> {
    #[derive(serde::Deserialize)]
    struct CriterionSamples {
        iters: Vec<f64>,
        times: Vec<f64>,
    }

    let raw = std::fs::read_to_string(format!(
        "target/criterion/{group_id}/{test_id}/new/sample.json"
    ))
    .ok()?;
    let samples: CriterionSamples = serde_json::from_str(&raw).ok()?;

    let mean = samples
        .iters
        .iter()
        .zip(samples.times.iter())
        .map(|(i, t)| t / i)
        .sum::<f64>()
        / (samples.iters.len() as f64);
    Some(mean)
}

struct CriterionTestEntry<V> {
    id: String,
    x: f64,
    values: V,
}
impl<V> CriterionTestEntry<V> {
    pub fn new(id: &str, x: f64, values: V) -> Self {
        Self {
            id: id.to_string(),
            x,
            values,
        }
    }
}

fn test_linear_criterion_group<F, V>(
    c: &mut Criterion,
    id: &str,
    samples: &[CriterionTestEntry<V>],
    runner: F,
) where
    for<'a, 'b, 'c> F: Fn(&'a mut criterion::Bencher<'b>, &'c V),
{
    let mut group = c.benchmark_group(id);
    for sample in samples {
        group.bench_with_input(&sample.id, &sample.values, &runner);
    }
    group.finish();

    //
    // Fitting time should grow linearly with n; report how straight the line is
    let Some(data) = get_data_for_run(id, samples) else {
        println!("{id}: no criterion samples found, skipping scaling check");
        return;
    };
    match CurveFit::new(&data[..], 2) {
        Ok(linear_fit) => println!("{id}: linear scaling r² = {:.4}", linear_fit.r_squared()),
        Err(e) => println!("{id}: scaling check failed: {e}"),
    }
}
