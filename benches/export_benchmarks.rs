use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use coach::models::{
    DurationTarget, IntensityTarget, IntervalSet, MainElement, Sport, StepKind, StructuredWorkout,
    Workout, WorkoutStep,
};
use coach::ZwoExporter;

/// Benchmarks for ZWO rendering with growing numbers of interval sets

fn create_structured_workout(interval_sets: usize) -> Workout {
    let mut workout = Workout::new("bench", Sport::Bike, "intervals", "Benchmark Session");

    let main = (0..interval_sets)
        .map(|i| {
            MainElement::IntervalSet(IntervalSet {
                name: Some(format!("Set {}", i + 1)),
                repeats: 4,
                steps: vec![
                    WorkoutStep::new(
                        StepKind::Work,
                        DurationTarget::minutes(4.0),
                        IntensityTarget::percent_ftp(105.0),
                    )
                    .with_cadence(95, 100),
                    WorkoutStep::new(
                        StepKind::Recovery,
                        DurationTarget::minutes(2.0),
                        IntensityTarget::percent_ftp(50.0),
                    ),
                ],
            })
        })
        .collect();

    workout.structure = Some(StructuredWorkout {
        warmup: vec![WorkoutStep::new(
            StepKind::Warmup,
            DurationTarget::minutes(10.0),
            IntensityTarget::percent_ftp(70.0),
        )],
        main,
        cooldown: vec![WorkoutStep::new(
            StepKind::Cooldown,
            DurationTarget::minutes(10.0),
            IntensityTarget::percent_ftp(60.0),
        )],
        total_duration: None,
        estimated_tss: None,
        estimated_if: None,
    });
    workout
}

fn bench_structured_export(c: &mut Criterion) {
    let exporter = ZwoExporter::new();
    let mut group = c.benchmark_group("ZWO Structured Export");

    for &sets in &[1, 10, 100] {
        let workout = create_structured_workout(sets);

        group.throughput(Throughput::Elements(sets as u64));
        group.bench_with_input(BenchmarkId::new("generate_zwo", sets), &workout, |b, workout| {
            b.iter(|| exporter.generate_zwo(black_box(workout)));
        });
    }

    group.finish();
}

fn bench_synthesized_export(c: &mut Criterion) {
    let exporter = ZwoExporter::new();
    let mut workout = Workout::new("bench", Sport::Run, "threshold", "Synthesized");
    workout.duration_minutes = Some(75.0);

    c.bench_function("generate_zwo_synthesized", |b| {
        b.iter(|| exporter.generate_zwo(black_box(&workout)));
    });
}

criterion_group!(benches, bench_structured_export, bench_synthesized_export);
criterion_main!(benches);
