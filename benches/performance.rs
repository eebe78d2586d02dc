// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tetragen::evolution::{Evaluation, FitnessFunction, Population};
use tetragen::geometry::triangles_intersect;
use tetragen::grammar::DEFAULT_ALPHABET;
use tetragen::{grow, Grammar, Operation};

fn bench_intersection(c: &mut Criterion) {
    let mut group = c.benchmark_group("intersection");

    let base = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(0.0, 2.0, 0.0),
    ];
    let piercing = [
        Point3::new(0.5, 0.5, -1.0),
        Point3::new(0.5, 0.5, 1.0),
        Point3::new(1.5, 1.5, 0.0),
    ];
    let separated = [
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(2.0, 0.0, 1.0),
        Point3::new(0.0, 2.0, 1.0),
    ];

    group.bench_function("piercing", |b| {
        b.iter(|| triangles_intersect(black_box(&base), black_box(&piercing)))
    });
    group.bench_function("separated", |b| {
        b.iter(|| triangles_intersect(black_box(&base), black_box(&separated)))
    });

    group.finish();
}

fn bench_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("growth");
    let grammar = Grammar::example();

    for iterations in [25, 50, 100] {
        group.bench_with_input(BenchmarkId::new("collision", iterations), &iterations, |b, &n| {
            b.iter(|| grow(black_box(&grammar), n, true).unwrap().face_count())
        });
        group.bench_with_input(BenchmarkId::new("unchecked", iterations), &iterations, |b, &n| {
            b.iter(|| grow(black_box(&grammar), n, false).unwrap().face_count())
        });
    }

    group.finish();
}

fn bench_fitness(c: &mut Criterion) {
    let mut group = c.benchmark_group("fitness");
    let grammar = Grammar::example();
    let mesh = grow(&grammar, 100, true).unwrap();

    group.bench_function("hull_volume", |b| b.iter(|| black_box(&mesh).convex_hull_volume()));
    group.bench_function("outward_score", |b| b.iter(|| black_box(&mesh).outward_score()));

    group.finish();
}

fn bench_population(c: &mut Criterion) {
    let mut group = c.benchmark_group("population");
    group.sample_size(20);

    let mut rng = StdRng::seed_from_u64(1);
    let population = Population::random(32, &DEFAULT_ALPHABET, &Operation::ALL, &mut rng).unwrap();
    let evaluation = Evaluation {
        fitness: FitnessFunction::HullVolume,
        iterations: 50,
        check_collision: true,
        target: Point3::new(25.0, 0.0, 25.0),
    };

    group.bench_function("evaluate_32", |b| {
        b.iter(|| {
            let mut fresh = population.clone();
            fresh.evaluate(black_box(&evaluation)).unwrap();
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_intersection,
    bench_growth,
    bench_fitness,
    bench_population
);
criterion_main!(benches);
