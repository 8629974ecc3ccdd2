use composite::build_aggregate;
use criterion::{Criterion, criterion_group, criterion_main};

use common::{Product, Recommendation, Review};

fn sample_product() -> Product {
    let mut product = Product::new(1, "bench product", 100);
    product.service_address = "bench-host/10.0.0.1:7001".into();
    product
}

fn sample_recommendations(n: i32) -> Vec<Recommendation> {
    (1..=n)
        .map(|i| {
            let mut rec = Recommendation::new(1, i, format!("author {i}"), i % 5, "content");
            rec.service_address = "bench-host/10.0.0.2:7002".into();
            rec
        })
        .collect()
}

fn sample_reviews(n: i32) -> Vec<Review> {
    (1..=n)
        .map(|i| {
            let mut review = Review::new(1, i, format!("author {i}"), format!("subject {i}"), "c");
            review.service_address = "bench-host/10.0.0.3:7003".into();
            review
        })
        .collect()
}

fn bench_build_aggregate(c: &mut Criterion) {
    c.bench_function("composite/build_aggregate_3_recs_3_reviews", |b| {
        b.iter(|| {
            build_aggregate(
                sample_product(),
                sample_recommendations(3),
                sample_reviews(3),
                "bench-host/10.0.0.4:7000",
            )
        });
    });

    c.bench_function("composite/build_aggregate_50_recs_50_reviews", |b| {
        b.iter(|| {
            build_aggregate(
                sample_product(),
                sample_recommendations(50),
                sample_reviews(50),
                "bench-host/10.0.0.4:7000",
            )
        });
    });
}

criterion_group!(benches, bench_build_aggregate);
criterion_main!(benches);
