// Scoring benchmarks for PriceMatch
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricematch::{
    AttributeSet, FuzzyMatcher, HashingEmbedder, LiveListing, LiveQuery, MatchingCriteria,
    PriceScorer, RankingEngine, Vector,
};
use pricematch_similarity::cosine_scores;
use rand::prelude::*;

fn generate_random_vector(rng: &mut impl Rng, dim: usize) -> Vector {
    let data: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect();
    Vector::new(data)
}

const TITLE_WORDS: &[&str] = &[
    "Brightown", "LED", "String", "Lights", "Warm", "White", "50ft", "Outdoor", "Solar", "Fan",
    "Ceiling", "12-Pack", "Dimmable", "Waterproof", "Copper", "Fairy", "Garden", "Patio",
];

fn generate_listing(rng: &mut impl Rng, i: usize) -> LiveListing {
    let words: Vec<&str> = (0..6)
        .map(|_| TITLE_WORDS[rng.random_range(0..TITLE_WORDS.len())])
        .collect();
    LiveListing::new(words.join(" "), format!("${}.99", rng.random_range(5..200)))
        .with_source("bench", format!("https://shop.example/{}", i))
}

fn attributes() -> AttributeSet {
    AttributeSet::new("string lights", "lighting")
        .unwrap()
        .with_brand("Brightown")
        .with_color("warm white")
        .with_size("50 ft")
}

fn benchmark_cosine(c: &mut Criterion) {
    let mut group = c.benchmark_group("cosine");
    let mut rng = rand::rng();
    let query = generate_random_vector(&mut rng, 384);

    for size in [100, 1000, 10000].iter() {
        let candidates: Vec<Vector> = (0..*size).map(|_| generate_random_vector(&mut rng, 384)).collect();
        group.bench_with_input(BenchmarkId::new("cosine_scores", size), size, |b, _| {
            b.iter(|| cosine_scores(black_box(&query), black_box(&candidates)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_fuzzy(c: &mut Criterion) {
    let matcher = FuzzyMatcher::default();
    let attrs = attributes();
    let criteria = MatchingCriteria::all();

    c.bench_function("fuzzy_score", |b| {
        b.iter(|| {
            matcher.score(
                black_box(&attrs),
                black_box("Brightown 50ft Warm White LED String Lights"),
                &criteria,
            )
        });
    });
}

fn benchmark_live_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("live_ranking");
    let engine = RankingEngine::builder().build().unwrap();
    let attrs = attributes();
    let query = LiveQuery::default();
    let mut rng = rand::rng();

    for size in [20, 200, 2000].iter() {
        let listings: Vec<LiveListing> = (0..*size).map(|i| generate_listing(&mut rng, i)).collect();
        group.bench_with_input(BenchmarkId::new("score_live_listings", size), size, |b, _| {
            b.iter(|| {
                engine
                    .score_live_listings(&attrs, black_box(listings.clone()), &query)
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn benchmark_price_and_embedding(c: &mut Criterion) {
    let scorer = PriceScorer::default();
    let mut rng = rand::rng();
    let prices: Vec<Option<f64>> = (0..1000)
        .map(|_| Some(rng.random_range(1.0f64..500.0f64)))
        .collect();

    c.bench_function("price_score_all_1000", |b| {
        b.iter(|| scorer.score_all(black_box(&prices)));
    });

    let embedder = HashingEmbedder::default();
    c.bench_function("hashing_embed", |b| {
        b.iter(|| {
            embedder.embed_text(black_box(
                "Type: string lights Category: lighting Brand: Brightown Color: warm white",
            ))
        });
    });
}

criterion_group!(
    benches,
    benchmark_cosine,
    benchmark_fuzzy,
    benchmark_live_ranking,
    benchmark_price_and_embedding
);
criterion_main!(benches);
