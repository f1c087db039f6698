use std::collections::HashMap;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tailor::engine::{encode_features, EncoderTables, FeatureColumn, RawPrediction};
use tailor::theme::theme_properties;
use tailor::{map_tokens, EngagementClass, UserProfile};

fn setup_encoders() -> EncoderTables {
    let mut tables = EncoderTables::new();
    tables.insert(
        "Gender".into(),
        HashMap::from([("female".to_string(), 0), ("male".to_string(), 1)]),
    );
    tables.insert(
        "Platform".into(),
        HashMap::from([("Facebook".to_string(), 0), ("Website".to_string(), 3)]),
    );
    tables.insert(
        "User_experience".into(),
        HashMap::from([("Engaging".to_string(), 0), ("User-Friendly".to_string(), 2)]),
    );
    tables
}

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("Encoding");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    let encoders = setup_encoders();
    let columns: Vec<String> = FeatureColumn::ALL.iter().map(|c| c.name().to_string()).collect();
    let profile = UserProfile::default();

    group.bench_function("all_columns", |b| b.iter(|| {
        encode_features(black_box(&profile), black_box(&columns), &encoders)
    }));

    group.bench_function("raw_scores", |b| b.iter(|| {
        RawPrediction::from_scores(black_box(&[1.3, -0.2, 0.4])).unwrap()
    }));

    group.finish();
}

fn bench_tokens(c: &mut Criterion) {
    let mut group = c.benchmark_group("Tokens");
    group.sample_size(50);

    let profile = UserProfile {
        accessibility: 5,
        animation_transitions: 2,
        ..UserProfile::default()
    };

    for class in EngagementClass::ALL {
        group.bench_function(format!("map_{}", class.index()), |b| b.iter(|| {
            map_tokens(black_box(class), black_box(&profile))
        }));
    }

    let tokens = map_tokens(EngagementClass::High, &profile);
    group.bench_function("theme_properties", |b| b.iter(|| {
        theme_properties(black_box(&tokens))
    }));

    group.finish();
}

criterion_group!(benches, bench_encoding, bench_tokens);
criterion_main!(benches);
