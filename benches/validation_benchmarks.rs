use criterion::{Criterion, criterion_group, criterion_main};
use fieldcheck::prelude::*;
use std::hint::black_box;

#[derive(Record)]
#[record(crate = "fieldcheck")]
struct User {
    #[validate("required,min=3,max=32")]
    name: String,
    #[validate("required,email")]
    email: String,
    #[validate("required,gte=18")]
    age: u32,
    #[validate("required,min=6")]
    password: String,
}

#[derive(Record)]
#[record(crate = "fieldcheck")]
struct Listing {
    #[validate("required,uuid")]
    id: String,
    #[validate("omitempty,url")]
    homepage: Option<String>,
    #[validate("oneof=draft published archived")]
    state: String,
    #[validate("ipv4|ipv6")]
    origin: String,
    #[validate("max=5")]
    tags: Vec<String>,
}

fn user(name: &str, email: &str, age: u32, password: &str) -> User {
    User {
        name: name.to_string(),
        email: email.to_string(),
        age,
        password: password.to_string(),
    }
}

fn bench_record_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_validation");
    let validator = Validator::new();

    let valid = user("John Doe", "john.doe@example.com", 25, "securepassword");
    let invalid = user("", "not-an-email", 10, "abc");

    group.bench_function("valid_user", |b| {
        b.iter(|| validator.validate(black_box(&valid)).unwrap())
    });

    group.bench_function("invalid_user", |b| {
        b.iter(|| validator.validate(black_box(&invalid)).unwrap())
    });

    let collecting = Validator::with_config(ValidatorConfig { fail_fast: false });
    group.bench_function("invalid_user_all_errors", |b| {
        b.iter(|| collecting.validate(black_box(&invalid)).unwrap())
    });

    group.finish();
}

fn bench_format_constraints(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_constraints");
    let validator = Validator::new();

    let listing = Listing {
        id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
        homepage: Some("https://example.com/shop?page=2".to_string()),
        state: "published".to_string(),
        origin: "2001:db8::1".to_string(),
        tags: vec!["rust".to_string(), "api".to_string()],
    };

    group.bench_function("listing", |b| {
        b.iter(|| validator.validate(black_box(&listing)).unwrap())
    });

    group.finish();
}

fn bench_schema_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("schema_cache");

    group.bench_function("cold_validator", |b| {
        let record = user("Alice", "alice@example.com", 30, "password");
        b.iter(|| {
            let validator = Validator::new();
            validator.validate(black_box(&record)).unwrap()
        })
    });

    group.bench_function("shared_validator", |b| {
        let record = user("Alice", "alice@example.com", 30, "password");
        b.iter(|| validate(black_box(&record)).unwrap())
    });

    group.finish();
}

fn bench_error_payload(c: &mut Criterion) {
    let mut group = c.benchmark_group("error_payload");
    let errors = validate(&user("", "not-an-email", 10, "abc")).unwrap();

    group.bench_function("to_json", |b| b.iter(|| black_box(&errors).to_json()));

    group.finish();
}

criterion_group!(
    validation_benches,
    bench_record_validation,
    bench_format_constraints,
    bench_schema_cache,
    bench_error_payload,
);

criterion_main!(validation_benches);
