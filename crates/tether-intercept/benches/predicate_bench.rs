use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tether_intercept::exchange::{Exchange, HttpRequest};
use tether_intercept::predicate::RequestMatch;
use tether_intercept::rules::{RuleKind, RuleStore};
use tether_intercept::{InterceptEngine, StubSpec};

fn create_predicate(id: usize) -> RequestMatch {
    RequestMatch::url(format!(r"api\.example\.com/v\d+/endpoint{id}\?"))
        .with_method("GET")
        .with_query(["&page=\\d+"])
        .with_request_header("Accept", "json")
}

fn exchange_for(id: usize) -> Exchange {
    Exchange::pending(
        HttpRequest::new(
            "GET",
            format!("https://api.example.com/v1/endpoint{id}?page=3"),
        )
        .with_header("Accept", "application/json"),
    )
}

fn store_with_rules(count: usize) -> RuleStore<usize> {
    let store = RuleStore::new(RuleKind::Stub);
    for i in 0..count {
        store.add(create_predicate(i), i, None).unwrap();
    }
    store
}

fn bench_predicate_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicate_evaluation");

    let compiled = create_predicate(7).compile().unwrap();
    let hit = exchange_for(7);
    let miss = exchange_for(8);

    group.bench_function("match_hit", |b| {
        b.iter(|| compiled.matches(black_box(&hit)));
    });
    group.bench_function("match_miss", |b| {
        b.iter(|| compiled.matches(black_box(&miss)));
    });

    group.bench_function("compile", |b| {
        let predicate = create_predicate(7);
        b.iter(|| black_box(&predicate).compile());
    });

    group.bench_function("identifier", |b| {
        let predicate = create_predicate(7);
        b.iter(|| black_box(&predicate).identifier());
    });

    group.finish();
}

fn bench_best_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("best_match");

    for rule_count in [10, 100, 1000].iter() {
        let store = store_with_rules(*rule_count);

        // Newest rule, found first
        let newest = exchange_for(rule_count - 1);
        // Oldest rule, found last
        let oldest = exchange_for(0);
        let none = Exchange::pending(HttpRequest::new("GET", "https://other.test/"));

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("newest", rule_count), rule_count, |b, _| {
            b.iter(|| store.find_best_match(black_box(&newest)));
        });
        group.bench_with_input(BenchmarkId::new("oldest", rule_count), rule_count, |b, _| {
            b.iter(|| store.find_best_match(black_box(&oldest)));
        });
        group.bench_with_input(BenchmarkId::new("none", rule_count), rule_count, |b, _| {
            b.iter(|| store.find_best_match(black_box(&none)));
        });
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let engine = InterceptEngine::new();
    for i in 0..100 {
        engine
            .add_stub_spec(create_predicate(i), StubSpec::new("stubbed"), None)
            .unwrap();
    }
    engine.add_monitor(RequestMatch::url("never-matches")).unwrap();
    let exchange = exchange_for(50);

    c.bench_function("evaluate_100_stubs", |b| {
        b.iter(|| engine.evaluate(black_box(&exchange)));
    });
}

criterion_group!(benches, bench_predicate_evaluation, bench_best_match, bench_evaluate);
criterion_main!(benches);
