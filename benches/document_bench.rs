use criterion::{Criterion, criterion_group, criterion_main};
use record_json::{Document, JsonReadable};
use std::hint::black_box;

// ─── Test Data ──────────────────────────────────────────────────────────────

/// {
///   "id": "user:abc123",
///   "name": "Alice",
///   "age": 28,
///   "active": true,
///   "deleted_at": null,
///   "profile": {
///     "bio": "Software engineer",
///     "settings": { "theme": "dark", "notifications": true }
///   }
/// }
fn make_document() -> Document {
    let mut doc = Document::new();
    let mut root = doc.root_mut();
    root.set_string("id", "user:abc123").unwrap();
    root.set_string("name", "Alice").unwrap();
    root.set_int64("age", 28).unwrap();
    root.set_bool("active", true).unwrap();
    root.set_null("deleted_at").unwrap();
    let mut profile = root.set_object("profile").unwrap();
    profile.set_string("bio", "Software engineer").unwrap();
    let mut settings = profile.set_object("settings").unwrap();
    settings.set_string("theme", "dark").unwrap();
    settings.set_bool("notifications", true).unwrap();
    doc
}

// ─── Writes ─────────────────────────────────────────────────────────────────

fn bench_set_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_values");

    group.bench_function("build document", |b| b.iter(|| black_box(make_document())));

    group.bench_function("overwrite int64", |b| {
        let mut doc = make_document();
        let mut i = 0i64;
        b.iter(|| {
            i += 1;
            doc.root_mut().set_int64(black_box("age"), i).unwrap()
        })
    });

    // Overwriting a string appends to the heap each time.
    group.bench_function("overwrite string", |b| {
        let mut doc = make_document();
        b.iter(|| doc.root_mut().set_string(black_box("name"), "Bob").unwrap())
    });

    group.bench_function("append 100 properties", |b| {
        let names: Vec<String> = (0..100).map(|i| format!("field_{i}")).collect();
        b.iter(|| {
            let mut doc = Document::new();
            let mut root = doc.root_mut();
            for (i, name) in names.iter().enumerate() {
                root.set_int64(name, i as i64).unwrap();
            }
            black_box(doc)
        })
    });

    group.finish();
}

// ─── Reads ──────────────────────────────────────────────────────────────────

fn bench_reading_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("reading_values");
    let doc = make_document();

    group.bench_function("get_string (head of chain)", |b| {
        b.iter(|| doc.root().get_string(black_box("id")).unwrap().len())
    });

    group.bench_function("get_bool (mid chain)", |b| {
        b.iter(|| doc.root().get_bool(black_box("active")).unwrap())
    });

    group.bench_function("nested get_string", |b| {
        b.iter(|| {
            doc.root()
                .get_object(black_box("profile"))
                .unwrap()
                .get_object("settings")
                .unwrap()
                .get_string("theme")
                .unwrap()
                .len()
        })
    });

    group.bench_function("missing name", |b| {
        b.iter(|| doc.root().contains(black_box("missing")))
    });

    group.finish();
}

// ─── Serialization ──────────────────────────────────────────────────────────

fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");
    let doc = make_document();
    let bytes = doc.to_bytes();

    group.bench_function("to_bytes", |b| b.iter(|| black_box(&doc).to_bytes()));

    group.bench_function("deserialize (verify + copy)", |b| {
        b.iter(|| Document::deserialize(black_box(&bytes)).unwrap())
    });

    group.bench_function("to_json_text", |b| {
        b.iter(|| black_box(&doc).to_json_text().unwrap())
    });

    group.bench_function("write_text (reuse)", |b| {
        let mut buf = Vec::new();
        b.iter(|| {
            buf.clear();
            doc.write_text(&mut buf).unwrap();
        })
    });

    group.finish();
}

// ─── Criterion Main ─────────────────────────────────────────────────────────

criterion_group!(
    benches,
    bench_set_values,
    bench_reading_values,
    bench_serialization,
);
criterion_main!(benches);
