use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tangles_diff::{generate_revision, text_delta};
use tangles_types::{Part, Post};

fn paragraph(i: usize) -> String {
    format!("Paragraph {i}. The quick brown fox jumps over the lazy dog, again and again.\n")
}

fn large_post() -> (Post, Post) {
    let mut before = Post::new("bench");
    before.title = "A long post".into();
    before.authors = (0..20).map(|i| format!("author-{i}")).collect();
    before.parts = (0..200)
        .map(|i| Part::inline(format!("p{i}"), paragraph(i).repeat(5)).with_header("Content-Type", "text/plain"))
        .collect();

    let mut after = before.clone();
    after.title = "A longer post".into();
    after.authors.rotate_left(3);
    for (i, part) in after.parts.iter_mut().enumerate().filter(|(i, _)| i % 7 == 0) {
        *part = Part::inline(part.id.clone(), paragraph(i).replace("lazy", "sleepy").repeat(5))
            .with_header("Content-Type", "text/markdown");
    }
    after.parts.swap(10, 150);
    after.parts.truncate(190);
    (before, after)
}

fn criterion_benchmark(c: &mut Criterion) {
    let (before, after) = large_post();
    c.bench_function("generate_revision/large_post", |b| {
        b.iter(|| generate_revision(black_box(&before), black_box(&after)))
    });

    let old = paragraph(1).repeat(200);
    let new = old.replace("fox", "cat");
    c.bench_function("text_delta/long_text", |b| {
        b.iter(|| text_delta(black_box(&old), black_box(&new)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
