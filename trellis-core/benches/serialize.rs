//! Serialization throughput for growing widget trees.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trellis_core::serializer::serialize;
use trellis_core::{State, Widget};

/// A column of `n` rows, each with a label and a bound button.
fn list(n: usize, count: &State<i64>) -> Widget {
    Widget::column().children((0..n).map(|i| {
        let count = count.clone();
        Widget::row()
            .spacing(8)
            .child(Widget::text(format!("Row {i}")))
            .child(Widget::button("+").on_click(move || {
                count.update(|c| c + 1);
            }))
    }))
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    let count = State::new(0);

    for n in [10, 100, 1000] {
        let tree = list(n, &count);
        group.bench_with_input(BenchmarkId::new("tree", n), &tree, |b, tree| {
            b.iter(|| serialize(black_box(tree), 1));
        });
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let count = State::new(0);

    for n in [10, 100, 1000] {
        let rendered = serialize(&list(n, &count), 1).expect("tree serializes");
        group.bench_with_input(BenchmarkId::new("json", n), &rendered.tree, |b, tree| {
            b.iter(|| tree.to_json());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_serialize, bench_encode);
criterion_main!(benches);
