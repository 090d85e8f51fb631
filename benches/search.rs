use criterion::{criterion_group, criterion_main, Criterion};
use kestrel::position::Position;
use kestrel::search::{search, SearchMode, SearchOptions};

fn search_bench(c: &mut Criterion) {
    let record = "r1bqkbnr/pppp1ppp/2n5/4p3/3PP3/5N2/PPP2PPP/RNBQKB1R b KQkq - 0 3";

    let mut options = SearchOptions::default();
    options.set_depth(4);
    c.bench_function("alpha-beta depth 4", |b| {
        b.iter(|| {
            // A fresh position each time, the table would answer instantly otherwise
            let mut position = Position::new(record).unwrap();
            search(&mut position, &options)
        })
    });

    let mut options = SearchOptions::default();
    options.set_depth(3).set_quiescence(false).set_mode(SearchMode::Minimax);
    c.bench_function("minimax depth 3", |b| {
        b.iter(|| {
            let mut position = Position::new(record).unwrap();
            search(&mut position, &options)
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = search_bench
}
criterion_main!(benches);
