use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use frotzer_core::OutputFilter;

/// Build interpreter output of roughly `paragraphs` paragraphs
fn create_output(paragraphs: usize) -> String {
    let paragraph = "Days of searching, days of thirsty hacking through the briars of the\r\n\
                     forest, but at last your patience was rewarded.  A discovery!\r\n\r\n";

    let mut output = String::from("\r\nRuins\r\n");
    for _ in 0..paragraphs {
        output.push_str(paragraph);
    }
    output.push_str("\r\n>");
    output
}

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");

    for paragraphs in [1, 10, 100].iter() {
        let output = create_output(*paragraphs);

        for filter in OutputFilter::ALL {
            group.bench_with_input(
                BenchmarkId::new(filter.name(), paragraphs),
                &output,
                |b, o| {
                    b.iter(|| {
                        let text = filter.apply(black_box(o));
                        black_box(text);
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_filters);
criterion_main!(benches);
