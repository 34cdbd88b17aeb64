//! Benchmarks for sanction-notice extraction performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks run each pipeline stage over synthetic notices of
//! increasing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sanction_notice::{Extractor, RenderOptions};

/// Creates a synthetic OCR-style notice with the given number of incidents.
fn create_test_notice(incident_count: usize) -> String {
    let mut text = String::from(
        "금융감독원\n\
         1. 금 융 기 관 명 : 주식회사 벤치마크은행\n\
         2. 제재조치일 : 2024. 5. 15.\n\
         3. 제재조치내용\n\
         제재대상 제재내용\n\
         기관\n\
         기관경고\n\
         과태료 1억 2천만원\n\
         임원\n\
         주의 1명\n\
         직원\n\
         견책 2명\n\
         - 1 -\n\
         4. 제재대상사실\n",
    );

    for i in 0..incident_count {
        let ordinal = ['가', '나', '다', '라', '마', '바', '사', '아'][i % 8];
        text.push_str(&format!("{}. 내부통제 위반 사항 {}\n", ordinal, i));
        text.push_str(&format!("(1) 고객정보 조회 기록 미보관 {}\n", i));
        text.push_str("벤치마크은행은 신용정보 조회 기록을 보관하지 아니하였다.\n");
        text.push_str("(가) 관련 직원은 승인절차를 거치지 아니하고 정보를 조회하였다.\n");
        if i % 3 == 0 {
            text.push_str(&format!("- {} -\n", i + 2));
        }
    }
    text
}

/// Benchmark full extraction at various sizes.
fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");

    for incident_count in [1, 10, 50, 200].iter() {
        let text = create_test_notice(*incident_count);

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("incidents", incident_count),
            &text,
            |b, text| {
                b.iter(|| sanction_notice::extract_document(black_box(text)));
            },
        );
    }

    group.finish();
}

/// Benchmark the normalizer alone.
fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for incident_count in [10, 200].iter() {
        let text = create_test_notice(*incident_count);

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("incidents", incident_count),
            &text,
            |b, text| {
                b.iter(|| sanction_notice::normalize(black_box(text)));
            },
        );
    }

    group.finish();
}

/// Benchmark layout classification and pair parsing.
fn bench_classify_and_pairs(c: &mut Criterion) {
    let text = sanction_notice::normalize(&create_test_notice(10));

    c.bench_function("classify_sanction_block", |b| {
        b.iter(|| sanction_notice::sanction_layout(black_box(&text)));
    });

    c.bench_function("extract_pairs", |b| {
        b.iter(|| sanction_notice::extract_pairs(black_box(&text)));
    });

    c.bench_function("extract_incidents", |b| {
        b.iter(|| sanction_notice::extract_incidents(black_box(&text)));
    });
}

/// Benchmark batch extraction, sequential against parallel.
fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    let texts: Vec<String> = (0..64).map(|i| create_test_notice(5 + i % 10)).collect();

    group.bench_function("sequential", |b| {
        let extractor = Extractor::new().sequential();
        b.iter(|| extractor.extract_batch(black_box(&texts)).unwrap());
    });

    group.bench_function("parallel", |b| {
        let extractor = Extractor::new();
        b.iter(|| extractor.extract_batch(black_box(&texts)).unwrap());
    });

    group.finish();
}

/// Benchmark Markdown rendering.
fn bench_markdown_rendering(c: &mut Criterion) {
    let document = sanction_notice::extract_document(&create_test_notice(50));
    let options = RenderOptions::new().with_frontmatter().with_quality_report();

    c.bench_function("render_markdown", |b| {
        b.iter(|| sanction_notice::render::render_markdown(black_box(&document), &options));
    });
}

criterion_group!(
    benches,
    bench_extraction,
    bench_normalize,
    bench_classify_and_pairs,
    bench_batch,
    bench_markdown_rendering,
);
criterion_main!(benches);
