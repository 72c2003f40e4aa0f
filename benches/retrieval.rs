use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ferret::core::segmenter::StreamSegmenter;
use ferret::project::{IndexOptions, ProjectIndex, Retriever};
use std::fs;
use tempfile::TempDir;

fn make_module(idx: usize, functions: usize) -> String {
    let mut src = String::from("import os\nfrom typing import List\n\n");
    for f in 0..functions {
        src.push_str(&format!(
            "def handler_{idx}_{f}(request):\n    user = request.user\n    if not user:\n        raise ValueError(\"missing user\")\n    return render(user, {f})\n\n"
        ));
    }
    src
}

fn make_project(files: usize, functions: usize) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for idx in 0..files {
        let sub = dir.path().join(format!("pkg{}", idx % 8));
        fs::create_dir_all(&sub).expect("create package dir");
        fs::write(sub.join(format!("mod_{idx}.py")), make_module(idx, functions))
            .expect("write module");
        fs::write(
            sub.join(format!("notes_{idx}.md")),
            "# Notes\nLogin flow and session handling.\n".repeat(40),
        )
        .expect("write notes");
    }
    dir
}

fn bench_index_and_query(c: &mut Criterion) {
    let options = IndexOptions::default();
    let retriever = Retriever::default();

    let mut group = c.benchmark_group("project_index");
    for &files in &[10usize, 100] {
        let dir = make_project(files, 12);
        group.bench_function(BenchmarkId::new("build", files), |b| {
            b.iter(|| ProjectIndex::build(dir.path(), &options).expect("build"))
        });

        let index = ProjectIndex::build(dir.path(), &options).expect("build");
        group.bench_function(BenchmarkId::new("query", files), |b| {
            b.iter(|| {
                retriever
                    .query("where is the missing user error raised in handler_3_4", &index)
                    .expect("query")
            })
        });
    }
    group.finish();
}

fn bench_segmenter(c: &mut Criterion) {
    let reply = "Here is the fix:\n```python\ndef f(x):\n\treturn x * 2\n```\nAnd some prose after it. "
        .repeat(50);
    let fragments: Vec<String> = reply
        .chars()
        .collect::<Vec<_>>()
        .chunks(7)
        .map(|chunk| chunk.iter().collect())
        .collect();

    let mut group = c.benchmark_group("stream_segmenter");
    group.throughput(Throughput::Bytes(reply.len() as u64));
    group.bench_function("feed_fragments", |b| {
        b.iter(|| {
            let mut segmenter = StreamSegmenter::new(80);
            let mut events = 0usize;
            for fragment in &fragments {
                events += segmenter.feed(fragment).len();
            }
            events + usize::from(segmenter.flush().is_some())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_index_and_query, bench_segmenter);
criterion_main!(benches);
