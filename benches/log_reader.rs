//! DevTools log parsing benchmark.
//!
//! Measures reader throughput over synthetic logs of different sizes, with
//! multi-line payloads interleaved with non-header noise.
//!
//! Run with: cargo bench --bench log_reader
//! Results saved to: target/criterion/

use std::fmt::Write;
use std::hint::black_box;
use std::io::Cursor;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use devtools_sync::{DevToolsLogReader, Protocol};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const ENTRY_COUNTS: &[usize] = &[100, 1_000, 10_000];

// ============================================================================
// Log Generation
// ============================================================================

fn synthetic_log(entries: usize) -> String {
    let mut log = String::new();
    for id in 1..=entries {
        let _ = writeln!(
            log,
            "[1531428669.{:03}][DEBUG]: DevTools WebSocket Command: Runtime.evaluate (id={id}) {{",
            id % 1000
        );
        let _ = writeln!(log, "   \"expression\": \"document.querySelector('a[href=\\\"{{}}\\\"]')\",");
        let _ = writeln!(log, "   \"returnByValue\": true");
        let _ = writeln!(log, "}}");
        let _ = writeln!(log, "[1531428669.{:03}][INFO]: Waiting for pending navigations...", id % 1000);
        let _ = writeln!(
            log,
            "[1531428669.{:03}][DEBUG]: DevTools WebSocket Response: Runtime.evaluate (id={id}) {{\"result\":{{\"type\":\"string\",\"value\":\"}}]\"}}}}",
            id % 1000
        );
        let _ = writeln!(log, "[1531428669.{:03}][DEBUG]: DevTools HTTP Request: http://localhost:9222/json", id % 1000);
    }
    log
}

// ============================================================================
// Benchmark: Reader Throughput
// ============================================================================

fn bench_read_websocket(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_websocket");

    for &count in ENTRY_COUNTS {
        let log = synthetic_log(count);
        group.throughput(Throughput::Bytes(log.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &log, |b, log| {
            b.iter(|| {
                let mut reader = DevToolsLogReader::from_reader(Cursor::new(log.as_bytes()));
                let read = reader.entries(Protocol::WebSocket).count();
                assert_eq!(read, count * 2);
                black_box(read)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_read_websocket);
criterion_main!(benches);
