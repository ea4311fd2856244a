use std::hint::black_box;
use std::time::Instant;

use forex_arb_core::GraphArbitrageDetector;
use perf_bench::*;

fn main() {
    let updates = generate_rate_updates();
    let mut detector =
        GraphArbitrageDetector::new(CURRENCIES).expect("benchmark currencies are distinct");

    let start_time = Instant::now();
    let mut detections = 0usize;

    // One full-graph query per snapshot, as the driver does.
    for snapshot in updates.chunks(QUOTES_PER_TIMESTAMP) {
        for update in snapshot {
            detector
                .update(CURRENCIES[update.from], CURRENCIES[update.to], update.rate)
                .expect("benchmark rates are valid");
        }
        if detector.is_arbitrage_possible() {
            detections += 1;
        }
    }

    let elapsed_time = start_time.elapsed();
    let snapshots = updates.len().div_ceil(QUOTES_PER_TIMESTAMP);

    println!("--- Graph Benchmark Results ({} Quotes) ---", NUM_QUOTES);
    println!("Snapshots with arbitrage: {}", black_box(detections));
    println!("Elapsed Time: {:?}", elapsed_time);
    println!("Per Snapshot: {:?}", elapsed_time / snapshots as u32);
}
