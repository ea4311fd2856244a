use std::hint::black_box;
use std::time::Instant;

use forex_arb_core::CycleProfitCache;
use perf_bench::*;

fn main() {
    let updates = generate_rate_updates();
    let labels: Vec<String> = updates.iter().map(|u| pair_label(u.from, u.to)).collect();
    let mut cache = CycleProfitCache::new(triangular_cycles()).expect("cycles are non-empty");

    let start_time = Instant::now();
    let mut alerts = 0usize;

    // Predict, then commit: the latency-sensitive path of the cycle cache.
    for (update, label) in updates.iter().zip(&labels) {
        if cache.new_arbitrage(label, update.rate).expect("label is tracked") {
            alerts += 1;
        }
        cache.update(label, update.rate).expect("label is tracked");
    }

    let elapsed_time = start_time.elapsed();

    println!(
        "--- Cycle Cache Benchmark Results ({} Quotes, {} Cycles) ---",
        NUM_QUOTES,
        cache.num_cycles()
    );
    println!("Alerts: {}", black_box(alerts));
    println!("Elapsed Time: {:?}", elapsed_time);
    println!("Per Quote: {:?}", elapsed_time / NUM_QUOTES as u32);
}
