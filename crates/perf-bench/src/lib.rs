// ----------------------------
// Per-update latency benchmarks
// ----------------------------

pub const CURRENCIES: [&str; 10] = [
    "USD", "EUR", "JPY", "GBP", "CNH", "AUD", "CAD", "CHF", "HKD", "SGD",
];

pub const NUM_QUOTES: usize = 100_000;

/// Quotes sharing one timestamp, as in a real snapshot.
pub const QUOTES_PER_TIMESTAMP: usize = 20;

/// A directed rate update `from -> to`.
pub struct RateUpdate {
    pub from: usize,
    pub to: usize,
    pub rate: f64,
}

/// Generates a deterministic stream of rate updates around a fixed set of cross rates.
///
/// The rate is varied slightly by index so the compiler cannot fold the work away.
pub fn generate_rate_updates() -> Vec<RateUpdate> {
    let n = CURRENCIES.len();
    (0..NUM_QUOTES)
        .map(|i| {
            let from = i % n;
            let to = (from + 1 + (i / n) % (n - 1)) % n;
            let mid = (from as f64 + 1.0) / (to as f64 + 1.0);
            let wobble = ((i % 7) as f64 - 3.0) * 1e-5;
            RateUpdate {
                from,
                to,
                rate: mid * (1.0 + wobble),
            }
        })
        .collect()
}

/// Pair label in the `BASE/QUOTE` form the cycle cache is configured with.
pub fn pair_label(from: usize, to: usize) -> String {
    format!("{}/{}", CURRENCIES[from], CURRENCIES[to])
}

/// Every triangular cycle over [`CURRENCIES`], in both directions.
pub fn triangular_cycles() -> Vec<Vec<String>> {
    let n = CURRENCIES.len();
    let mut cycles = Vec::new();
    for a in 0..n {
        for b in 0..n {
            for c in 0..n {
                if a < b && a < c && b != c {
                    cycles.push(vec![pair_label(a, b), pair_label(b, c), pair_label(c, a)]);
                }
            }
        }
    }
    cycles
}
