use forex_arb_core::GraphArbitrageDetector;
use proptest::prelude::*;

const CURRENCIES: [&str; 3] = ["USD", "EUR", "GBP"];

/// Every directed edge between three currencies, each optionally quoted.
const EDGES: [(usize, usize); 6] = [(0, 1), (1, 0), (0, 2), (2, 0), (1, 2), (2, 1)];

/// All simple cycles over three nodes.
const SIMPLE_CYCLES: [&[(usize, usize)]; 5] = [
    &[(0, 1), (1, 0)],
    &[(0, 2), (2, 0)],
    &[(1, 2), (2, 1)],
    &[(0, 1), (1, 2), (2, 0)],
    &[(0, 2), (2, 1), (1, 0)],
];

fn quotes_strategy() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.8, 0.5f64..2.0), EDGES.len())
}

fn quoted_rate(quotes: &[Option<f64>], edge: (usize, usize)) -> Option<f64> {
    let idx = EDGES.iter().position(|&e| e == edge)?;
    quotes[idx]
}

/// Products of every fully quoted simple cycle.
fn cycle_products(quotes: &[Option<f64>]) -> Vec<f64> {
    SIMPLE_CYCLES
        .iter()
        .filter_map(|cycle| {
            cycle
                .iter()
                .map(|&edge| quoted_rate(quotes, edge))
                .product::<Option<f64>>()
        })
        .collect()
}

fn build(quotes: &[Option<f64>]) -> GraphArbitrageDetector {
    let mut detector = GraphArbitrageDetector::new(CURRENCIES).unwrap();
    for (&(from, to), quote) in EDGES.iter().zip(quotes) {
        if let Some(rate) = quote {
            detector.update(CURRENCIES[from], CURRENCIES[to], *rate).unwrap();
        }
    }
    detector
}

proptest! {
    /// Property: Bellman-Ford agrees with brute-force enumeration of simple cycles.
    #[test]
    fn detection_matches_brute_force(quotes in quotes_strategy()) {
        let products = cycle_products(&quotes);
        prop_assume!(products.iter().all(|p| (p - 1.0).abs() > 1e-9));

        let mut detector = build(&quotes);
        let expected = products.iter().any(|&p| p > 1.0);

        prop_assert_eq!(detector.is_arbitrage_possible(), expected);
        prop_assert_eq!(detector.find_arbitrage_opportunity().unwrap().is_some(), expected);
    }

    /// Property: a reported opportunity is a real, fully quoted, profitable cycle.
    #[test]
    fn reported_cycle_uses_quoted_rates(quotes in quotes_strategy()) {
        let mut detector = build(&quotes);
        let Some(opportunity) = detector.find_arbitrage_opportunity().unwrap() else {
            return Ok(());
        };

        prop_assert!(opportunity.profit > 1.0);
        prop_assert_eq!(opportunity.currencies.len(), opportunity.cycle.path.len());

        let n = opportunity.currencies.len();
        let mut product = 1.0;
        for i in 0..n {
            let (from, to) = (&opportunity.currencies[i], &opportunity.currencies[(i + 1) % n]);
            let rate = detector.rate(from, to).unwrap();
            prop_assert!(rate.is_some(), "cycle uses an unquoted edge {} -> {}", from, to);
            product *= rate.unwrap();
        }
        prop_assert!((product - opportunity.profit).abs() < 1e-9);
    }

    /// Property: repeated queries without updates give the same answer.
    #[test]
    fn queries_are_idempotent(quotes in quotes_strategy()) {
        let mut detector = build(&quotes);

        let first = detector.is_arbitrage_possible();
        let found = detector.find_arbitrage_opportunity().unwrap();
        prop_assert_eq!(detector.is_arbitrage_possible(), first);
        prop_assert_eq!(detector.find_arbitrage_opportunity().unwrap(), found);
    }
}
