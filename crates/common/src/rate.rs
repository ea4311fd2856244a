use super::error::Error;

/// A cycle whose rate product is strictly above this value returns more than it started with.
pub const BREAKEVEN: f64 = 1.0;

/// Accepts a rate only if it is finite and strictly positive.
///
/// Anything else has no meaningful logarithm and would poison the graph weights or the
/// cached cycle products.
pub fn validate_rate(rate: f64) -> Result<f64, Error> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(Error::InvalidRate(rate))
    }
}

/// Edge weight for an exchange rate: `-ln(rate)`.
///
/// A product of rates above 1.0 along a cycle maps to a negative sum of weights.
pub fn log_weight(rate: f64) -> f64 {
    -rate.ln()
}

/// Inverse of [`log_weight`].
pub fn rate_from_weight(weight: f64) -> f64 {
    (-weight).exp()
}

/// Multiplies rates in sequence order.
///
/// Returns `None` as soon as any rate is undefined, so a single missing quote leaves the
/// whole product undefined.
pub fn cycle_product<I>(rates: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut product = 1.0;
    for rate in rates {
        product *= rate?;
    }
    Some(product)
}

/// True iff the profit is defined and strictly above [`BREAKEVEN`].
pub fn is_profitable(profit: Option<f64>) -> bool {
    profit.is_some_and(|p| p > BREAKEVEN)
}

#[cfg(test)]
mod rate_tests {
    use super::*;

    fn assert_approx_eq(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{} is not approximately equal to {}", a, b);
    }

    #[test]
    fn validate_rate_rejects_non_positive_and_non_finite() {
        assert_eq!(validate_rate(1.25), Ok(1.25));
        assert_eq!(validate_rate(0.0), Err(Error::InvalidRate(0.0)));
        assert_eq!(validate_rate(-2.0), Err(Error::InvalidRate(-2.0)));
        assert_eq!(
            validate_rate(f64::INFINITY),
            Err(Error::InvalidRate(f64::INFINITY))
        );
        assert!(validate_rate(f64::NAN).is_err());
    }

    #[test]
    fn log_weight_round_trips_through_rate_from_weight() {
        assert_approx_eq(rate_from_weight(log_weight(1.37)), 1.37);
        assert_eq!(log_weight(1.0), 0.0);
        assert!(log_weight(1.01) < 0.0);
        assert!(log_weight(0.99) > 0.0);
    }

    /// A profitable product corresponds to a negative weight sum.
    #[test]
    fn profitable_product_has_negative_weight_sum() {
        let rates = [0.8, 1.3, 0.97];
        let product: f64 = rates.iter().product();
        let weight_sum: f64 = rates.iter().map(|&r| log_weight(r)).sum();

        assert!(product > BREAKEVEN);
        assert!(weight_sum < 0.0);
        assert_approx_eq(rate_from_weight(weight_sum), product);
    }

    #[test]
    fn cycle_product_multiplies_defined_rates() {
        assert_eq!(cycle_product([Some(2.0), Some(3.0), Some(0.5)]), Some(3.0));
        assert_eq!(cycle_product(std::iter::empty()), Some(1.0));
    }

    #[test]
    fn cycle_product_is_undefined_when_any_rate_is_undefined() {
        assert_eq!(cycle_product([Some(2.0), None, Some(0.5)]), None);
        assert_eq!(cycle_product([None]), None);
    }

    #[test]
    fn profitability_is_strictly_above_breakeven() {
        assert!(!is_profitable(None));
        assert!(!is_profitable(Some(1.0)));
        assert!(!is_profitable(Some(0.99)));
        assert!(is_profitable(Some(1.0001)));
    }
}
