use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::AmortizationError;
use crate::types::{Money, Rate};
use crate::AmortizationResult;

/// `(1 + rate)^nper`, or `None` when the result leaves the decimal range.
pub fn compound_factor(rate: Rate, nper: u32) -> Option<Decimal> {
    Decimal::ONE.checked_add(rate)?.checked_powi(i64::from(nper))
}

fn overflow() -> AmortizationError {
    AmortizationError::Overflow {
        context: "level installment".into(),
    }
}

/// Level installment (PMT) that fully amortizes `principal` over `nper`
/// periods at `rate` per period:
///
/// `principal * r * (1+r)^n / ((1+r)^n - 1)`, or `principal / n` when `r = 0`.
///
/// Evaluated as `principal * r / (1 - (1+r)^-n)` so the large factor is
/// never multiplied into the principal. If `(1+r)^n` overflows, the
/// discount term is indistinguishable from zero and the installment is the
/// limit `principal * r`.
pub fn level_installment(principal: Money, rate: Rate, nper: u32) -> AmortizationResult<Money> {
    if nper == 0 {
        return Err(AmortizationError::InvalidInput {
            field: "term_months".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if rate < Decimal::ZERO {
        return Err(AmortizationError::InvalidInput {
            field: "rate".into(),
            reason: "Periodic rate must be non-negative".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = match compound_factor(rate, nper) {
        Some(f) => f,
        None => return principal.checked_mul(rate).ok_or_else(overflow),
    };

    let annuity_denominator = Decimal::ONE - Decimal::ONE / factor;
    if annuity_denominator.is_zero() {
        return Err(AmortizationError::InvalidInput {
            field: "rate".into(),
            reason: "Rate too small to distinguish from zero".into(),
        });
    }

    principal
        .checked_mul(rate)
        .and_then(|interest| interest.checked_div(annuity_denominator))
        .ok_or_else(overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_level_installment_matches_annuity_formula() {
        let result = level_installment(dec!(1_200_000), dec!(0.035), 12).unwrap();
        // 1,200,000 * 0.035 * 1.035^12 / (1.035^12 - 1) = 124,180.739...
        assert!((result - dec!(124180.7391)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_level_installment_zero_rate() {
        let result = level_installment(dec!(1000), Decimal::ZERO, 4).unwrap();
        assert_eq!(result, dec!(250));
    }

    #[test]
    fn test_level_installment_single_period() {
        let result = level_installment(dec!(1000), dec!(0.05), 1).unwrap();
        assert!((result - dec!(1050)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_level_installment_overflowing_factor_uses_limit() {
        // 3^360 is far beyond the 96-bit decimal mantissa
        let result = level_installment(dec!(1000), dec!(2), 360).unwrap();
        assert_eq!(result, dec!(2000));
    }

    #[test]
    fn test_level_installment_rejects_zero_periods() {
        assert!(level_installment(dec!(1000), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_level_installment_reports_overflow() {
        // MAX * 2 is out of range both with and without an overflowing factor
        let err = level_installment(Decimal::MAX, dec!(2), 12).unwrap_err();
        assert!(matches!(err, AmortizationError::Overflow { .. }));
        assert!(level_installment(Decimal::MAX, dec!(2), 360).is_err());
    }

    #[test]
    fn test_compound_factor() {
        assert_eq!(compound_factor(dec!(0.1), 2), Some(dec!(1.21)));
        assert_eq!(compound_factor(dec!(0.5), 0), Some(Decimal::ONE));
        assert_eq!(compound_factor(Decimal::MAX, 2), None);
    }
}
