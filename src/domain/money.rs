//! Fixed two-decimal money arithmetic.
//!
//! Every price comparison in the service goes through [`round2`] so that a
//! client-declared total and the server-computed total are compared at cent
//! precision, never as binary floats.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};

use super::errors::DomainError;

pub fn round2(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// Parse a decimal amount such as `"99.99"`. Negative amounts are rejected.
pub fn parse_amount(field: &str, raw: &str) -> Result<BigDecimal, DomainError> {
    let value = BigDecimal::from_str(raw.trim())
        .map_err(|e| DomainError::invalid(format!("{field} '{raw}' is not a decimal: {e}")))?;
    if value < BigDecimal::from(0) {
        return Err(DomainError::invalid(format!("{field} must not be negative")));
    }
    Ok(value)
}

/// `total_price * (1 - discount / 100)`, rounded to cents.
pub fn final_price(
    total_price: &BigDecimal,
    discount_percentage: &BigDecimal,
) -> Result<BigDecimal, DomainError> {
    let hundred = BigDecimal::from(100);
    if *discount_percentage < BigDecimal::from(0) || *discount_percentage > hundred {
        return Err(DomainError::invalid(
            "discount_percentage must be between 0 and 100",
        ));
    }
    if *total_price < BigDecimal::from(0) {
        return Err(DomainError::invalid("total_price must not be negative"));
    }
    let discounted =
        total_price.clone() * (hundred.clone() - discount_percentage.clone()) / hundred;
    Ok(round2(&discounted))
}

/// Convert a rupee amount to paise for the payment gateway.
pub fn to_minor_units(amount: &BigDecimal) -> Result<i64, DomainError> {
    let paise = (round2(amount) * BigDecimal::from(100)).with_scale(0);
    paise
        .to_i64()
        .ok_or_else(|| DomainError::invalid(format!("amount {amount} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    #[test]
    fn round2_rounds_half_up() {
        assert_eq!(round2(&dec("10.005")), dec("10.01"));
        assert_eq!(round2(&dec("10.004")), dec("10.00"));
        assert_eq!(round2(&dec("7")), dec("7.00"));
    }

    #[test]
    fn final_price_applies_discount() {
        assert_eq!(final_price(&dec("100"), &dec("10")).unwrap(), dec("90.00"));
        assert_eq!(final_price(&dec("499"), &dec("0")).unwrap(), dec("499.00"));
        assert_eq!(final_price(&dec("333.33"), &dec("33.33")).unwrap(), dec("222.23"));
    }

    #[test]
    fn final_price_rejects_out_of_range_discount() {
        assert!(matches!(
            final_price(&dec("100"), &dec("101")),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            final_price(&dec("100"), &dec("-1")),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn parse_amount_rejects_garbage_and_negatives() {
        assert_eq!(parse_amount("total_amount", " 99.99 ").unwrap(), dec("99.99"));
        assert!(parse_amount("total_amount", "ninety").is_err());
        assert!(parse_amount("total_amount", "-1.00").is_err());
    }

    #[test]
    fn minor_units_are_whole_paise() {
        assert_eq!(to_minor_units(&dec("100.00")).unwrap(), 10_000);
        assert_eq!(to_minor_units(&dec("99.999")).unwrap(), 10_000);
        assert_eq!(to_minor_units(&dec("0.01")).unwrap(), 1);
    }
}
