use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

pub fn validate_solana_address(address: &str) -> bool {
    if address.len() < 32 || address.len() > 44 {
        return false;
    }
    bs58::decode(address).into_vec().is_ok()
}

/// USD amount rounded to cents for API responses.
pub fn usd(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(2)
}

/// "binance-smart-chain" -> "Binance Smart Chain"
pub fn chain_display_name(chain_id: &str) -> String {
    chain_id
        .split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_solana_address() {
        assert!(validate_solana_address("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU"));
        assert!(!validate_solana_address("not-an-address"));
        // right length, but 0 and O are not base58
        assert!(!validate_solana_address("0OKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU"));
    }

    #[test]
    fn test_usd_rounds_to_cents() {
        assert_eq!(usd(1234.5678), dec!(1234.57));
        assert_eq!(usd(f64::NAN), dec!(0));
    }

    #[test]
    fn test_chain_display_name() {
        assert_eq!(chain_display_name("solana"), "Solana");
        assert_eq!(chain_display_name("binance-smart-chain"), "Binance Smart Chain");
    }
}
