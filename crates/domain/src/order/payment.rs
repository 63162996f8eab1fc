use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// How the customer settles an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Card,
    #[serde(rename = "EFT")]
    Eft,
    /// Account credit. Requires a signed contract document at checkout.
    Credit,
}

impl PaymentMethod {
    /// Returns true if checkout must collect a contract document.
    pub fn requires_contract(&self) -> bool {
        matches!(self, PaymentMethod::Credit)
    }

    /// Returns the method name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Eft => "EFT",
            PaymentMethod::Credit => "Credit",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "eft" => Ok(PaymentMethod::Eft),
            "credit" => Ok(PaymentMethod::Credit),
            _ => Err(DomainError::InvalidPaymentMethod(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("credit".parse::<PaymentMethod>().unwrap(), PaymentMethod::Credit);
        assert_eq!(" EFT ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Eft);
        assert_eq!("Card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
    }

    #[test]
    fn rejects_unknown_methods() {
        let err = "bitcoin".parse::<PaymentMethod>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidPaymentMethod(ref m) if m == "bitcoin"));
    }

    #[test]
    fn only_credit_requires_contract() {
        assert!(PaymentMethod::Credit.requires_contract());
        assert!(!PaymentMethod::Cash.requires_contract());
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Eft).unwrap(),
            "\"EFT\""
        );
    }
}
