//! Tithe and donation intents.
//!
//! A contribution only records the intent to give; no payment is processed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

use super::user::UserSummary;

/// A currency amount in BRL, stored as integer cents.
///
/// Serialized as a plain JSON number in reais (2550 cents becomes `25.5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid amount: {0}")]
    Invalid(String),
    #[error("amount has more than two decimal places")]
    TooPrecise,
}

impl Amount {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Some(Self((value * 100.0).round() as i64))
    }

    fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parses `50`, `50.5`, `50.50` and the Brazilian `50,50`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches("R$").trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }

        let normalized = s.replace(',', ".");
        let (negative, digits) = match normalized.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, normalized.as_str()),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if frac.len() > 2 {
            return Err(AmountError::TooPrecise);
        }
        let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(frac) {
            return Err(AmountError::Invalid(s.to_string()));
        }

        let whole: i64 = whole
            .parse()
            .map_err(|_| AmountError::Invalid(s.to_string()))?;
        let frac_cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().unwrap_or(0) * 10,
            _ => frac.parse::<i64>().unwrap_or(0),
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .ok_or_else(|| AmountError::Invalid(s.to_string()))?;

        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "R$ {}{},{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Amount::from_f64(n)
                .ok_or_else(|| serde::de::Error::custom("amount is not a finite number")),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "PIX", alias = "pix", alias = "Pix")]
    Pix,
    #[serde(alias = "card", alias = "Cartão de Crédito", alias = "Cartão")]
    Card,
    #[serde(alias = "boleto")]
    Boleto,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Card => "Card",
            PaymentMethod::Boleto => "Boleto",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pix" => Ok(PaymentMethod::Pix),
            "card" | "cartao" | "cartão" => Ok(PaymentMethod::Card),
            "boleto" => Ok(PaymentMethod::Boleto),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

/// Lifecycle of a contribution. Only `Pending` is ever produced by the
/// client; anything the server reports beyond that is carried through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributionStatus {
    #[serde(alias = "pending", alias = "Pendente")]
    Pending,
    #[serde(alias = "confirmed", alias = "Confirmada", alias = "Confirmado")]
    Confirmed,
    #[serde(alias = "cancelled", alias = "Cancelada", alias = "Cancelado")]
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    #[serde(alias = "ID")]
    pub id: u64,
    #[serde(default, alias = "User")]
    pub user: Option<UserSummary>,
    pub value: Amount,
    pub method: PaymentMethod,
    pub status: ContributionStatus,
    #[serde(default, alias = "createdAt", alias = "CreatedAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/contributions`
#[derive(Debug, Clone, Serialize)]
pub struct NewContribution {
    pub value: Amount,
    pub method: PaymentMethod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_parsing() {
        assert_eq!("50".parse::<Amount>().unwrap().cents(), 5000);
        assert_eq!("50.5".parse::<Amount>().unwrap().cents(), 5050);
        assert_eq!("50,25".parse::<Amount>().unwrap().cents(), 5025);
        assert_eq!("R$ 10,00".parse::<Amount>().unwrap().cents(), 1000);
        assert_eq!("-3".parse::<Amount>().unwrap().cents(), -300);
    }

    #[test]
    fn test_amount_parsing_rejects_garbage() {
        assert_eq!("".parse::<Amount>(), Err(AmountError::Empty));
        assert_eq!("1.234".parse::<Amount>(), Err(AmountError::TooPrecise));
        assert!(matches!("abc".parse::<Amount>(), Err(AmountError::Invalid(_))));
        assert!(matches!(".50".parse::<Amount>(), Err(AmountError::Invalid(_))));
    }

    #[test]
    fn test_amount_wire_format() {
        let json = serde_json::to_string(&Amount::from_cents(2550)).unwrap();
        assert_eq!(json, "25.5");

        let parsed: Amount = serde_json::from_str("19.99").unwrap();
        assert_eq!(parsed.cents(), 1999);
        let parsed: Amount = serde_json::from_str(r#""12,30""#).unwrap();
        assert_eq!(parsed.cents(), 1230);
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::from_cents(123456).to_string(), "R$ 1234,56");
        assert_eq!(Amount::from_cents(5).to_string(), "R$ 0,05");
    }

    #[test]
    fn test_payment_method_names() {
        assert_eq!("pix".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
        assert_eq!(serde_json::to_string(&PaymentMethod::Pix).unwrap(), r#""PIX""#);
        let m: PaymentMethod = serde_json::from_str(r#""Cartão de Crédito""#).unwrap();
        assert_eq!(m, PaymentMethod::Card);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_unknown_contribution_status_is_kept() {
        let c: Contribution = serde_json::from_str(
            r#"{"id":1,"value":10,"method":"PIX","status":"Estornada"}"#,
        )
        .unwrap();
        assert_eq!(c.status, ContributionStatus::Unknown);
        assert_eq!(c.value.cents(), 1000);
    }
}
