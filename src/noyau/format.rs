// src/noyau/format.rs
//
// Chaînes numériques + arrondi "montant".
//
// - amount_string  : entier, ou au plus 6 chiffres après la virgule (forme d’affichage)
// - numeric_string : littéral décimal signé, sans limite de chiffres
// - round_off      : décimal / rationnel -> amount_string, avec une politique
//                    d’arrondi EXPLICITE (pas d’état global)

use num_bigint::BigInt;
use once_cell::sync::Lazy;
use regex::Regex;

use super::decimal::{pow10, Decimal, RoundingMode};
use super::error::{CalcError, Result};
use super::number::ExactValue;

/// Chiffres après la virgule pour écrire un rationnel en décimal.
pub const RATIONAL_DECIMAL_PLACES: u32 = 20;

static RE_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+(?:\.\d{1,6})?|\d*\.\d{1,6})$").unwrap());

static RE_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(?:\d*\.\d+|\d+(?:\.\d+)?)$").unwrap());

/// Politique d’arrondi des montants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundingConfig {
    /// Précision de travail pour les décimaux (avant la règle du 7e chiffre).
    pub working_places: u32,
    /// Chiffres conservés après la virgule dans un montant.
    pub amount_places: u32,
    pub mode: RoundingMode,
}

impl Default for RoundingConfig {
    fn default() -> Self {
        RoundingConfig {
            working_places: 7,
            amount_places: 6,
            mode: RoundingMode::HalfCeil,
        }
    }
}

pub fn is_amount_string(maybe: &str) -> bool {
    RE_AMOUNT.is_match(maybe)
}

pub fn is_numeric_string(maybe: &str) -> bool {
    is_amount_string(maybe) || RE_NUMERIC.is_match(maybe)
}

/// Constructeur validant : renvoie la chaîne telle quelle si c’est un montant.
pub fn amount_string(maybe: &str) -> Result<&str> {
    if is_amount_string(maybe) {
        Ok(maybe)
    } else {
        Err(CalcError::NotAnAmountString {
            input: maybe.to_string(),
        })
    }
}

/// Décimal ou rationnel -> montant.
///
/// Exemples (config par défaut) :
///   20/65        -> "0.307693"
///   22.0000001   -> "22.000001"
///   22.00000001  -> "22"
pub fn round_off(value: &ExactValue, config: &RoundingConfig) -> String {
    let text = match value {
        ExactValue::Decimal(d) => d.round(config.working_places, config.mode).to_string(),
        ExactValue::Rational(r) => {
            Decimal::from_rational(r, RATIONAL_DECIMAL_PLACES, config.mode).to_string()
        }
    };

    cap_fraction(&text, config.amount_places as usize)
}

/// Règle du chiffre suivant : au-delà de `places` chiffres, le chiffre suivant
/// décide. '0' => troncature ; sinon => +1 sur le préfixe (avec retenue vers la
/// partie entière). Zéros finaux retirés dans les deux cas.
fn cap_fraction(text: &str, places: usize) -> String {
    let (neg, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let Some((before, after)) = body.split_once('.') else {
        return text.to_string();
    };
    if after.len() <= places {
        return text.to_string();
    }

    let kept = &after[..places];
    let (int_part, frac_part) = if after.as_bytes()[places] == b'0' {
        (before.to_string(), kept.trim_end_matches('0').to_string())
    } else {
        let limit = pow10(places as u32);
        let bumped = digits_value(kept) + 1u32;

        if bumped >= limit {
            // retenue : 0.9999995 -> 1
            ((digits_value(before) + 1u32).to_str_radix(10), String::new())
        } else {
            let mut frac = bumped.to_str_radix(10);
            while frac.len() < places {
                frac.insert(0, '0');
            }
            (before.to_string(), frac.trim_end_matches('0').to_string())
        }
    };

    let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.is_empty();
    let sign = if neg && !is_zero { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_part}")
    }
}

fn digits_value(digits: &str) -> BigInt {
    if digits.is_empty() {
        return BigInt::from(0);
    }
    BigInt::parse_bytes(digits.as_bytes(), 10).unwrap_or_default()
}
