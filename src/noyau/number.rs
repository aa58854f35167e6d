// src/noyau/number.rs
//
// Valeur numérique immuable (feuille de l’arbre de calcul).
// Quatre représentations :
// - Decimal       : décimal exact
// - Rational      : rationnel exact
// - NumericString : littéral signé, pas encore normalisé
// - AmountString  : montant (<= 6 chiffres après la virgule)
//
// Zero et One sont des singletons partagés : `ptr_eq` suffit pour les reconnaître.
// Les conversions dérivées sont calculées une fois et gardées dans le noeud.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;
use regex::Regex;

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::cache::{memo, ConversionCache};
use super::decimal::{Decimal, RoundingMode};
use super::error::{CalcError, Result};
use super::format::{is_amount_string, is_numeric_string, round_off, RoundingConfig, RATIONAL_DECIMAL_PLACES};
use super::json::CalcJson;
use super::operand::Operation;
use super::rational;

static RE_RECURRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(\d+\.)(\d+r|\d*\[\d+\]r?|\d*\(\d+\)r?)$").unwrap());

static RE_LAST_DIGIT_RECURRING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d*\.\d+r$").unwrap());

static RE_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d+)\]").unwrap());

static ZERO: Lazy<Number> = Lazy::new(|| Number::from_value(NumberValue::AmountString("0".into())));

static ONE: Lazy<Number> = Lazy::new(|| Number::from_value(NumberValue::AmountString("1".into())));

/// Entrées acceptées par `Number::create`.
#[derive(Clone, Debug, PartialEq)]
pub enum Input {
    Text(String),
    Rational(BigRational),
    Decimal(Decimal),
    Float(f64),
    Integer(i64),
}

impl From<&str> for Input {
    fn from(v: &str) -> Self {
        Input::Text(v.to_string())
    }
}

impl From<String> for Input {
    fn from(v: String) -> Self {
        Input::Text(v)
    }
}

impl From<BigRational> for Input {
    fn from(v: BigRational) -> Self {
        Input::Rational(v)
    }
}

impl From<Decimal> for Input {
    fn from(v: Decimal) -> Self {
        Input::Decimal(v)
    }
}

impl From<f64> for Input {
    fn from(v: f64) -> Self {
        Input::Float(v)
    }
}

impl From<i64> for Input {
    fn from(v: i64) -> Self {
        Input::Integer(v)
    }
}

impl From<i32> for Input {
    fn from(v: i32) -> Self {
        Input::Integer(i64::from(v))
    }
}

impl From<u32> for Input {
    fn from(v: u32) -> Self {
        Input::Integer(i64::from(v))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NumberValue {
    Decimal(Decimal),
    Rational(BigRational),
    NumericString(String),
    AmountString(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberKind {
    Decimal,
    Rational,
    NumericString,
    AmountString,
}

impl NumberKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NumberKind::Decimal => "decimal",
            NumberKind::Rational => "rational",
            NumberKind::NumericString => "numeric_string",
            NumberKind::AmountString => "amount_string",
        }
    }
}

/// Forme comparable / calculable : décimal ou rationnel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExactValue {
    Decimal(Decimal),
    Rational(BigRational),
}

impl ExactValue {
    pub fn to_rational(&self) -> BigRational {
        match self {
            ExactValue::Decimal(d) => d.to_rational(),
            ExactValue::Rational(r) => r.clone(),
        }
    }

    /// Décimal contre décimal, sinon rationnel contre rationnel (exact).
    pub fn cmp_exact(&self, other: &ExactValue) -> Ordering {
        match (self, other) {
            (ExactValue::Decimal(a), ExactValue::Decimal(b)) => a.cmp(b),
            _ => self.to_rational().cmp(&other.to_rational()),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            ExactValue::Decimal(d) => d.is_zero(),
            ExactValue::Rational(r) => r.is_zero(),
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            ExactValue::Decimal(d) => *d == Decimal::one(),
            ExactValue::Rational(r) => r.is_one(),
        }
    }
}

struct NumberInner {
    value: NumberValue,
    cache: ConversionCache,
}

#[derive(Clone)]
pub struct Number(Arc<NumberInner>);

impl Number {
    fn from_value(value: NumberValue) -> Number {
        Number(Arc::new(NumberInner {
            value,
            cache: ConversionCache::default(),
        }))
    }

    pub fn zero() -> Number {
        ZERO.clone()
    }

    pub fn one() -> Number {
        ONE.clone()
    }

    /// Normalise une entrée en valeur.
    ///
    /// - "" / "0" -> Zero, "1" -> One
    /// - montant / littéral numérique -> gardé tel quel
    /// - rationnel -> simplifié à ε = 2^-52 (sauf décimal fini)
    /// - décimal, entier, flottant -> décimal
    /// - "0.3r", "0.1(3)", "0.1[23]r" ... -> rationnel périodique exact
    pub fn create(input: impl Into<Input>) -> Result<Number> {
        match input.into() {
            Input::Text(text) => Number::from_text(text),
            Input::Rational(r) => Ok(Number::from_rational(r)),
            Input::Decimal(d) => Ok(Number::from_decimal(d)),
            Input::Integer(i) => Ok(Number::from_decimal(Decimal::from_integer(BigInt::from(i)))),
            Input::Float(f) => Decimal::from_f64(f)
                .map(Number::from_decimal)
                .ok_or_else(|| CalcError::UnsupportedArgument {
                    input: f.to_string(),
                }),
        }
    }

    fn from_text(text: String) -> Result<Number> {
        if text.is_empty() || text == "0" {
            return Ok(Number::zero());
        }
        if text == "1" {
            return Ok(Number::one());
        }

        if is_amount_string(&text) {
            return Ok(Number::from_value(NumberValue::AmountString(text)));
        }
        if is_numeric_string(&text) {
            return Ok(Number::from_value(NumberValue::NumericString(text)));
        }

        if RE_RECURRING.is_match(&text) {
            let only_last_digit = RE_LAST_DIGIT_RECURRING.is_match(&text);

            let mut normalized = text.strip_suffix('r').unwrap_or(&text).to_string();

            if only_last_digit {
                // "0.13" -> "0.1(3)"
                if let Some(last) = normalized.pop() {
                    normalized.push('(');
                    normalized.push(last);
                    normalized.push(')');
                }
            } else if normalized.contains('[') {
                normalized = RE_BRACKETS.replace(&normalized, "($1)").into_owned();
            }

            if let Some(r) = rational::parse(&normalized) {
                return Ok(Number::from_value(NumberValue::Rational(r)));
            }
        }

        Err(CalcError::UnsupportedArgument { input: text })
    }

    /// Rationnel simplifié à ε près (borne la taille des dénominateurs).
    /// Un décimal fini reste exact : même valeur qu’en arithmétique décimale.
    pub fn from_rational(r: BigRational) -> Number {
        if rational::is_finite_decimal(&r) {
            return Number::from_value(NumberValue::Rational(r));
        }
        let simplified = rational::simplify(&r, &rational::default_epsilon());
        Number::from_value(NumberValue::Rational(simplified))
    }

    /// Rationnel tel quel, sans simplification (conversion exacte d’une chaîne).
    pub(crate) fn from_exact_rational(r: BigRational) -> Number {
        Number::from_value(NumberValue::Rational(r))
    }

    pub fn from_decimal(d: Decimal) -> Number {
        Number::from_value(NumberValue::Decimal(d))
    }

    pub fn value(&self) -> &NumberValue {
        &self.0.value
    }

    pub fn kind(&self) -> NumberKind {
        match &self.0.value {
            NumberValue::Decimal(_) => NumberKind::Decimal,
            NumberValue::Rational(_) => NumberKind::Rational,
            NumberValue::NumericString(_) => NumberKind::NumericString,
            NumberValue::AmountString(_) => NumberKind::AmountString,
        }
    }

    /// Même noeud (même allocation), pas seulement même valeur.
    pub fn ptr_eq(&self, other: &Number) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn to_decimal(&self) -> Result<Decimal> {
        match &self.0.value {
            NumberValue::Decimal(d) => Ok(d.clone()),
            NumberValue::Rational(r) => memo(&self.0.cache.decimal, || {
                Ok(Decimal::from_rational(
                    r,
                    RATIONAL_DECIMAL_PLACES,
                    RoundingMode::HalfCeil,
                ))
            }),
            NumberValue::NumericString(s) | NumberValue::AmountString(s) => {
                memo(&self.0.cache.decimal, || {
                    Decimal::parse(s).ok_or_else(|| CalcError::UnsupportedArgument {
                        input: s.clone(),
                    })
                })
            }
        }
    }

    pub fn to_rational(&self) -> Result<BigRational> {
        match &self.0.value {
            NumberValue::Rational(r) => Ok(r.clone()),
            NumberValue::Decimal(d) => memo(&self.0.cache.rational, || Ok(d.to_rational())),
            NumberValue::NumericString(s) | NumberValue::AmountString(s) => {
                memo(&self.0.cache.rational, || {
                    rational::parse(s).ok_or_else(|| CalcError::UnsupportedArgument {
                        input: s.clone(),
                    })
                })
            }
        }
    }

    /// Rationnel si la valeur est rationnelle, décimal sinon.
    pub fn to_exact(&self) -> Result<ExactValue> {
        match &self.0.value {
            NumberValue::Rational(r) => Ok(ExactValue::Rational(r.clone())),
            _ => Ok(ExactValue::Decimal(self.to_decimal()?)),
        }
    }

    pub fn is_zero(&self) -> Result<bool> {
        if self.ptr_eq(&ZERO) {
            return Ok(true);
        }
        Ok(self.to_exact()?.is_zero())
    }

    pub fn is_one(&self) -> Result<bool> {
        if self.ptr_eq(&ONE) {
            return Ok(true);
        }
        Ok(self.to_exact()?.is_one())
    }

    pub fn to_amount_string(&self) -> Result<String> {
        if let NumberValue::AmountString(s) = &self.0.value {
            return Ok(s.clone());
        }
        memo(&self.0.cache.amount, || {
            Ok(round_off(&self.to_exact()?, &RoundingConfig::default()))
        })
    }

    /// Comme `to_amount_string`, avec une politique d’arrondi explicite (non mémorisé).
    pub fn to_amount_string_with(&self, config: &RoundingConfig) -> Result<String> {
        if let NumberValue::AmountString(s) = &self.0.value {
            return Ok(s.clone());
        }
        Ok(round_off(&self.to_exact()?, config))
    }

    pub fn to_json(&self) -> Result<CalcJson> {
        if self.is_one()? {
            return Ok(CalcJson::number("1"));
        }
        if self.is_zero()? {
            return Ok(CalcJson::number("0"));
        }

        Ok(match &self.0.value {
            NumberValue::Rational(r) => {
                if r.denom().is_one() {
                    CalcJson::number(r.numer().to_str_radix(10))
                } else {
                    CalcJson::calculation(
                        CalcJson::number(r.numer().to_str_radix(10)),
                        Operation::Divide,
                        CalcJson::number(r.denom().to_str_radix(10)),
                    )
                }
            }
            NumberValue::Decimal(d) => CalcJson::number(d.to_string()),
            NumberValue::NumericString(s) | NumberValue::AmountString(s) => CalcJson::number(s.clone()),
        })
    }

    /// Écriture relisible dans un texte de calcul : un rationnel dont la période
    /// est trop longue pour s’écrire devient "(n / d)".
    pub(crate) fn to_operand_text(&self) -> String {
        if let NumberValue::Rational(r) = &self.0.value {
            if rational::exact_recurring_string(r).is_none() {
                return format!("({} / {})", r.numer(), r.denom());
            }
        }
        self.to_string()
    }

    pub(crate) fn dispose(&self) {
        self.0.cache.dispose();
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> &ConversionCache {
        &self.0.cache
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.value {
            NumberValue::Decimal(d) => write!(f, "{d}"),
            NumberValue::NumericString(s) | NumberValue::AmountString(s) => f.write_str(s),
            NumberValue::Rational(r) => {
                if let Some(s) = self.0.cache.string.lock().as_ref() {
                    return f.write_str(s);
                }
                let s = rational::to_recurring_string(r);
                f.write_str(&s)?;
                *self.0.cache.string.lock() = Some(s);
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Number")
            .field(&self.kind())
            .field(&self.to_string())
            .finish()
    }
}
