// src/noyau/calculation.rs
//
// Noeud de calcul : (gauche, opération, droite), immuable.
// La construction ne simplifie rien ; la résolution est paresseuse et mémorisée
// (nombre résolu + chaque forme de conversion).
//
// Règle de résolution :
// - '/' ou un côté rationnel -> arithmétique rationnelle exacte
// - sinon                    -> arithmétique décimale exacte
// - diviseur nul ('/' ou '%') -> CalcError::DivisionByZero

use num_rational::BigRational;
use num_traits::Zero;
use parking_lot::Mutex;

use std::fmt;
use std::sync::Arc;

use super::cache::{memo, ConversionCache};
use super::decimal::{Decimal, RoundingMode};
use super::error::Result;
use super::format::RATIONAL_DECIMAL_PLACES;
use super::json::CalcJson;
use super::number::{ExactValue, Number, NumberKind};
use super::operand::{division_by_zero, Operand, Operation};
use super::scan::TokenScan;

struct CalculationInner {
    left: Operand,
    operation: Operation,
    right: Operand,
    resolved: Mutex<Option<Number>>,
    cache: ConversionCache,
}

#[derive(Clone)]
pub struct Calculation(Arc<CalculationInner>);

impl Calculation {
    pub fn new(left: Operand, operation: Operation, right: Operand) -> Calculation {
        Calculation(Arc::new(CalculationInner {
            left,
            operation,
            right,
            resolved: Mutex::new(None),
            cache: ConversionCache::default(),
        }))
    }

    /// Analyse un texte libre : valeur seule ou arbre de calcul.
    pub fn from_string(text: &str) -> Result<Operand> {
        TokenScan::new(text).parsed()
    }

    pub fn left(&self) -> &Operand {
        &self.0.left
    }

    pub fn operation(&self) -> Operation {
        self.0.operation
    }

    pub fn right(&self) -> &Operand {
        &self.0.right
    }

    pub fn ptr_eq(&self, other: &Calculation) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Opérande -> valeur calculable. Les chaînes deviennent rationnelles (exactes,
    /// non simplifiées) pour une division, décimales sinon.
    fn operand_to_number(&self, operand: &Operand) -> Result<Number> {
        let number = match operand {
            Operand::Number(n) => n.clone(),
            other => other.resolve()?,
        };

        match number.kind() {
            NumberKind::NumericString | NumberKind::AmountString => {
                if self.0.operation == Operation::Divide {
                    Ok(Number::from_exact_rational(number.to_rational()?))
                } else {
                    Ok(Number::from_decimal(number.to_decimal()?))
                }
            }
            NumberKind::Decimal | NumberKind::Rational => Ok(number),
        }
    }

    pub fn resolve(&self) -> Result<Number> {
        memo(&self.0.resolved, || {
            let left = self.operand_to_number(&self.0.left)?.to_exact()?;
            let right = self.operand_to_number(&self.0.right)?.to_exact()?;
            let operation = self.0.operation;

            let result = match (&left, &right) {
                (ExactValue::Decimal(a), ExactValue::Decimal(b)) if operation != Operation::Divide => {
                    Number::from_decimal(decimal_op(operation, a, b)?)
                }
                _ => Number::from_rational(rational_op(
                    operation,
                    &left.to_rational(),
                    &right.to_rational(),
                )?),
            };

            log::trace!("résolu : {} = {}", self.to_string_calculation(), result);
            Ok(result)
        })
    }

    pub fn to_exact(&self) -> Result<ExactValue> {
        self.resolve()?.to_exact()
    }

    pub fn to_decimal(&self) -> Result<Decimal> {
        memo(&self.0.cache.decimal, || self.resolve()?.to_decimal())
    }

    pub fn to_rational(&self) -> Result<BigRational> {
        memo(&self.0.cache.rational, || self.resolve()?.to_rational())
    }

    pub fn to_value_string(&self) -> Result<String> {
        memo(&self.0.cache.string, || Ok(self.resolve()?.to_string()))
    }

    pub fn to_amount_string(&self) -> Result<String> {
        memo(&self.0.cache.amount, || self.resolve()?.to_amount_string())
    }

    /// JSON du calcul, après court-circuit des éléments neutres.
    pub fn to_json(&self) -> Result<CalcJson> {
        let left = self.operand_to_number(&self.0.left)?;
        let right = self.operand_to_number(&self.0.right)?;

        let (left, right) = (Operand::Number(left), Operand::Number(right));
        if let Some(short) = Calculation::maybe_short_circuit(&left, self.0.operation, &right)? {
            return short.to_json();
        }

        Ok(CalcJson::calculation(left.to_json()?, self.0.operation, right.to_json()?))
    }

    /// "gauche op droite", sous-calculs et scans entre parenthèses.
    pub fn to_string_calculation(&self) -> String {
        fn wrap(operand: &Operand) -> String {
            match operand {
                Operand::Number(n) => n.to_operand_text(),
                other => format!("({})", other.to_string_calculation()),
            }
        }

        format!("{} {} {}", wrap(&self.0.left), self.0.operation, wrap(&self.0.right))
    }

    /// Sortes des deux côtés, sans rien résoudre : "calculation / amount_string".
    pub fn resolve_type(&self) -> String {
        fn side(operand: &Operand) -> &'static str {
            match operand {
                Operand::Number(n) => n.kind().as_str(),
                Operand::Calculation(_) => "calculation",
                Operand::Scan(_) => "token_scan",
            }
        }

        format!("{} {} {}", side(&self.0.left), self.0.operation, side(&self.0.right))
    }

    /// Éléments neutres / absorbants : renvoie l’opérande inchangé (même noeud).
    pub fn maybe_short_circuit(left: &Operand, operation: Operation, right: &Operand) -> Result<Option<Operand>> {
        let short = match operation {
            Operation::Plus => {
                if left.is_zero()? {
                    Some(right)
                } else if right.is_zero()? {
                    Some(left)
                } else {
                    None
                }
            }
            Operation::Minus => {
                if right.is_zero()? {
                    Some(left)
                } else {
                    None
                }
            }
            Operation::Multiply | Operation::Times => {
                if left.is_zero()? || right.is_one()? {
                    Some(left)
                } else if right.is_zero()? || left.is_one()? {
                    Some(right)
                } else {
                    None
                }
            }
            Operation::Divide => {
                if right.is_one()? {
                    Some(left)
                } else {
                    None
                }
            }
            Operation::Modulo => None,
        };

        Ok(short.cloned())
    }

    /// Court-circuit si possible, sinon résolution immédiate en valeur.
    pub fn maybe_reduce_operands(left: Operand, operation: Operation, right: Operand) -> Result<Operand> {
        if let Some(short) = Calculation::maybe_short_circuit(&left, operation, &right)? {
            return Ok(short);
        }
        Ok(Operand::Number(Calculation::new(left, operation, right).resolve()?))
    }

    pub(crate) fn dispose(&self) {
        *self.0.resolved.lock() = None;
        self.0.cache.dispose();
    }
}

fn decimal_op(operation: Operation, a: &Decimal, b: &Decimal) -> Result<Decimal> {
    match operation {
        Operation::Plus => Ok(a + b),
        Operation::Minus => Ok(a - b),
        Operation::Multiply | Operation::Times => Ok(a * b),
        Operation::Modulo => a.checked_rem(b).ok_or_else(|| division_by_zero(operation)),
        Operation::Divide => {
            let q = rational_op(operation, &a.to_rational(), &b.to_rational())?;
            Ok(Decimal::from_rational(&q, RATIONAL_DECIMAL_PLACES, RoundingMode::HalfCeil))
        }
    }
}

fn rational_op(operation: Operation, a: &BigRational, b: &BigRational) -> Result<BigRational> {
    match operation {
        Operation::Plus => Ok(a + b),
        Operation::Minus => Ok(a - b),
        Operation::Multiply | Operation::Times => Ok(a * b),
        Operation::Divide | Operation::Modulo if b.is_zero() => Err(division_by_zero(operation)),
        Operation::Divide => Ok(a / b),
        Operation::Modulo => Ok(a % b),
    }
}

impl fmt::Debug for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Calculation")
            .field("left", &self.0.left)
            .field("operation", &self.0.operation)
            .field("right", &self.0.right)
            .finish()
    }
}
