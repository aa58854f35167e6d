// src/noyau/operand.rs
//
// Opérande = union fermée des trois sortes de noeuds :
// - Number      : valeur (feuille)
// - Calculation : (gauche, opération, droite), résolu paresseusement
// - TokenScan   : texte libre, analysé à la demande
//
// Toutes les capacités (comparaisons, arithmétique, conversions, JSON) passent
// par `Operand` avec un match exhaustif. Pas de mutation : chaque opération
// renvoie un opérande (éventuellement le receveur lui-même, cf. ptr_eq).

use num_rational::BigRational;
use serde::{Deserialize, Serialize};

use std::cmp::Ordering;
use std::fmt;

use super::calculation::Calculation;
use super::decimal::Decimal;
use super::error::{CalcError, Result, ScanError};
use super::format::RoundingConfig;
use super::json::CalcJson;
use super::number::{ExactValue, Input, Number, NumberKind};
use super::scan::TokenScan;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "*")]
    Multiply,
    /// Même sens que `*` ("3 x 5").
    #[serde(rename = "x")]
    Times,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Modulo,
}

impl Operation {
    pub fn from_symbol(symbol: &str) -> Result<Operation, ScanError> {
        match symbol {
            "+" => Ok(Operation::Plus),
            "-" => Ok(Operation::Minus),
            "*" => Ok(Operation::Multiply),
            "x" => Ok(Operation::Times),
            "/" => Ok(Operation::Divide),
            "%" => Ok(Operation::Modulo),
            other => Err(ScanError::InvalidOperation {
                found: other.to_string(),
            }),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operation::Plus => '+',
            Operation::Minus => '-',
            Operation::Multiply => '*',
            Operation::Times => 'x',
            Operation::Divide => '/',
            Operation::Modulo => '%',
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Sorte d’opérande (diagnostic, `resolve_type`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandKind {
    Number(NumberKind),
    Calculation,
    TokenScan,
}

#[derive(Clone, Debug)]
pub enum Operand {
    Number(Number),
    Calculation(Calculation),
    Scan(TokenScan),
}

impl From<Number> for Operand {
    fn from(v: Number) -> Self {
        Operand::Number(v)
    }
}

impl From<Calculation> for Operand {
    fn from(v: Calculation) -> Self {
        Operand::Calculation(v)
    }
}

impl From<TokenScan> for Operand {
    fn from(v: TokenScan) -> Self {
        Operand::Scan(v)
    }
}

/// Argument d’une opération : un opérande existant (réutilisé tel quel)
/// ou une entrée brute (normalisée par `Number::create`).
#[derive(Clone, Debug)]
pub enum MathValue {
    Operand(Operand),
    Input(Input),
}

macro_rules! math_value_depuis_operande {
    ($($t:ty),*) => {
        $(
            impl From<$t> for MathValue {
                fn from(v: $t) -> Self {
                    MathValue::Operand(Operand::from(v))
                }
            }

            impl From<&$t> for MathValue {
                fn from(v: &$t) -> Self {
                    MathValue::Operand(Operand::from(v.clone()))
                }
            }
        )*
    };
}

macro_rules! math_value_depuis_entree {
    ($($t:ty),*) => {
        $(
            impl From<$t> for MathValue {
                fn from(v: $t) -> Self {
                    MathValue::Input(Input::from(v))
                }
            }
        )*
    };
}

math_value_depuis_operande!(Number, Calculation, TokenScan);
math_value_depuis_entree!(&str, String, BigRational, Decimal, f64, i64, i32, u32);

impl From<Operand> for MathValue {
    fn from(v: Operand) -> Self {
        MathValue::Operand(v)
    }
}

impl From<&Operand> for MathValue {
    fn from(v: &Operand) -> Self {
        MathValue::Operand(v.clone())
    }
}

impl From<Input> for MathValue {
    fn from(v: Input) -> Self {
        MathValue::Input(v)
    }
}

impl Operand {
    /// Un opérande est réutilisé (même noeud), une entrée brute est normalisée.
    pub fn reuse_or_create(value: impl Into<MathValue>) -> Result<Operand> {
        match value.into() {
            MathValue::Operand(o) => Ok(o),
            MathValue::Input(i) => Ok(Operand::Number(Number::create(i)?)),
        }
    }

    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Number(n) => OperandKind::Number(n.kind()),
            Operand::Calculation(_) => OperandKind::Calculation,
            Operand::Scan(_) => OperandKind::TokenScan,
        }
    }

    /// Même noeud (même allocation).
    pub fn ptr_eq(&self, other: &Operand) -> bool {
        match (self, other) {
            (Operand::Number(a), Operand::Number(b)) => a.ptr_eq(b),
            (Operand::Calculation(a), Operand::Calculation(b)) => a.ptr_eq(b),
            (Operand::Scan(a), Operand::Scan(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /* ---------------- résolution / conversions ---------------- */

    pub fn resolve(&self) -> Result<Number> {
        match self {
            Operand::Number(n) => Ok(n.clone()),
            Operand::Calculation(c) => c.resolve(),
            Operand::Scan(s) => s.resolve(),
        }
    }

    pub fn to_exact(&self) -> Result<ExactValue> {
        match self {
            Operand::Number(n) => n.to_exact(),
            Operand::Calculation(c) => c.to_exact(),
            Operand::Scan(s) => s.parsed()?.to_exact(),
        }
    }

    pub fn to_decimal(&self) -> Result<Decimal> {
        match self {
            Operand::Number(n) => n.to_decimal(),
            Operand::Calculation(c) => c.to_decimal(),
            Operand::Scan(s) => s.parsed()?.to_decimal(),
        }
    }

    pub fn to_rational(&self) -> Result<BigRational> {
        match self {
            Operand::Number(n) => n.to_rational(),
            Operand::Calculation(c) => c.to_rational(),
            Operand::Scan(s) => s.parsed()?.to_rational(),
        }
    }

    /// Écriture de la valeur résolue ("0.(3)", "1.5", ...).
    pub fn to_value_string(&self) -> Result<String> {
        match self {
            Operand::Number(n) => Ok(n.to_string()),
            Operand::Calculation(c) => c.to_value_string(),
            Operand::Scan(s) => s.parsed()?.to_value_string(),
        }
    }

    pub fn to_amount_string(&self) -> Result<String> {
        match self {
            Operand::Number(n) => n.to_amount_string(),
            Operand::Calculation(c) => c.to_amount_string(),
            Operand::Scan(s) => s.parsed()?.to_amount_string(),
        }
    }

    pub fn to_amount_string_with(&self, config: &RoundingConfig) -> Result<String> {
        self.resolve()?.to_amount_string_with(config)
    }

    /// Écriture du calcul lui-même (sous-calculs entre parenthèses).
    pub fn to_string_calculation(&self) -> String {
        match self {
            Operand::Number(n) => n.to_string(),
            Operand::Calculation(c) => c.to_string_calculation(),
            Operand::Scan(s) => s.to_string_calculation(),
        }
    }

    pub fn resolve_type(&self) -> Result<String> {
        match self {
            Operand::Number(n) => Ok(n.kind().as_str().to_string()),
            Operand::Calculation(c) => Ok(c.resolve_type()),
            Operand::Scan(s) => s.parsed()?.resolve_type(),
        }
    }

    pub fn to_json(&self) -> Result<CalcJson> {
        match self {
            Operand::Number(n) => n.to_json(),
            Operand::Calculation(c) => c.to_json(),
            Operand::Scan(s) => Ok(s.to_json()),
        }
    }

    /// Vide les caches de conversion du noeud (un scan oublie son arbre analysé).
    pub fn dispose(&self) {
        log::trace!("libération des caches : {}", self.to_string_calculation());
        match self {
            Operand::Number(n) => n.dispose(),
            Operand::Calculation(c) => c.dispose(),
            Operand::Scan(s) => s.reset_parsed(),
        }
    }

    /* ---------------- comparaisons ---------------- */

    /// Exacte : rationnelle dès qu’un des deux côtés est rationnel.
    pub fn compare(&self, value: impl Into<MathValue>) -> Result<Ordering> {
        let other = Operand::reuse_or_create(value)?;
        if let Operand::Scan(s) = self {
            return s.parsed()?.compare(other);
        }
        Ok(self.to_exact()?.cmp_exact(&other.to_exact()?))
    }

    pub fn is_less_than(&self, value: impl Into<MathValue>) -> Result<bool> {
        Ok(self.compare(value)? == Ordering::Less)
    }

    pub fn is_greater_than(&self, value: impl Into<MathValue>) -> Result<bool> {
        Ok(self.compare(value)? == Ordering::Greater)
    }

    pub fn is_zero(&self) -> Result<bool> {
        match self {
            Operand::Number(n) => n.is_zero(),
            Operand::Calculation(c) => c.resolve()?.is_zero(),
            Operand::Scan(s) => s.is_zero(),
        }
    }

    pub fn is_one(&self) -> Result<bool> {
        match self {
            Operand::Number(n) => n.is_one(),
            Operand::Calculation(c) => c.resolve()?.is_one(),
            Operand::Scan(s) => s.is_one(),
        }
    }

    /// |x| : zéro et positifs renvoient le receveur, négatifs -> 0 - x.
    pub fn abs(&self) -> Result<Operand> {
        if let Operand::Scan(s) = self {
            return s.parsed()?.abs();
        }
        if self.is_zero()? || !self.is_less_than(0)? {
            return Ok(self.clone());
        }
        Operand::Number(Number::zero()).minus(self)
    }

    /// Plus grand parmi le receveur et `values` (le premier gagne à égalité).
    pub fn max<I, V>(&self, values: I) -> Result<Operand>
    where
        I: IntoIterator<Item = V>,
        V: Into<MathValue>,
    {
        self.fold_extreme(values, Ordering::Less)
    }

    pub fn min<I, V>(&self, values: I) -> Result<Operand>
    where
        I: IntoIterator<Item = V>,
        V: Into<MathValue>,
    {
        self.fold_extreme(values, Ordering::Greater)
    }

    fn fold_extreme<I, V>(&self, values: I, replace_when: Ordering) -> Result<Operand>
    where
        I: IntoIterator<Item = V>,
        V: Into<MathValue>,
    {
        let mut best = match self {
            Operand::Scan(s) => s.parsed()?,
            _ => self.clone(),
        };
        for v in values {
            let candidate = Operand::reuse_or_create(v)?;
            if best.compare(&candidate)? == replace_when {
                best = candidate;
            }
        }
        Ok(best)
    }

    /* ---------------- arithmétique ---------------- */

    pub fn plus(&self, value: impl Into<MathValue>) -> Result<Operand> {
        self.apply(Operation::Plus, value)
    }

    pub fn minus(&self, value: impl Into<MathValue>) -> Result<Operand> {
        self.apply(Operation::Minus, value)
    }

    pub fn times(&self, value: impl Into<MathValue>) -> Result<Operand> {
        self.apply(Operation::Times, value)
    }

    pub fn divide(&self, value: impl Into<MathValue>) -> Result<Operand> {
        self.apply(Operation::Divide, value)
    }

    pub fn modulo(&self, value: impl Into<MathValue>) -> Result<Operand> {
        self.apply(Operation::Modulo, value)
    }

    /// Valeur/calcul : résolution immédiate (avec courts-circuits).
    /// Scan : nouveau scan différé, sauf élément neutre.
    pub fn apply(&self, operation: Operation, value: impl Into<MathValue>) -> Result<Operand> {
        match self {
            Operand::Scan(s) => Ok(Operand::Scan(s.apply(operation, value)?)),
            _ => {
                if operation == Operation::Plus && self.is_zero()? {
                    return Operand::reuse_or_create(value);
                }
                let right = Operand::reuse_or_create(value)?;
                Calculation::maybe_reduce_operands(self.clone(), operation, right)
            }
        }
    }

    /// Comme `apply`, puis libère les caches du receveur s’il n’est pas le résultat.
    pub fn do_math_then_dispose(&self, operation: Operation, value: impl Into<MathValue>) -> Result<Operand> {
        if let Operand::Scan(s) = self {
            let parsed = s.parsed()?;
            let result = parsed.do_math_then_dispose(operation, value);
            s.reset_parsed();
            return result;
        }

        let result = self.apply(operation, value)?;
        if !result.ptr_eq(self) {
            self.dispose();
        }
        Ok(result)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_value_string() {
            Ok(s) => f.write_str(&s),
            Err(_) => f.write_str(&self.to_string_calculation()),
        }
    }
}

/// Raccourci : division par zéro sur `operation`.
pub(crate) fn division_by_zero(operation: Operation) -> CalcError {
    CalcError::DivisionByZero {
        operation: operation.symbol(),
    }
}
