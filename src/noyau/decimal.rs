// src/noyau/decimal.rs
//
// Décimal exact à précision fixe : mantisse BigInt + échelle (nombre de chiffres
// après la virgule). valeur = mantisse / 10^échelle.
//
// Invariant : forme normalisée (pas de zéro final dans la mantisse si échelle > 0),
// donc l’égalité structurelle == égalité numérique.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Politique d’arrondi (explicite, jamais globale).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Demi vers +∞ (égalité => vers le haut).
    #[default]
    HalfCeil,
    /// Demi en s’éloignant de zéro.
    HalfUp,
    /// Troncature vers zéro.
    Down,
}

pub(crate) fn pow10(n: u32) -> BigInt {
    BigInt::from(10).pow(n)
}

/// q = n / d arrondi selon `mode` (d > 0).
fn round_quotient(n: &BigInt, d: &BigInt, mode: RoundingMode) -> BigInt {
    let q = n / d;
    let r = n % d;
    if r.is_zero() {
        return q;
    }

    let away = if n.is_negative() {
        &q - 1u32
    } else {
        &q + 1u32
    };

    match mode {
        RoundingMode::Down => q,
        RoundingMode::HalfUp | RoundingMode::HalfCeil => {
            let twice = r.abs() * 2u32;
            match twice.cmp(d) {
                Ordering::Less => q,
                Ordering::Greater => away,
                Ordering::Equal => {
                    if mode == RoundingMode::HalfUp || !n.is_negative() {
                        away
                    } else {
                        q
                    }
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

impl Decimal {
    pub fn new(mantissa: BigInt, scale: u32) -> Self {
        let mut mantissa = mantissa;
        let mut scale = scale;

        if mantissa.is_zero() {
            return Decimal {
                mantissa,
                scale: 0,
            };
        }

        let ten = BigInt::from(10);
        while scale > 0 && (&mantissa % &ten).is_zero() {
            mantissa /= &ten;
            scale -= 1;
        }

        Decimal { mantissa, scale }
    }

    pub fn zero() -> Self {
        Decimal::new(BigInt::zero(), 0)
    }

    pub fn one() -> Self {
        Decimal::new(BigInt::one(), 0)
    }

    pub fn from_integer(n: BigInt) -> Self {
        Decimal::new(n, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    /// Lecture stricte : `-?(\d+|\d*\.\d+|\d+\.\d+)`.
    pub fn parse(s: &str) -> Option<Decimal> {
        let (neg, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };

        if body.contains('.') && frac_part.is_empty() {
            return None;
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let digits = format!("{int_part}{frac_part}");
        let mut mantissa = BigInt::parse_bytes(digits.as_bytes(), 10)?;
        if neg {
            mantissa = -mantissa;
        }

        Some(Decimal::new(mantissa, u32::try_from(frac_part.len()).ok()?))
    }

    /// f64 -> décimal, via l’écriture la plus courte (Display de f64 n’utilise
    /// jamais d’exposant). None si NaN / infini.
    pub fn from_f64(f: f64) -> Option<Decimal> {
        if !f.is_finite() {
            return None;
        }
        Decimal::parse(&format!("{f}"))
    }

    /// r -> décimal à `places` chiffres après la virgule.
    pub fn from_rational(r: &BigRational, places: u32, mode: RoundingMode) -> Decimal {
        let scaled = r.numer() * pow10(places);
        Decimal::new(round_quotient(&scaled, r.denom(), mode), places)
    }

    pub fn to_rational(&self) -> BigRational {
        BigRational::new(self.mantissa.clone(), pow10(self.scale))
    }

    /// Arrondi à `places` chiffres après la virgule.
    pub fn round(&self, places: u32, mode: RoundingMode) -> Decimal {
        if self.scale <= places {
            return self.clone();
        }
        let divisor = pow10(self.scale - places);
        Decimal::new(round_quotient(&self.mantissa, &divisor, mode), places)
    }

    /// Reste tronqué (signe du dividende). None si diviseur nul.
    pub fn checked_rem(&self, rhs: &Decimal) -> Option<Decimal> {
        if rhs.is_zero() {
            return None;
        }
        let (a, b, scale) = align(self, rhs);
        Some(Decimal::new(a % b, scale))
    }

    /// ×10^exp (exp entier signé), exact.
    pub fn shift(&self, exp: i64) -> Option<Decimal> {
        let magnitude = u32::try_from(exp.unsigned_abs()).ok()?;
        if exp >= 0 {
            if magnitude >= self.scale {
                let m = &self.mantissa * pow10(magnitude - self.scale);
                Some(Decimal::new(m, 0))
            } else {
                Some(Decimal::new(self.mantissa.clone(), self.scale - magnitude))
            }
        } else {
            Some(Decimal::new(
                self.mantissa.clone(),
                self.scale.checked_add(magnitude)?,
            ))
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        self.to_string().parse::<f64>().ok().or_else(|| {
            let r = self.to_rational();
            Some(r.numer().to_f64()? / r.denom().to_f64()?)
        })
    }
}

fn align(a: &Decimal, b: &Decimal) -> (BigInt, BigInt, u32) {
    match a.scale.cmp(&b.scale) {
        Ordering::Equal => (a.mantissa.clone(), b.mantissa.clone(), a.scale),
        Ordering::Less => (
            &a.mantissa * pow10(b.scale - a.scale),
            b.mantissa.clone(),
            b.scale,
        ),
        Ordering::Greater => (
            a.mantissa.clone(),
            &b.mantissa * pow10(a.scale - b.scale),
            a.scale,
        ),
    }
}

impl Add for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        let (a, b, scale) = align(self, rhs);
        Decimal::new(a + b, scale)
    }
}

impl Sub for &Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &Decimal) -> Decimal {
        let (a, b, scale) = align(self, rhs);
        Decimal::new(a - b, scale)
    }
}

impl Mul for &Decimal {
    type Output = Decimal;

    fn mul(self, rhs: &Decimal) -> Decimal {
        Decimal::new(&self.mantissa * &rhs.mantissa, self.scale + rhs.scale)
    }
}

impl Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal::new(-&self.mantissa, self.scale)
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b, _) = align(self, other);
        a.cmp(&b)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Écriture à virgule fixe, sans exposant ni zéro final.
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let neg = self.mantissa.is_negative();
        let digits = self.mantissa.abs().to_str_radix(10);
        let scale = self.scale as usize;

        let sign = if neg { "-" } else { "" };

        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }

        let mut digits = digits;
        while digits.len() <= scale {
            digits.insert(0, '0');
        }
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);

        write!(f, "{sign}{int_part}.{frac_part}")
    }
}
