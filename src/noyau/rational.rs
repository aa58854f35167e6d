// src/noyau/rational.rs
//
// Outils rationnels (BigRational) :
// - lecture d’un décimal, éventuellement périodique : "1.1(23)", "-0.(3)", ".5"
// - simplification bornée (plus petite réduite à ε près)
// - écriture avec période entre parenthèses : 4/3 -> "1.(3)"

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use once_cell::sync::Lazy;
use regex::Regex;

use std::collections::HashMap;

use super::decimal::pow10;

/// Au-delà, la période n’est plus cherchée (écriture tronquée).
const MAX_CYCLE_DIGITS: usize = 2000;

/// Chiffres écrits quand la période est trop longue.
const TRUNCATED_DIGITS: usize = 15;

static RE_DECIMAL_PERIODIQUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?)(\d*)(?:\.(\d*)(?:\((\d+)\))?)?$").unwrap()
});

/// ε = 2^-52 : borne la croissance des dénominateurs.
pub fn default_epsilon() -> BigRational {
    BigRational::new(BigInt::one(), BigInt::from(2).pow(52u32))
}

/// Lit un décimal (période optionnelle entre parenthèses) en rationnel exact.
///
/// valeur = (B - A) / (10^n · (10^m - 1)) avec
///   A = chiffres "entier + non périodique", B = A suivi de la période,
///   n = longueur non périodique, m = longueur de la période.
pub fn parse(text: &str) -> Option<BigRational> {
    let caps = RE_DECIMAL_PERIODIQUE.captures(text)?;

    let neg = !caps.get(1)?.as_str().is_empty();
    let int_part = caps.get(2).map_or("", |m| m.as_str());
    let frac_part = caps.get(3).map_or("", |m| m.as_str());
    let period = caps.get(4).map_or("", |m| m.as_str());

    if int_part.is_empty() && frac_part.is_empty() && period.is_empty() {
        return None;
    }
    // "1." sans chiffre ni période : refusé
    if text.ends_with('.') {
        return None;
    }

    let n = u32::try_from(frac_part.len()).ok()?;
    let a = digits_to_int(&format!("{int_part}{frac_part}"))?;

    let value = if period.is_empty() {
        BigRational::new(a, pow10(n))
    } else {
        let m = u32::try_from(period.len()).ok()?;
        let b = digits_to_int(&format!("{int_part}{frac_part}{period}"))?;
        BigRational::new(b - a, pow10(n) * (pow10(m) - BigInt::one()))
    };

    Some(if neg { -value } else { value })
}

fn digits_to_int(digits: &str) -> Option<BigInt> {
    if digits.is_empty() {
        return Some(BigInt::zero());
    }
    BigInt::parse_bytes(digits.as_bytes(), 10)
}

/// Dénominateur de la forme 2^a · 5^b : écriture décimale finie.
pub fn is_finite_decimal(r: &BigRational) -> bool {
    let mut d = r.denom().clone();
    for p in [BigInt::from(2), BigInt::from(5)] {
        while (&d % &p).is_zero() {
            d /= &p;
        }
    }
    d.is_one()
}

/// Première réduite (fraction continue) de |r| à moins de `eps` de |r|,
/// signe restauré. La dernière réduite est exacte : on trouve toujours.
pub fn simplify(r: &BigRational, eps: &BigRational) -> BigRational {
    let target = r.abs();

    let mut num = target.numer().clone();
    let mut den = target.denom().clone();

    // réduites h/k : h(-1)=1, h(-2)=0 ; k(-1)=0, k(-2)=1
    let (mut h_prev, mut h_prev2) = (BigInt::one(), BigInt::zero());
    let (mut k_prev, mut k_prev2) = (BigInt::zero(), BigInt::one());

    while !den.is_zero() {
        let a = &num / &den;
        let rem = &num - &a * &den;
        num = std::mem::replace(&mut den, rem);

        let h = &a * &h_prev + &h_prev2;
        let k = &a * &k_prev + &k_prev2;

        let candidate = BigRational::new(h.clone(), k.clone());
        if (&candidate - &target).abs() < *eps {
            return if r.is_negative() { -candidate } else { candidate };
        }

        h_prev2 = std::mem::replace(&mut h_prev, h);
        k_prev2 = std::mem::replace(&mut k_prev, k);
    }

    r.clone()
}

/// Écriture décimale, période entre parenthèses : "0.1(6)", "2.(8)", "-1".
/// Période trop longue : chiffres tronqués, zéros de fin retirés.
pub fn to_recurring_string(r: &BigRational) -> String {
    match recurring(r) {
        Ok(s) | Err(s) => s,
    }
}

/// Comme `to_recurring_string`, mais seulement si l’écriture est exacte.
pub fn exact_recurring_string(r: &BigRational) -> Option<String> {
    recurring(r).ok()
}

/// Ok : écriture exacte ; Err : écriture tronquée.
fn recurring(r: &BigRational) -> Result<String, String> {
    let mut out = String::new();
    if r.is_negative() {
        out.push('-');
    }

    let n = r.numer().abs();
    let d = r.denom().clone();

    out.push_str(&(&n / &d).to_str_radix(10));

    let mut rem = &n % &d;
    if rem.is_zero() {
        return Ok(out);
    }
    out.push('.');

    let ten = BigInt::from(10);
    let mut digits: Vec<u8> = Vec::new();
    let mut seen: HashMap<BigInt, usize> = HashMap::new();

    while !rem.is_zero() {
        if let Some(&start) = seen.get(&rem) {
            let (fixed, cycle) = digits.split_at(start);
            push_digits(&mut out, fixed);
            out.push('(');
            push_digits(&mut out, cycle);
            out.push(')');
            return Ok(out);
        }

        if digits.len() >= MAX_CYCLE_DIGITS {
            push_digits(&mut out, &digits[..TRUNCATED_DIGITS]);
            let kept = out.trim_end_matches('0').trim_end_matches('.').len();
            out.truncate(kept);
            return Err(out);
        }

        seen.insert(rem.clone(), digits.len());
        rem *= &ten;
        let digit = &rem / &d;
        rem -= &digit * &d;
        digits.push(digit.to_str_radix(10).as_bytes()[0] - b'0');
    }

    push_digits(&mut out, &digits);
    Ok(out)
}

fn push_digits(out: &mut String, digits: &[u8]) {
    for d in digits {
        out.push(char::from(b'0' + d));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn lecture_periodique() {
        assert_eq!(parse("0.(3)"), Some(q(1, 3)));
        assert_eq!(parse("0.1(6)"), Some(q(1, 6)));
        assert_eq!(parse("1.1(23)"), Some(q(1112, 990)));
        assert_eq!(parse("-0.5"), Some(q(-1, 2)));
        assert_eq!(parse(".25"), Some(q(1, 4)));
        assert_eq!(parse("12"), Some(q(12, 1)));
        assert_eq!(parse("46.5(3)"), Some(q(698, 15)));
        assert_eq!(parse(""), None);
        assert_eq!(parse("1."), None);
        assert_eq!(parse("abc"), None);
    }

    #[test]
    fn ecriture_periodique() {
        assert_eq!(to_recurring_string(&q(4, 3)), "1.(3)");
        assert_eq!(to_recurring_string(&q(1, 6)), "0.1(6)");
        assert_eq!(to_recurring_string(&q(26, 9)), "2.(8)");
        assert_eq!(to_recurring_string(&q(-1, 1)), "-1");
        assert_eq!(to_recurring_string(&q(-1, 2)), "-0.5");
        assert_eq!(to_recurring_string(&q(1112, 990)), "1.1(23)");
        assert_eq!(to_recurring_string(&q(0, 1)), "0");
    }

    #[test]
    fn periode_trop_longue() {
        // période de 1666665 chiffres : écriture tronquée, sans zéros de fin
        let r = q(9999992, 9999991);
        assert_eq!(exact_recurring_string(&r), None);
        assert_eq!(to_recurring_string(&r), "1.00000010000009");
        assert_eq!(to_recurring_string(&q(-1, 9999991)), "-0.00000010000009");
        assert_eq!(exact_recurring_string(&q(1, 7)).as_deref(), Some("0.(142857)"));
    }

    #[test]
    fn decimal_fini() {
        assert!(is_finite_decimal(&q(3, 1)));
        assert!(is_finite_decimal(&q(-7, 40)));
        assert!(is_finite_decimal(&q(945410071684, 1000000000000)));
        assert!(!is_finite_decimal(&q(1, 6)));
        assert!(!is_finite_decimal(&q(1, 3)));
    }

    #[test]
    fn simplification_idempotente() {
        let eps = default_epsilon();
        let tiny = BigRational::new(BigInt::one(), pow10(25));
        for r in [q(1, 3) + tiny.clone(), q(355, 113) - tiny, q(-22, 7), q(1, 9999991)] {
            let once = simplify(&r, &eps);
            assert_eq!(simplify(&once, &eps), once, "r={r}");
        }
    }

    #[test]
    fn simplification_bornee() {
        let eps = default_epsilon();
        assert_eq!(simplify(&q(1, 3), &eps), q(1, 3));
        assert_eq!(simplify(&q(-1958483, 12500), &eps), q(-1958483, 12500));

        // 1/3 + 1/10^30 : indiscernable de 1/3 à ε près
        let tiny = BigRational::new(BigInt::one(), pow10(30));
        assert_eq!(simplify(&(q(1, 3) + tiny), &eps), q(1, 3));
    }
}
