//! Tests de campagne : textes libres -> arbre -> valeur exacte.
//!
//! - chaque texte est rejoué avec d’autres blancs (tabulations, sauts de ligne, aucun)
//! - les textes refusés le sont quelle que soit la voie (scan direct, entrée tolérante)
//! - les capacités (abs, compare, max, opérations différées...) sur des scans
//! - budget temps global, comme pour le fuzz

use std::time::{Duration, Instant};

use super::error::CalcError;
use super::eval::create_if_valid;
use super::number::Number;
use super::operand::{Operand, OperandKind, Operation};
use super::scan::TokenScan;

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/// Le texte tel quel, sans blancs, et avec des blancs "exotiques".
fn variantes(text: &str) -> Vec<String> {
    let mut out = vec![text.to_string()];
    if text.contains(' ') {
        out.push(text.replace(' ', ""));
        out.push(text.replace(' ', "\t"));
        out.push(text.replace(' ', " \n\t "));
    }
    out
}

fn scan_ok(text: &str) -> Operand {
    let scan = TokenScan::new(text);
    assert!(scan.is_valid(), "scan non valide : {text:?}");
    scan.parsed().unwrap_or_else(|e| panic!("{text:?} : {e}"))
}

/* ------------------------ Textes -> valeurs ------------------------ */

const CALCULS: &[(&str, &str)] = &[
    ("1.1(23) + 1", "2.1(23)"),
    ("1.1(23) + 1 + 2", "4.1(23)"),
    ("1.1(23) + 1 * 2", "4.2(46)"),
    ("1.1(23) + (1 * 2)", "3.1(23)"),
    ("(1.1(23) + 1) * 2", "4.2(46)"),
    ("1 + 2 * 3 / 4 % 5 - 6 + 7 * 8 / 9", "2.(8)"),
    (".1 - .2 + .3 * .4 / .5", "0.16"),
    ("3 x 5 % 9", "6"),
    ("1 + (2/3)", "1.(6)"),
    ("1 + 2", "3"),
    ("( ( 46.53r ) x ( 3 ) ) - ( 0 )", "139.6"),
    ("(((120 * .972322) * 3)+((120 * 1) * 1))/3", "156.67864"),
    ("(((120*.972322) * 3)+120)/3", "156.67864"),
    ("15+5.84583r+25.6875", "46.5(3)"),
];

#[test]
fn camp_calculs_et_blancs() {
    let start = Instant::now();
    let max = Duration::from_secs(5);

    for (text, attendu) in CALCULS {
        for v in variantes(text) {
            budget(start, max);

            let op = scan_ok(&v);
            assert_eq!(op.kind(), OperandKind::Calculation, "text={v:?}");
            assert_eq!(op.to_value_string().unwrap(), *attendu, "text={v:?}");

            // l’entrée tolérante arrive au même résultat
            let tol = create_if_valid(&v).unwrap_or_else(|e| panic!("{v:?} : {e}"));
            assert_eq!(tol.to_value_string().unwrap(), *attendu, "text={v:?}");
        }
    }
}

#[test]
fn camp_valeur_memorisee_egale_resolution_fraiche() {
    for (text, attendu) in CALCULS {
        let op = scan_ok(text);
        let premiere = op.to_value_string().unwrap();
        let seconde = op.to_value_string().unwrap();
        assert_eq!(premiere, seconde, "text={text:?}");

        op.dispose();
        let fraiche = op.resolve().unwrap().to_string();
        assert_eq!(premiere, fraiche, "text={text:?}");
        assert_eq!(fraiche, *attendu, "text={text:?}");
    }
}

#[test]
fn camp_blancs_pathologiques() {
    let text = "((((120 \t\t\t   \t*\t\t \t\t  \t.972322)\t \t\t \t* \t  \t3)+((120\t  \t  *\t\t\t\t 1)\t\t\t *\t\t\t\t\t1))/3)";
    assert_eq!(scan_ok(text).to_value_string().unwrap(), "156.67864");
}

#[test]
fn camp_valeurs_seules() {
    let one = scan_ok("1");
    assert!(matches!(&one, Operand::Number(n) if n.ptr_eq(&Number::one())));

    assert_eq!(scan_ok("1.2r").to_value_string().unwrap(), "1.(2)");
    for v in ["1.1(23)", "1.1[23]", "1.1(23)r", "1.1[23]r"] {
        let op = scan_ok(v);
        assert_eq!(op.kind(), OperandKind::Number(super::number::NumberKind::Rational), "v={v:?}");
        assert_eq!(op.to_value_string().unwrap(), "1.1(23)", "v={v:?}");
    }
}

#[test]
fn camp_types_resolus() {
    assert_eq!(scan_ok("1 + 2").resolve_type().unwrap(), "amount_string + amount_string");
    assert_eq!(scan_ok("1.1(23) + 1").resolve_type().unwrap(), "rational + amount_string");
    assert_eq!(scan_ok("1 + (2/3)").resolve_type().unwrap(), "amount_string + calculation");
    assert_eq!(scan_ok("3 x 5 % 9").resolve_type().unwrap(), "calculation % amount_string");
    assert_eq!(scan_ok("(1 + 2) / 3").resolve_type().unwrap(), "calculation / amount_string");
}

/* ------------------------ Textes refusés ------------------------ */

#[test]
fn camp_refus() {
    for text in ["", "()", "( )", "(\t)", "11 * ()"] {
        let scan = TokenScan::new(text);
        assert!(!scan.is_valid(), "text={text:?}");
        assert!(
            matches!(scan.parsed(), Err(CalcError::Scan(_) | CalcError::Parse(_))),
            "text={text:?}"
        );
        assert!(create_if_valid(text).is_err(), "text={text:?}");
    }
}

/* ------------------------ Capacités sur scans ------------------------ */

fn s(text: &str) -> Operand {
    Operand::Scan(TokenScan::new(text))
}

#[test]
fn camp_capacites() {
    assert_eq!(s("-1").abs().unwrap().to_value_string().unwrap(), "1");
    assert_eq!(s("1").compare(Number::one()).unwrap(), std::cmp::Ordering::Equal);
    assert_eq!(s("2 * 3").divide(4).unwrap().to_value_string().unwrap(), "1.5");
    assert_eq!(
        s("2 * 3").do_math_then_dispose(Operation::Divide, 4).unwrap().to_value_string().unwrap(),
        "1.5"
    );
    assert!(!s("-1").is_greater_than(Number::zero()).unwrap());
    assert!(s("-1").is_less_than(Number::zero()).unwrap());
    assert!(s("1+2/3").is_one().unwrap());
    assert!(s("1").is_one().unwrap());
    assert!(!s("1+2/3").is_zero().unwrap());
    assert!(s("0").is_zero().unwrap());
    assert_eq!(s("2 * 3").max([1, 2]).unwrap().to_value_string().unwrap(), "6");
    assert_eq!(s("-1").minus(1).unwrap().to_value_string().unwrap(), "-2");
    assert_eq!(s("-1").minus(-1).unwrap().to_value_string().unwrap(), "0");
    assert_eq!(s("4/3").modulo(1).unwrap().to_value_string().unwrap(), "0.(3)");
    assert_eq!(s("-1").plus(1).unwrap().to_value_string().unwrap(), "0");
    assert_eq!(s("1+2/3").resolve().unwrap().to_string(), "1");
    assert_eq!(s("-1").times(2).unwrap().to_value_string().unwrap(), "-2");
    assert_eq!(s("4/3").to_amount_string().unwrap(), "1.333334");
    assert_eq!(s("4/3").to_decimal().unwrap().to_string(), "1.33333333333333333333");
    assert_eq!(s("1+2/-3").to_value_string().unwrap(), "-1");
}

#[test]
fn camp_texte_conserve() {
    for text in ["1+2/3", "1 + 2 / 3", "1+ 2 / 3"] {
        assert_eq!(s(text).to_string_calculation(), text);
    }
    let parsed = Operand::Calculation(match scan_ok("1+2/3") {
        Operand::Calculation(c) => c,
        other => panic!("calcul attendu, obtenu {other:?}"),
    });
    assert_eq!(parsed.to_string_calculation(), "(1 + 2) / 3");
}

#[test]
fn camp_max_heterogene() {
    let one = Operand::Number(Number::one());
    let third = num_rational::BigRational::new(3.into(), 4.into());
    let best = one
        .max([
            super::operand::MathValue::from(2),
            super::operand::MathValue::from(third),
            super::operand::MathValue::from("5.6r"),
            super::operand::MathValue::from(TokenScan::new("7 - 8 * 9")),
        ])
        .unwrap();
    assert_eq!(best.to_value_string().unwrap(), "5.(6)");
}
