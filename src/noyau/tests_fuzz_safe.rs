//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée (un seul opérateur par parenthèse : la lecture gauche -> droite
//!   donne alors le même arbre que l’écriture)
//! - budget temps global
//! - seule erreur acceptée : division par zéro
//! - invariants : réécriture du calcul, aller-retour JSON, éléments neutres

use std::time::{Duration, Instant};

use super::error::CalcError;
use super::eval::create_if_valid;
use super::json::from_json;
use super::operand::Operand;
use super::scan::TokenScan;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

const LITTERAUX: &[&str] = &[
    "0", "1", "2", "3", "7", "12", ".5", "0.25", "2.75", "120", ".972322", "0.3r", "1.2r", "0.1(6)", "1.1(23)",
    "0.1[23]r", "46.53r",
];

fn gen_atom(rng: &mut Rng) -> String {
    let lit = LITTERAUX[rng.pick(LITTERAUX.len() as u32) as usize];
    // négatif : jamais sur zéro ("-0" n’a rien d’intéressant)
    if lit != "0" && rng.pick(4) == 0 {
        format!("-{lit}")
    } else {
        lit.to_string()
    }
}

fn gen_op(rng: &mut Rng) -> &'static str {
    match rng.pick(6) {
        0 => "+",
        1 => "-",
        2 => "*",
        3 => "x",
        4 => "/",
        _ => "%",
    }
}

fn gen_blanc(rng: &mut Rng) -> &'static str {
    match rng.pick(4) {
        0 => "",
        1 => " ",
        2 => "\t",
        _ => " \n ",
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 || rng.pick(4) == 0 {
        return gen_atom(rng);
    }

    let a = gen_expr(rng, depth - 1);
    let b = gen_expr(rng, depth - 1);
    let op = gen_op(rng);
    let (w1, w2) = (gen_blanc(rng), gen_blanc(rng));

    if rng.coin() {
        format!("({a}{w1}{op}{w2}{b})")
    } else {
        // groupe gauche seulement : toujours un seul opérateur par niveau
        format!("({a}){w1}{op}{w2}({b})")
    }
}

/* ------------------------ Helpers ------------------------ */

fn is_erreur_attendue(err: &CalcError) -> bool {
    matches!(err, CalcError::DivisionByZero { .. })
}

/// (valeur, montant) ou l’erreur attendue.
fn evalue(op: &Operand) -> Result<(String, String), CalcError> {
    Ok((op.to_value_string()?, op.to_amount_string()?))
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_reecriture_et_json() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);

    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..150 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 3);
        let op = create_if_valid(&expr).unwrap_or_else(|e| panic!("expr={expr:?} non valide: {e}"));

        match evalue(&op) {
            Ok((valeur, _montant)) => {
                // 1) l’écriture du calcul se relit en la même valeur
                let relu = TokenScan::new(op.to_string_calculation());
                assert_eq!(
                    relu.parsed().and_then(|o| o.to_value_string()),
                    Ok(valeur.clone()),
                    "expr={expr:?} réécrit={:?}",
                    op.to_string_calculation()
                );

                // 2) aller-retour JSON : même valeur exacte
                let json = op.to_json().unwrap_or_else(|e| panic!("expr={expr:?} json: {e}"));
                let back = from_json(&json).unwrap_or_else(|e| panic!("expr={expr:?} from_json: {e}"));
                assert_eq!(back.to_value_string(), Ok(valeur), "expr={expr:?} json={json:?}");

                // 3) éléments neutres : le receveur lui-même (0 + 0 renvoie l’argument)
                if !op.is_zero().unwrap() {
                    assert!(op.plus(0).unwrap().ptr_eq(&op), "expr={expr:?}");
                }
                assert!(op.times(1).unwrap().ptr_eq(&op), "expr={expr:?}");

                seen_ok += 1;
            }
            Err(e) => {
                assert!(is_erreur_attendue(&e), "erreur non attendue: expr={expr:?} err={e}");
                seen_err += 1;
            }
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 50, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_determinisme() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let tour = || {
        let mut rng = Rng::new(0xBADC0DE_u64);
        (0..60)
            .map(|_| {
                budget(t0, max);
                let expr = gen_expr(&mut rng, 2);
                let r = create_if_valid(&expr).map_err(|e| e.reason).and_then(|op| evalue(&op));
                (expr, r)
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(tour(), tour());
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let expr = somme_balancee("(1/2)", 800);
    let op = create_if_valid(&expr).unwrap_or_else(|e| panic!("err: {e}"));
    budget(t0, max);

    // 800*(1/2) = 400
    assert_eq!(op.to_value_string().unwrap(), "400");
    budget(t0, max);
}
