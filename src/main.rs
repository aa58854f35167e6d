// src/main.rs
//
// Calculatrice exacte, point d’entrée ligne de commande
// -------------------------------------------------------
// - expressions en arguments, sinon une par ligne sur stdin
// - sortie : valeur exacte, puis (au choix) montant / calcul / jetons / JSON
// - entrée non valide : message sur stderr, code de sortie 1

use std::io::{self, BufRead};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use intermediary_number::{eval_expression, RoundingConfig, RoundingMode};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Arrondi {
    HalfCeil,
    HalfUp,
    Down,
}

impl From<Arrondi> for RoundingMode {
    fn from(a: Arrondi) -> Self {
        match a {
            Arrondi::HalfCeil => RoundingMode::HalfCeil,
            Arrondi::HalfUp => RoundingMode::HalfUp,
            Arrondi::Down => RoundingMode::Down,
        }
    }
}

/// Évalue des calculs exacts lus de gauche à droite ("1 + 2 * 3" = 9).
#[derive(Parser, Debug)]
#[command(name = "intermediary", version, about, long_about = None)]
struct Args {
    /// Affiche aussi la forme JSON.
    #[arg(long)]
    json: bool,

    /// Affiche le calcul reconnu (groupes explicites).
    #[arg(long)]
    calculation: bool,

    /// Affiche le montant arrondi.
    #[arg(long)]
    amount: bool,

    /// Affiche les jetons.
    #[arg(long)]
    tokens: bool,

    /// Précision de travail des décimaux avant arrondi du montant.
    #[arg(long, default_value_t = 7)]
    working_places: u32,

    /// Chiffres après la virgule dans un montant.
    #[arg(long, default_value_t = 6)]
    amount_places: u32,

    /// Politique d’arrondi.
    #[arg(long, value_enum, default_value_t = Arrondi::HalfCeil)]
    rounding: Arrondi,

    /// Expressions (sinon : une par ligne sur stdin).
    expressions: Vec<String>,
}

impl Args {
    fn config(&self) -> RoundingConfig {
        RoundingConfig {
            working_places: self.working_places,
            amount_places: self.amount_places,
            mode: self.rounding.into(),
        }
    }

    /// true si l’expression est valide.
    fn evalue(&self, expr: &str, config: &RoundingConfig) -> bool {
        match eval_expression(expr, config) {
            Ok((valeur, montant, d)) => {
                println!("{valeur}");
                if self.amount {
                    println!("  montant : {montant}");
                }
                if self.calculation {
                    println!("  calcul  : {}", d.calcul);
                    println!("  types   : {}", d.types);
                }
                if self.tokens {
                    println!("  jetons  : {}", d.jetons);
                }
                if self.json {
                    println!("  json    : {}", d.json);
                }
                true
            }
            Err(e) => {
                match &e.reason {
                    intermediary_number::CalcError::Parse(p) => {
                        eprintln!("{e} : {} (état : {:?})", p, p.state)
                    }
                    reason => eprintln!("{e} : {reason}"),
                }
                false
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    let config = args.config();

    let mut tout_valide = true;

    if args.expressions.is_empty() {
        for ligne in io::stdin().lock().lines() {
            let ligne = match ligne {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("lecture stdin : {e}");
                    return ExitCode::FAILURE;
                }
            };
            if ligne.trim().is_empty() {
                continue;
            }
            tout_valide &= args.evalue(&ligne, &config);
        }
    } else {
        for expr in &args.expressions {
            tout_valide &= args.evalue(expr, &config);
        }
    }

    if tout_valide {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
