//! Noyau exact (décimal + rationnel)
//!
//! Organisation interne :
//! - decimal.rs     : décimal exact (mantisse BigInt + échelle), politiques d’arrondi
//! - rational.rs    : rationnels périodiques (lecture / écriture "1.(3)"), simplification bornée
//! - format.rs      : chaînes numériques / montants + arrondi des montants
//! - cache.rs       : cache de conversions par noeud
//! - number.rs      : valeur (feuille), singletons Zero / One
//! - operand.rs     : union fermée des noeuds + capacités communes
//! - calculation.rs : noeud de calcul paresseux
//! - jetons.rs      : découpage en jetons
//! - reduce.rs      : réduction gauche -> droite (sans priorité)
//! - scan.rs        : TokenScan (analyse à la demande, opérations différées)
//! - json.rs        : forme JSON
//! - eval.rs        : entrée tolérante + pipeline complet
//! - error.rs       : erreurs typées

mod cache;

pub mod calculation;
pub mod decimal;
pub mod error;
pub mod eval;
pub mod format;
pub mod jetons;
pub mod json;
pub mod number;
pub mod operand;
pub mod rational;
pub mod reduce;
pub mod scan;

#[cfg(test)]
mod tests_calculs;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use calculation::Calculation;
pub use decimal::{Decimal, RoundingMode};
pub use error::{CalcError, NotValid, ParseError, ScanError};
pub use eval::{create_if_valid, eval_expression, DemarcheNoyau};
pub use format::RoundingConfig;
pub use json::{from_json, from_json_str, CalcJson};
pub use number::{ExactValue, Input, Number, NumberKind, NumberValue};
pub use operand::{MathValue, Operand, OperandKind, Operation};
pub use scan::TokenScan;
