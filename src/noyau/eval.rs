//! Noyau : évaluation (pipeline réel)
//!
//! texte -> entrée tolérante (nombre / opération simple / notation scientifique / calcul)
//!       -> arbre -> résolution exacte -> valeur + montant + démarche
//!
//! L’entrée tolérante ne lève jamais : un échec devient `NotValid` (texte + cause).

use once_cell::sync::Lazy;
use regex::Regex;

use super::decimal::Decimal;
use super::error::{CalcError, NotValid, Result};
use super::format::{is_numeric_string, RoundingConfig};
use super::jetons::format_tokens;
use super::number::Number;
use super::operand::Operand;
use super::scan::TokenScan;

static RE_OPERATION_SIMPLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+|\d*\.\d+)\s*[+/*x%-]\s*(\d+|\d*\.\d+)$").unwrap());

static RE_SCIENTIFIQUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+(?:\.\d+)?)e([+-])(\d+)$").unwrap());

/// Garde-fou : 1e999999999 ferait une mantisse gigantesque.
const MAX_EXPOSANT: u32 = 10_000;

#[derive(Default, Clone, Debug)]
pub struct DemarcheNoyau {
    pub jetons: String,
    pub calcul: String,
    pub types: String,
    pub json: String,
}

/// Entrée tolérante : nombre, calcul ou `NotValid`.
///
/// Ordre des essais (sur le texte rogné) :
/// 1) chaîne numérique / montant
/// 2) "a op b" simple (deux opérandes non signées)
/// 3) notation scientifique "1.5e+3", exacte
/// 4) analyse complète
pub fn create_if_valid(input: &str) -> Result<Operand, NotValid> {
    let maybe = input.trim();
    let not_valid = |reason: CalcError| NotValid {
        value: maybe.to_string(),
        reason,
    };

    if is_numeric_string(maybe) {
        return Number::create(maybe).map(Operand::Number).map_err(not_valid);
    }

    if RE_OPERATION_SIMPLE.is_match(maybe) {
        return TokenScan::new(maybe).parsed().map_err(not_valid);
    }

    if let Some(caps) = RE_SCIENTIFIQUE.captures(maybe) {
        return scientifique(&caps[1], &caps[2], &caps[3]).map_err(not_valid);
    }

    TokenScan::new(maybe).parsed().map_err(|err| {
        log::debug!("entrée non valide {maybe:?} : {err}");
        not_valid(err)
    })
}

/// mantisse × 10^(±exposant), sans flottant.
fn scientifique(mantisse: &str, signe: &str, exposant: &str) -> Result<Operand> {
    let hors_domaine = || CalcError::UnsupportedArgument {
        input: format!("{mantisse}e{signe}{exposant}"),
    };

    let exposant: u32 = exposant.parse().map_err(|_| hors_domaine())?;
    if exposant > MAX_EXPOSANT {
        return Err(hors_domaine());
    }
    let exposant = if signe == "-" {
        -i64::from(exposant)
    } else {
        i64::from(exposant)
    };

    let facteur = Decimal::one().shift(exposant).ok_or_else(hors_domaine)?;
    Operand::Number(Number::create(mantisse)?).times(facteur)
}

/// API publique : évalue un texte et retourne
/// - la valeur exacte ("0.(3)")
/// - le montant arrondi selon `config`
/// - la démarche (jetons, calcul reconnu, types des opérandes, JSON)
pub fn eval_expression(input: &str, config: &RoundingConfig) -> Result<(String, String, DemarcheNoyau), NotValid> {
    let operand = create_if_valid(input)?;

    let fail = |reason: CalcError| NotValid {
        value: input.trim().to_string(),
        reason,
    };

    let valeur = operand.to_value_string().map_err(fail)?;
    let montant = operand.to_amount_string_with(config).map_err(fail)?;

    let calcul = operand.to_string_calculation();
    let scan = TokenScan::new(calcul.as_str());
    let jetons = scan
        .tokens()
        .map(|t| format_tokens(&calcul, &t))
        .unwrap_or_default();

    let d = DemarcheNoyau {
        jetons,
        types: operand.resolve_type().map_err(fail)?,
        json: operand
            .to_json()
            .and_then(|j| j.to_json_string())
            .map_err(fail)?,
        calcul,
    };

    Ok((valeur, montant, d))
}
