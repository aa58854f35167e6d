// src/noyau/error.rs
//
// Taxonomie des erreurs du noyau.
// - CalcError  : erreur "publique" (construction, division par zéro, scan, parse, JSON)
// - ScanError  : flux de jetons mal formé (avant toute réduction)
// - ParseError : réduction impossible, avec l’état du parseur et le jeton fautif
// - NotValid   : résultat typé de l’entrée tolérante (create_if_valid)
//
// Toutes les erreurs sont Clone + PartialEq : un TokenScan garde l’échec en cache
// et le re-renvoie à l’identique.

use thiserror::Error;

use super::jetons::TokenSpan;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("argument non supporté : {input:?}")]
    UnsupportedArgument { input: String },

    #[error("chaîne de montant non supportée : {input:?}")]
    NotAnAmountString { input: String },

    #[error("division par zéro ({operation})")]
    DivisionByZero { operation: char },

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("JSON invalide : {message}")]
    Json { message: String },
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::Json {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("aucun jeton trouvé")]
    NoTokens,

    #[error("le premier jeton n’est pas à l’index 0")]
    FirstTokenNotAtStart,

    #[error("le dernier jeton ne finit pas en fin de chaîne")]
    LastTokenNotAtEnd,

    #[error("jeton attendu à l’index {index}")]
    TokenGap { index: usize },

    #[error("parenthèses déséquilibrées")]
    ImbalancedNesting,

    #[error("opération attendue, trouvé {found:?}")]
    InvalidOperation { found: String },
}

/// Photo de l’état du réducteur au moment de l’échec (diagnostic seulement).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserSnapshot {
    pub stack_depth: usize,
    pub left_operand: Option<String>,
    pub right_operand: Option<String>,
    pub operation: Option<char>,
    pub operand_mode: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (texte: {text:?})")]
pub struct ParseError {
    pub message: String,
    pub state: ParserSnapshot,
    pub span: Option<TokenSpan>,
    pub text: String,
}

/// Échec de l’entrée tolérante : le texte fautif + la cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("valeur non valide : {value:?}")]
pub struct NotValid {
    pub value: String,
    #[source]
    pub reason: CalcError,
}

pub type Result<T, E = CalcError> = std::result::Result<T, E>;
