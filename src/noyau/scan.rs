// src/noyau/scan.rs
//
// TokenScan : texte de calcul analysé à la demande.
//
// Source :
// - Text     : texte libre tel quel
// - Deferred : (scan, opération, opérande) ; son texte est reconstruit,
//              l’analyse ne se fait qu’au premier besoin
//
// Jetons, arbre analysé et validité sont mémorisés (échecs compris : une
// analyse ratée le reste).

use parking_lot::Mutex;

use std::fmt;
use std::sync::Arc;

use super::error::{CalcError, Result, ScanError};
use super::jetons::{self, TokenSpan};
use super::json::CalcJson;
use super::number::Number;
use super::operand::{MathValue, Operand, Operation};
use super::reduce;

#[derive(Clone, Debug)]
pub enum ScanSource {
    Text(String),
    Deferred {
        scan: TokenScan,
        operation: Operation,
        operand: Operand,
    },
}

struct TokenScanInner {
    source: ScanSource,
    tokens: Mutex<Option<Result<Vec<TokenSpan>, ScanError>>>,
    parsed: Mutex<Option<Result<Operand>>>,
    valid: Mutex<Option<bool>>,
}

#[derive(Clone)]
pub struct TokenScan(Arc<TokenScanInner>);

impl TokenScan {
    pub fn new(text: impl Into<String>) -> TokenScan {
        TokenScan::from_source(ScanSource::Text(text.into()))
    }

    fn from_source(source: ScanSource) -> TokenScan {
        TokenScan(Arc::new(TokenScanInner {
            source,
            tokens: Mutex::new(None),
            parsed: Mutex::new(None),
            valid: Mutex::new(None),
        }))
    }

    pub fn source(&self) -> &ScanSource {
        &self.0.source
    }

    pub fn ptr_eq(&self, other: &TokenScan) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Texte analysé : la source, ou la reconstruction d’un scan différé.
    pub fn to_string_calculation(&self) -> String {
        match &self.0.source {
            ScanSource::Text(text) => text.clone(),
            ScanSource::Deferred {
                scan,
                operation,
                operand,
            } => {
                let left = match scan.parsed() {
                    Ok(Operand::Number(n)) => n.to_operand_text(),
                    _ => format!("({})", scan.to_string_calculation()),
                };
                let right = match operand {
                    Operand::Number(n) => n.to_operand_text(),
                    other => format!("({})", other.to_string_calculation()),
                };
                format!("{left} {operation} {right}")
            }
        }
    }

    pub fn tokens(&self) -> Result<Vec<TokenSpan>, ScanError> {
        if let Some(tokens) = self.0.tokens.lock().as_ref() {
            return tokens.clone();
        }

        let tokens = jetons::scan(&self.to_string_calculation());
        *self.0.tokens.lock() = Some(tokens.clone());
        tokens
    }

    /// Valeur seule ou arbre de calcul.
    pub fn parsed(&self) -> Result<Operand> {
        if let Some(parsed) = self.0.parsed.lock().as_ref() {
            return parsed.clone();
        }

        let text = self.to_string_calculation();
        let parsed = self
            .tokens()
            .map_err(CalcError::from)
            .and_then(|tokens| reduce::parse(&text, &tokens));

        if let Err(err) = &parsed {
            log::debug!("analyse impossible de {text:?} : {err}");
        }

        *self.0.parsed.lock() = Some(parsed.clone());
        parsed
    }

    pub fn is_valid(&self) -> bool {
        if let Some(valid) = *self.0.valid.lock() {
            return valid;
        }
        let valid = self.parsed().is_ok();
        *self.0.valid.lock() = Some(valid);
        valid
    }

    pub fn resolve(&self) -> Result<Number> {
        self.parsed()?.resolve()
    }

    pub fn is_zero(&self) -> Result<bool> {
        if matches!(&self.0.source, ScanSource::Text(t) if t.trim() == "0") {
            return Ok(true);
        }
        self.parsed()?.is_zero()
    }

    pub fn is_one(&self) -> Result<bool> {
        if matches!(&self.0.source, ScanSource::Text(t) if t.trim() == "1") {
            return Ok(true);
        }
        self.parsed()?.is_one()
    }

    /// Toujours possible : le texte suffit (pas d’analyse).
    pub fn to_json(&self) -> CalcJson {
        CalcJson::TokenScan {
            value: self.to_string_calculation(),
        }
    }

    /// Opération différée. Élément neutre (0 pour + et -, 1 pour *, x, /) -> le
    /// receveur lui-même ; le modulo est toujours différé.
    pub fn apply(&self, operation: Operation, value: impl Into<MathValue>) -> Result<TokenScan> {
        let operand = Operand::reuse_or_create(value)?;

        let neutral = match operation {
            Operation::Plus | Operation::Minus => operand.is_zero()?,
            Operation::Multiply | Operation::Times | Operation::Divide => operand.is_one()?,
            Operation::Modulo => false,
        };
        if neutral {
            return Ok(self.clone());
        }

        let deferred = TokenScan::from_source(ScanSource::Deferred {
            scan: self.clone(),
            operation,
            operand,
        });
        log::trace!("scan différé : {}", deferred.to_string_calculation());
        Ok(deferred)
    }

    pub fn plus(&self, value: impl Into<MathValue>) -> Result<TokenScan> {
        self.apply(Operation::Plus, value)
    }

    pub fn minus(&self, value: impl Into<MathValue>) -> Result<TokenScan> {
        self.apply(Operation::Minus, value)
    }

    pub fn times(&self, value: impl Into<MathValue>) -> Result<TokenScan> {
        self.apply(Operation::Times, value)
    }

    pub fn divide(&self, value: impl Into<MathValue>) -> Result<TokenScan> {
        self.apply(Operation::Divide, value)
    }

    pub fn modulo(&self, value: impl Into<MathValue>) -> Result<TokenScan> {
        self.apply(Operation::Modulo, value)
    }

    /// Oublie l’arbre analysé (réanalysé au prochain besoin).
    pub(crate) fn reset_parsed(&self) {
        *self.0.parsed.lock() = None;
    }
}

impl fmt::Debug for TokenScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenScan").field(&self.to_string_calculation()).finish()
    }
}
