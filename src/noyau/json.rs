// src/noyau/json.rs
//
// Forme JSON d’un arbre (serde, étiquette "type") :
//
//   {"type":"IntermediaryNumber","value":"1.5"}
//   {"type":"IntermediaryCalculation","left":{..},"operation":"+","right":{..}}
//   {"type":"TokenScan","value":"1 + 2"}

use serde::{Deserialize, Serialize};

use super::calculation::Calculation;
use super::error::Result;
use super::number::Number;
use super::operand::{Operand, Operation};
use super::scan::TokenScan;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalcJson {
    IntermediaryNumber {
        value: String,
    },
    IntermediaryCalculation {
        left: Box<CalcJson>,
        operation: Operation,
        right: Box<CalcJson>,
    },
    TokenScan {
        value: String,
    },
}

impl CalcJson {
    pub fn number(value: impl Into<String>) -> CalcJson {
        CalcJson::IntermediaryNumber { value: value.into() }
    }

    pub fn calculation(left: CalcJson, operation: Operation, right: CalcJson) -> CalcJson {
        CalcJson::IntermediaryCalculation {
            left: Box::new(left),
            operation,
            right: Box::new(right),
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_str(text: &str) -> Result<CalcJson> {
        Ok(serde_json::from_str(text)?)
    }
}

/// JSON -> noeud. Les valeurs repassent par `Number::create`, les calculs sont
/// reconstruits sans simplification, les scans ne sont pas analysés.
pub fn from_json(json: &CalcJson) -> Result<Operand> {
    match json {
        CalcJson::IntermediaryNumber { value } => Ok(Operand::Number(Number::create(value.as_str())?)),
        CalcJson::IntermediaryCalculation {
            left,
            operation,
            right,
        } => Ok(Operand::Calculation(Calculation::new(
            from_json(left)?,
            *operation,
            from_json(right)?,
        ))),
        CalcJson::TokenScan { value } => Ok(Operand::Scan(TokenScan::new(value.as_str()))),
    }
}

/// Raccourci texte JSON -> noeud.
pub fn from_json_str(text: &str) -> Result<Operand> {
    from_json(&CalcJson::from_json_str(text)?)
}
