// src/noyau/reduce.rs
//
// Réduction des jetons en arbre de calcul, de gauche à droite, SANS priorité :
// "1 + 2 * 3" = (1 + 2) * 3. Seules les parenthèses groupent.
//
// État :
// - pile externe : parenthèse ouverte, ou opération incomplète (gauche + op)
//                  mise de côté pendant qu’on lit le groupe à droite
// - opérande gauche / droite, opération en attente
// - mode : on attend une opérande gauche ou droite
//
// Toute impasse -> ParseError avec une photo de l’état.

use super::calculation::Calculation;
use super::error::{CalcError, ParseError, ParserSnapshot, Result};
use super::jetons::{SpanKind, TokenSpan};
use super::number::Number;
use super::operand::{Operand, Operation};

enum StackEntry {
    NestingOpen,
    Incomplete { left: Operand, operation: Operation },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OperandMode {
    Left,
    Right,
}

impl OperandMode {
    fn as_str(self) -> &'static str {
        match self {
            OperandMode::Left => "left",
            OperandMode::Right => "right",
        }
    }
}

struct ReduceState<'a> {
    text: &'a str,
    outer_stack: Vec<StackEntry>,
    left_operand: Option<Operand>,
    right_operand: Option<Operand>,
    operation: Option<Operation>,
    operand_mode: OperandMode,
}

/// Jetons (déjà validés par le scan) -> valeur seule ou arbre de calcul.
pub fn parse(text: &str, tokens: &[TokenSpan]) -> Result<Operand> {
    let mut state = ReduceState {
        text,
        outer_stack: Vec::new(),
        left_operand: None,
        right_operand: None,
        operation: None,
        operand_mode: OperandMode::Left,
    };

    let last = tokens.len().saturating_sub(1);
    for (index, span) in tokens.iter().enumerate() {
        match span.kind {
            SpanKind::NestingOpen => state.nesting_open(span)?,
            SpanKind::NestingClose => state.nesting_close(span, index == last)?,
            SpanKind::Numeric => state.numeric(span)?,
            SpanKind::Operation => state.operation(span)?,
            SpanKind::Ignore => return Err(state.error("jeton ignoré inattendu", Some(span))),
        }
    }

    state.finish()
}

impl<'a> ReduceState<'a> {
    fn error(&self, message: &str, span: Option<&TokenSpan>) -> CalcError {
        CalcError::Parse(ParseError {
            message: message.to_string(),
            state: ParserSnapshot {
                stack_depth: self.outer_stack.len(),
                left_operand: self.left_operand.as_ref().map(Operand::to_string_calculation),
                right_operand: self.right_operand.as_ref().map(Operand::to_string_calculation),
                operation: self.operation.map(Operation::symbol),
                operand_mode: self.operand_mode.as_str(),
            },
            span: span.copied(),
            text: self.text.to_string(),
        })
    }

    fn nesting_open(&mut self, span: &TokenSpan) -> Result<()> {
        if self.operand_mode == OperandMode::Left {
            self.outer_stack.push(StackEntry::NestingOpen);
            return Ok(());
        }

        match (self.left_operand.take(), self.operation) {
            (None, _) => {
                if matches!(self.outer_stack.last(), Some(StackEntry::Incomplete { .. })) {
                    return Ok(());
                }
                Err(self.error("parenthèse ouvrante sans opérande gauche", Some(span)))
            }
            (Some(left), None) => {
                self.left_operand = Some(left);
                Err(self.error("parenthèse ouvrante sans opération", Some(span)))
            }
            (Some(left), Some(operation)) => {
                self.outer_stack.push(StackEntry::Incomplete { left, operation });
                self.operation = None;
                self.right_operand = None;
                self.operand_mode = OperandMode::Left;
                Ok(())
            }
        }
    }

    fn numeric(&mut self, span: &TokenSpan) -> Result<()> {
        // "- 5" (moins unaire séparé par un blanc) -> "-5"
        let literal: String = span.text(self.text).chars().filter(|c| !c.is_whitespace()).collect();
        let number = Operand::Number(Number::create(literal)?);

        if self.operand_mode == OperandMode::Left {
            self.left_operand = Some(number);
            self.operand_mode = OperandMode::Right;
            return Ok(());
        }

        let Some(operation) = self.operation else {
            return Err(self.error("opérande droite sans opération", Some(span)));
        };
        let Some(left) = self.left_operand.take() else {
            return Err(self.error("opérande droite sans opérande gauche", Some(span)));
        };

        let mut reduced = Operand::Calculation(Calculation::new(left, operation, number));

        // le groupe courant était lui-même l’opérande droite d’une opération en attente
        if matches!(self.outer_stack.last(), Some(StackEntry::Incomplete { .. })) {
            if let Some(StackEntry::Incomplete { left, operation }) = self.outer_stack.pop() {
                reduced = Operand::Calculation(Calculation::new(left, operation, reduced));
            }
        }

        self.left_operand = Some(reduced);
        self.operation = None;
        self.right_operand = None;
        Ok(())
    }

    fn operation(&mut self, span: &TokenSpan) -> Result<()> {
        if self.left_operand.is_none() {
            return Err(self.error("opération sans opérande gauche", Some(span)));
        }
        if self.operation.is_some() {
            return Err(self.error("opération déjà en attente", Some(span)));
        }

        self.operation = Some(Operation::from_symbol(span.text(self.text))?);
        Ok(())
    }

    fn nesting_close(&mut self, span: &TokenSpan, is_last: bool) -> Result<()> {
        let complete = self.operation.is_none() && self.right_operand.is_none() && self.left_operand.is_some();

        match self.outer_stack.pop() {
            Some(StackEntry::NestingOpen) => {
                if complete {
                    Ok(())
                } else {
                    Err(self.error("parenthèse fermante sur un groupe incomplet", Some(span)))
                }
            }
            Some(StackEntry::Incomplete { left, operation }) => match self.left_operand.take() {
                Some(inner) if complete => {
                    self.left_operand = Some(Operand::Calculation(Calculation::new(left, operation, inner)));
                    self.operand_mode = OperandMode::Right;
                    Ok(())
                }
                inner => {
                    self.left_operand = inner;
                    Err(self.error("parenthèse fermante sur une opération incomplète", Some(span)))
                }
            },
            None => {
                if !is_last && (self.operation.is_some() || self.right_operand.is_some()) {
                    return Err(self.error("parenthèse fermante avec une analyse incomplète", Some(span)));
                }
                Ok(())
            }
        }
    }

    fn finish(mut self) -> Result<Operand> {
        if self.operation.is_none() && self.right_operand.is_none() && self.outer_stack.is_empty() {
            if let Some(left) = self.left_operand.take() {
                return Ok(left);
            }
        }
        Err(self.error("analyse terminée dans un état incomplet", None))
    }
}
