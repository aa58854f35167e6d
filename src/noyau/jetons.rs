// src/noyau/jetons.rs
//
// Découpage d’un texte de calcul en jetons (intervalles d’octets typés).
//
// - blancs          : ignorés (mais comptent pour la contiguïté)
// - numériques      : 12, .5, 46.53r, 1.1(23), 0.1[23]r ...
// - opérations      : + - * x / %
// - parenthèses     : ( )
//
// Puis deux retouches :
// - "12" suivi de ".5" -> "12.5"
// - '-' en tête, ou après '(' / une opération, collé au numérique suivant -> négatif

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::ScanError;

static RE_BLANCS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static RE_NUMERIQUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d*\.\d*\(\d+\)r?|\d*\.\d*\[\d+\]r?|\d+(?:\.\d+r)?|\.\d+r?").unwrap()
});

static RE_OPERATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[+/*x%-]").unwrap());

static RE_OUVRANTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(").unwrap());

static RE_FERMANTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\)").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Ignore,
    NestingOpen,
    NestingClose,
    Numeric,
    Operation,
}

/// Intervalle [from, to) dans le texte source (octets).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TokenSpan {
    pub from: usize,
    pub to: usize,
    pub kind: SpanKind,
}

impl TokenSpan {
    pub fn new(from: usize, to: usize, kind: SpanKind) -> TokenSpan {
        TokenSpan { from, to, kind }
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.from..self.to]
    }
}

fn collect(out: &mut Vec<TokenSpan>, re: &Regex, text: &str, kind: SpanKind) {
    out.extend(re.find_iter(text).map(|m| TokenSpan::new(m.start(), m.end(), kind)));
}

/// Découpe + validation + retouches. Les blancs ne figurent pas dans le résultat.
pub fn scan(text: &str) -> Result<Vec<TokenSpan>, ScanError> {
    let mut tokens: Vec<TokenSpan> = Vec::new();

    collect(&mut tokens, &RE_BLANCS, text, SpanKind::Ignore);
    collect(&mut tokens, &RE_NUMERIQUE, text, SpanKind::Numeric);
    collect(&mut tokens, &RE_OPERATION, text, SpanKind::Operation);
    collect(&mut tokens, &RE_OUVRANTE, text, SpanKind::NestingOpen);
    collect(&mut tokens, &RE_FERMANTE, text, SpanKind::NestingClose);

    tokens.sort_by_key(|t| t.from);

    // parenthèses d’une période "1.1(23)" : elles appartiennent au numérique
    let periodiques: Vec<TokenSpan> = tokens
        .iter()
        .filter(|t| t.kind == SpanKind::Numeric && t.text(text).contains(['(', ')']))
        .copied()
        .collect();

    tokens.retain(|t| {
        if !matches!(t.kind, SpanKind::NestingOpen | SpanKind::NestingClose) {
            return true;
        }
        !periodiques.iter().any(|n| t.from >= n.from && t.to <= n.to)
    });

    valide(text, &tokens)?;

    tokens.retain(|t| t.kind != SpanKind::Ignore);

    Ok(retouche(text, tokens))
}

fn valide(text: &str, tokens: &[TokenSpan]) -> Result<(), ScanError> {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return Err(ScanError::NoTokens);
    };
    if first.from != 0 {
        return Err(ScanError::FirstTokenNotAtStart);
    }
    if last.to != text.len() {
        return Err(ScanError::LastTokenNotAtEnd);
    }

    let mut balance: i64 = 0;
    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            SpanKind::NestingOpen => balance += 1,
            SpanKind::NestingClose => balance -= 1,
            _ => {}
        }
        if index > 0 && tokens[index - 1].to != token.from {
            return Err(ScanError::TokenGap { index });
        }
    }

    if balance != 0 {
        return Err(ScanError::ImbalancedNesting);
    }
    Ok(())
}

fn retouche(text: &str, mut tokens: Vec<TokenSpan>) -> Vec<TokenSpan> {
    /* ---- entier + ".chiffres" ---- */

    // indices décroissants : les fusions ne décalent pas les suivantes
    let mut fusions: Vec<usize> = Vec::new();
    for i in (1..tokens.len()).rev() {
        let previous = tokens[i - 1];
        let current = tokens[i];
        if previous.kind == SpanKind::Numeric
            && current.text(text).starts_with('.')
            && previous.text(text).bytes().all(|b| b.is_ascii_digit())
        {
            fusions.push(i);
        }
    }
    for i in fusions {
        tokens[i - 1] = TokenSpan::new(tokens[i - 1].from, tokens[i].to, SpanKind::Numeric);
        tokens.remove(i);
    }

    /* ---- moins unaire ---- */

    let est_moins = |t: &TokenSpan| t.kind == SpanKind::Operation && t.text(text) == "-";

    let mut negatifs: Vec<usize> = Vec::new();
    if tokens.len() >= 2 && est_moins(&tokens[0]) && tokens[1].kind == SpanKind::Numeric {
        negatifs.push(0);
    }

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if matches!(token.kind, SpanKind::NestingOpen | SpanKind::Operation)
            && i + 2 < tokens.len()
            && est_moins(&tokens[i + 1])
            && tokens[i + 2].kind == SpanKind::Numeric
        {
            negatifs.push(i + 1);
            i += 3;
            continue;
        }
        i += 1;
    }

    for i in negatifs.into_iter().rev() {
        tokens[i] = TokenSpan::new(tokens[i].from, tokens[i + 1].to, SpanKind::Numeric);
        tokens.remove(i + 1);
    }

    tokens
}

/// Format utilitaire (diagnostic) : jetons séparés par un espace, "⟨num⟩" pour les numériques.
pub fn format_tokens(text: &str, tokens: &[TokenSpan]) -> String {
    tokens
        .iter()
        .map(|t| match t.kind {
            SpanKind::Numeric => format!("⟨{}⟩", t.text(text)),
            _ => t.text(text).to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
