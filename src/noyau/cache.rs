// src/noyau/cache.rs
//
// Cache de conversions, porté par chaque noeud (valeur, calcul).
// Une case = Mutex<Option<T>> : remplie au plus une fois par cycle, vidée par dispose().
// Le calcul se fait HORS verrou (pas de verrou ré-entrant pendant une résolution récursive).

use num_rational::BigRational;
use parking_lot::Mutex;

use super::decimal::Decimal;
use super::error::Result;

#[derive(Debug, Default)]
pub(crate) struct ConversionCache {
    pub(crate) decimal: Mutex<Option<Decimal>>,
    pub(crate) rational: Mutex<Option<BigRational>>,
    pub(crate) string: Mutex<Option<String>>,
    pub(crate) amount: Mutex<Option<String>>,
}

impl ConversionCache {
    pub(crate) fn dispose(&self) {
        *self.decimal.lock() = None;
        *self.rational.lock() = None;
        *self.string.lock() = None;
        *self.amount.lock() = None;
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.decimal.lock().is_none()
            && self.rational.lock().is_none()
            && self.string.lock().is_none()
            && self.amount.lock().is_none()
    }
}

/// Lit la case, sinon calcule puis mémorise (les échecs ne sont pas mémorisés).
pub(crate) fn memo<T: Clone>(slot: &Mutex<Option<T>>, compute: impl FnOnce() -> Result<T>) -> Result<T> {
    if let Some(v) = slot.lock().as_ref() {
        return Ok(v.clone());
    }

    let value = compute()?;
    *slot.lock() = Some(value.clone());
    Ok(value)
}
