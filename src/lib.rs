//! Arithmétique exacte sur du texte libre.
//!
//! - valeurs : décimaux exacts, rationnels (périodiques "0.(3)", "1.2r"), chaînes montant
//! - calculs : arbres paresseux, mémorisés, lus de gauche à droite SANS priorité
//!   ("1 + 2 * 3" = 9), seules les parenthèses groupent
//! - scans   : texte analysé à la demande, opérations différées
//! - JSON    : aller-retour de l’arbre
//!
//! ```
//! use intermediary_number::create_if_valid;
//!
//! let v = create_if_valid("1 + (2/3)").unwrap();
//! assert_eq!(v.to_value_string().unwrap(), "1.(6)");
//! assert_eq!(v.to_amount_string().unwrap(), "1.666667");
//! ```

pub mod noyau;

pub use noyau::*;
