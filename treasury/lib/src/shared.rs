//! Types shared by several resources.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Three-letter ISO 4217 currency code.
///
/// Codes this crate does not know decode as [`Currency::Unknown`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    Aed,
    Aud,
    Brl,
    Cad,
    Chf,
    Cny,
    Czk,
    Dkk,
    Eur,
    Gbp,
    Hkd,
    Ils,
    Inr,
    Jpy,
    Krw,
    Mxn,
    Nok,
    Nzd,
    Php,
    Pln,
    Sek,
    Sgd,
    Usd,
    Zar,
    #[serde(other)]
    Unknown,
}

/// Direction money moves, from the perspective of your account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionDirection {
    /// Money moves from your account to someone else's.
    Credit,
    /// Money is pulled from someone else's account to yours.
    Debit,
}

/// Acknowledgement of an asynchronous create.
///
/// The object is created later; `id` identifies it once it exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncResponse {
    pub id: String,
    pub object: String,
}
