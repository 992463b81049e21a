//! Payment method and card form types.

use serde::{Deserialize, Serialize};

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit card; requires a complete [`CardForm`].
    #[default]
    CreditCard,
    /// PayPal; no extra fields collected client-side.
    Paypal,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::Paypal => "paypal",
        }
    }
}

/// Card details collected at step 2.
///
/// Validation is presence-only; card networks do the real checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CardForm {
    pub card_number: String,
    pub card_name: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl CardForm {
    /// Names of required card fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let required: [(&'static str, &str); 4] = [
            ("card number", &self.card_number),
            ("name on card", &self.card_name),
            ("expiry date", &self.expiry_date),
            ("cvv", &self.cvv),
        ];
        required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Check whether all card fields are filled.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}
