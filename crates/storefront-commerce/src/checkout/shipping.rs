//! Shipping form, saved addresses, and the order shipping payload.

use crate::ids::AddressId;
use serde::{Deserialize, Serialize};

/// The step-1 shipping form.
///
/// All fields except `address2` and `notes` are required for the
/// wizard to advance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ShippingForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// Address line 1.
    pub address: String,
    /// Address line 2 (apt, suite, etc.).
    pub address2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    /// Delivery notes.
    pub notes: String,
}

impl ShippingForm {
    /// Names of required fields that are blank, in form order.
    ///
    /// Empty result means the form passes step-1 validation.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let required: [(&'static str, &str); 9] = [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("postal code", &self.postal_code),
            ("country", &self.country),
        ];
        required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Check whether all required fields are filled.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Pre-fill from a saved address, leaving card/notes fields alone.
    pub fn apply_saved(&mut self, address: &SavedAddress) {
        self.first_name = address.first_name.clone();
        self.last_name = address.last_name.clone();
        if let Some(email) = &address.email {
            self.email = email.clone();
        }
        self.phone = address.phone.clone();
        self.address = address.address_line1.clone();
        self.address2 = address.address_line2.clone().unwrap_or_default();
        self.city = address.city.clone();
        self.state = address.state.clone();
        self.postal_code = address.postal_code.clone();
        self.country = address.country.clone();
    }

    /// Snapshot into the order payload shape.
    pub fn snapshot(&self) -> ShippingInfo {
        ShippingInfo {
            name: format!("{} {}", self.first_name, self.last_name),
            address_line1: self.address.clone(),
            address_line2: self.address2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
            phone: self.phone.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Shipping details as submitted with an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    /// Full recipient name.
    pub name: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    #[serde(default)]
    pub notes: String,
}

/// A previously saved address, as returned by the Address API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedAddress {
    /// Address identifier.
    pub id: AddressId,
    /// Display label (e.g., "Home").
    #[serde(default)]
    pub name: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub phone: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}
