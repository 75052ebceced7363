//! Staging carts: the borrow or return in progress at the desk

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Width of the barcode columns
pub const MAX_BARCODE_LEN: usize = 100;

/// Trimmed barcode; blank or over-long input is rejected before it is staged or stored
pub fn clean_barcode(raw: &str) -> AppResult<&str> {
    let barcode = raw.trim();
    if barcode.is_empty() {
        return Err(AppError::Validation("Barcode is required".to_string()));
    }
    if barcode.chars().count() > MAX_BARCODE_LEN {
        return Err(AppError::Validation(format!(
            "Barcode is longer than {} characters",
            MAX_BARCODE_LEN
        )));
    }
    Ok(barcode)
}

/// The two global staging slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CartSlot {
    Borrow,
    Return,
}

impl CartSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartSlot::Borrow => "borrow",
            CartSlot::Return => "return",
        }
    }

    /// Cache key of the staged user
    pub fn user_key(&self) -> String {
        format!("{}:user", self.as_str())
    }

    /// Cache key of the scanned items list
    pub fn items_key(&self) -> String {
        format!("{}:books", self.as_str())
    }
}

impl std::fmt::Display for CartSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Person the cart is staged for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CartUser {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
}

/// Scanned item; `name` is set when the barcode matched a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub barcode: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
}

/// Full content of a slot
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Cart {
    pub user: Option<CartUser>,
    pub items: Vec<CartItem>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddCartItem {
    #[validate(length(min = 1, max = 100))]
    pub barcode: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_keys() {
        assert_eq!(CartSlot::Borrow.user_key(), "borrow:user");
        assert_eq!(CartSlot::Borrow.items_key(), "borrow:books");
        assert_eq!(CartSlot::Return.user_key(), "return:user");
        assert_eq!(CartSlot::Return.items_key(), "return:books");
    }

    #[test]
    fn test_clean_barcode() {
        assert_eq!(clean_barcode("  BC1\t").unwrap(), "BC1");
        assert!(matches!(clean_barcode(" "), Err(AppError::Validation(_))));

        let longest = "9".repeat(MAX_BARCODE_LEN);
        assert_eq!(clean_barcode(&longest).unwrap(), longest);
        let too_long = "9".repeat(MAX_BARCODE_LEN + 1);
        assert!(matches!(clean_barcode(&too_long), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_unresolved_item_payload() {
        let item = CartItem {
            barcode: "BC2".to_string(),
            name: None,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"barcode":"BC2"}"#);
        let back: CartItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
