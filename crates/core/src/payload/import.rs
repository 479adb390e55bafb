//! Product import payload.
//!
//! ```json
//! {
//!   "store_url": "test-store.myshopify.com",
//!   "product": {
//!     "id": 632910392,
//!     "title": "IPod Nano - 8GB",
//!     "description": "It's the small iPod with one very big idea.",
//!     "product_type": "Cult Products",
//!     "variants": [
//!       {"id": 808950810, "title": "Pink", "sku": "IPOD2008PINK",
//!        "price": "199.00", "compare_at_price": "249.00", "inventory_quantity": 10}
//!     ]
//!   }
//! }
//! ```

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::{
    array, identifier, join, non_negative_int, object, optional_text, price, required_text, root,
};
use crate::types::Price;
use crate::validation::ValidationErrors;

const TITLE_MAX: usize = 255;
const SHORT_TEXT_MAX: usize = 100;

/// A validated product import request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImport {
    /// Store URL identifying the merchant.
    pub store_url: String,
    /// Product to upsert.
    pub product: ProductInput,
}

/// A validated product from an import payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    /// Product id in the source platform.
    pub external_id: String,
    /// Product title.
    pub title: String,
    /// Description; `None` keeps the stored value on update.
    pub description: Option<String>,
    /// Product type; `None` keeps the stored value on update.
    pub product_type: Option<String>,
    /// Variants to merge into the product.
    pub variants: Vec<VariantInput>,
}

/// A validated variant from an import payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInput {
    /// Variant id in the source platform.
    pub external_id: String,
    /// Variant title (e.g. "Pink / Large").
    pub title: String,
    /// SKU, if the source platform sent one.
    pub sku: Option<String>,
    /// Selling price.
    pub price: Price,
    /// Original price before discount.
    pub compare_at_price: Option<Price>,
    /// Units in stock.
    pub inventory_quantity: i32,
}

impl VariantInput {
    /// Retail price: the compare-at price when present, otherwise the price.
    #[must_use]
    pub fn retail_price(&self) -> Price {
        self.compare_at_price.unwrap_or(self.price)
    }
}

impl ProductImport {
    /// Validate an import request body.
    ///
    /// # Errors
    ///
    /// Returns every offending field, keyed by path, if the body is invalid.
    pub fn from_json(body: &Value) -> Result<Self, ValidationErrors> {
        let root = root(body)?;
        let mut errors = ValidationErrors::new();

        let store_url = required_text(root, "store_url", "", Some(TITLE_MAX), &mut errors);
        let product = object(root.get("product"), "product", &mut errors)
            .and_then(|map| ProductInput::read(map, "product", &mut errors));

        match (store_url, product) {
            (Some(store_url), Some(product)) => errors.into_result(Self { store_url, product }),
            _ => Err(errors),
        }
    }
}

impl ProductInput {
    fn read(map: &Map<String, Value>, prefix: &str, errors: &mut ValidationErrors) -> Option<Self> {
        let external_id = identifier(map, prefix, errors);
        let title = required_text(map, "title", prefix, Some(TITLE_MAX), errors);
        let description = optional_text(map, "description", prefix, None, errors);
        let product_type = optional_text(map, "product_type", prefix, Some(SHORT_TEXT_MAX), errors);

        let variants = array(map, "variants", prefix, errors).and_then(|items| {
            let list_path = join(prefix, "variants");
            let mut variants = Vec::with_capacity(items.len());
            let mut all_valid = true;
            for (index, item) in items.iter().enumerate() {
                let path = format!("{list_path}[{index}]");
                match object(Some(item), &path, errors)
                    .and_then(|variant| VariantInput::read(variant, &path, errors))
                {
                    Some(variant) => variants.push(variant),
                    None => all_valid = false,
                }
            }
            (all_valid && check_unique_ids(&variants, &list_path, errors)).then_some(variants)
        });

        Some(Self {
            external_id: external_id?,
            title: title?,
            description: description.ok()?,
            product_type: product_type.ok()?,
            variants: variants?,
        })
    }
}

impl VariantInput {
    fn read(map: &Map<String, Value>, prefix: &str, errors: &mut ValidationErrors) -> Option<Self> {
        let external_id = identifier(map, prefix, errors);
        let title = required_text(map, "title", prefix, Some(TITLE_MAX), errors);
        let sku = optional_text(map, "sku", prefix, Some(SHORT_TEXT_MAX), errors);
        let price_value = price(map, "price", prefix, true, errors);
        let compare_at_price = price(map, "compare_at_price", prefix, false, errors);
        let inventory_quantity = non_negative_int(map, "inventory_quantity", prefix, errors);

        Some(Self {
            external_id: external_id?,
            title: title?,
            sku: sku.ok()?,
            price: price_value.ok()??,
            compare_at_price: compare_at_price.ok()?,
            inventory_quantity: inventory_quantity?,
        })
    }
}

/// Reject a payload that lists the same variant id twice.
fn check_unique_ids(variants: &[VariantInput], list_path: &str, errors: &mut ValidationErrors) -> bool {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut unique = true;
    for (index, variant) in variants.iter().enumerate() {
        if let Some(first) = seen.insert(variant.external_id.as_str(), index) {
            errors.add(
                format!("{list_path}[{index}].external_id"),
                format!("Duplicate variant id, already used at index {first}."),
            );
            unique = false;
        }
    }
    unique
}
