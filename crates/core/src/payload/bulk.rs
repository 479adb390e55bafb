//! Bulk activation payload: `{"product_ids": [1, 2, 3], "active": false}`.

use std::collections::BTreeSet;

use serde_json::Value;

use super::{NOT_AN_INTEGER, array, boolean, root};
use crate::types::ProductId;
use crate::validation::ValidationErrors;

/// A validated bulk activation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkActivation {
    /// Distinct product ids in ascending order. IDs beyond the `INTEGER`
    /// range are dropped since no product can carry them.
    pub product_ids: Vec<ProductId>,
    /// Target status.
    pub active: bool,
}

impl BulkActivation {
    /// Validate a bulk activation request body.
    ///
    /// # Errors
    ///
    /// Returns every offending field if the list is missing, empty or holds
    /// non-integers, or if `active` is not a boolean.
    pub fn from_json(body: &Value) -> Result<Self, ValidationErrors> {
        let root = root(body)?;
        let mut errors = ValidationErrors::new();

        let ids = array(root, "product_ids", "", &mut errors).and_then(|items| {
            if items.is_empty() {
                errors.add("product_ids", "This list may not be empty.");
                return None;
            }
            let mut ids = BTreeSet::new();
            let mut all_valid = true;
            for (index, item) in items.iter().enumerate() {
                match integer(item) {
                    Some(n) => {
                        // Out of `INTEGER` range, so it cannot name a product.
                        if let Ok(id) = i32::try_from(n) {
                            ids.insert(ProductId::new(id));
                        }
                    }
                    None => {
                        errors.add(format!("product_ids[{index}]"), NOT_AN_INTEGER);
                        all_valid = false;
                    }
                }
            }
            all_valid.then(|| ids.into_iter().collect::<Vec<_>>())
        });
        let active = boolean(root, "active", "", &mut errors);

        match (ids, active) {
            (Some(product_ids), Some(active)) => errors.into_result(Self {
                product_ids,
                active,
            }),
            _ => Err(errors),
        }
    }
}

/// Read a JSON integer or an integer string.
fn integer(item: &Value) -> Option<i128> {
    match item {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
