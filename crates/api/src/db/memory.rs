//! In-process [`CatalogStore`] for tests and database-less local runs.
//!
//! All state sits behind one async mutex, so each operation observes and
//! leaves a consistent catalog, matching the transactional guarantees of the
//! `PostgreSQL` store.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use catalog_core::{MerchantId, Price, ProductId, ProductInput, VariantId};

use super::{CatalogStore, RepositoryError};
use crate::models::{
    ImportOutcome, Merchant, NewMerchant, ProductDetail, ProductPage, ProductQuery, ProductSummary,
    Variant,
};

#[derive(Debug, Clone)]
struct StoredProduct {
    merchant_id: MerchantId,
    external_id: String,
    title: String,
    description: String,
    product_type: String,
    active: bool,
    base_price: Price,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredVariant {
    product_id: ProductId,
    external_id: String,
    title: String,
    sku: String,
    price: Price,
    retail_price: Price,
    inventory_quantity: i32,
    active: bool,
}

/// Per-table id counter, like a `SERIAL` column.
#[derive(Debug, Default)]
struct Sequence(i32);

impl Sequence {
    fn next(&mut self) -> Result<i32, RepositoryError> {
        self.0 = self
            .0
            .checked_add(1)
            .ok_or_else(|| RepositoryError::Conflict("id sequence exhausted".to_owned()))?;
        Ok(self.0)
    }
}

#[derive(Debug, Default)]
struct MemoryData {
    merchants: BTreeMap<MerchantId, Merchant>,
    products: BTreeMap<ProductId, StoredProduct>,
    variants: BTreeMap<VariantId, StoredVariant>,
    product_keys: HashMap<(MerchantId, String), ProductId>,
    variant_keys: HashMap<(ProductId, String), VariantId>,
    merchant_ids: Sequence,
    product_ids: Sequence,
    variant_ids: Sequence,
}

impl MemoryData {
    fn summary(id: ProductId, product: &StoredProduct) -> ProductSummary {
        ProductSummary {
            id,
            external_id: product.external_id.clone(),
            title: product.title.clone(),
            base_price: product.base_price,
            active: product.active,
        }
    }

    fn variants_of(&self, product_id: ProductId) -> impl Iterator<Item = (VariantId, &StoredVariant)> {
        self.variants
            .iter()
            .filter(move |(_, v)| v.product_id == product_id)
            .map(|(id, v)| (*id, v))
    }
}

/// Catalog store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    data: Mutex<MemoryData>,
}

impl MemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_listed(product: &StoredProduct, query: &ProductQuery, needle: Option<&str>) -> bool {
    product.merchant_id == query.merchant_id
        && query.active.is_none_or(|active| product.active == active)
        && needle.is_none_or(|needle| {
            product.title.to_lowercase().contains(needle)
                || product.description.to_lowercase().contains(needle)
        })
}

impl CatalogStore for MemoryCatalogStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn create_merchant(&self, merchant: &NewMerchant) -> Result<Merchant, RepositoryError> {
        let mut data = self.data.lock().await;
        if data
            .merchants
            .values()
            .any(|m| m.store_url == merchant.store_url)
        {
            return Err(RepositoryError::Conflict(
                "store URL already exists".to_owned(),
            ));
        }

        let id = MerchantId::new(data.merchant_ids.next()?);
        let created = Merchant {
            id,
            name: merchant.name.clone(),
            email: merchant.email.clone(),
            store_url: merchant.store_url.clone(),
            created_at: Utc::now(),
        };
        data.merchants.insert(id, created.clone());
        Ok(created)
    }

    async fn list_merchants(&self) -> Result<Vec<Merchant>, RepositoryError> {
        Ok(self.data.lock().await.merchants.values().cloned().collect())
    }

    async fn merchant_by_id(&self, id: MerchantId) -> Result<Option<Merchant>, RepositoryError> {
        Ok(self.data.lock().await.merchants.get(&id).cloned())
    }

    async fn merchant_by_store_url(
        &self,
        store_url: &str,
    ) -> Result<Option<Merchant>, RepositoryError> {
        Ok(self
            .data
            .lock()
            .await
            .merchants
            .values()
            .find(|m| m.store_url == store_url)
            .cloned())
    }

    async fn import_product(
        &self,
        merchant_id: MerchantId,
        input: &ProductInput,
    ) -> Result<ImportOutcome, RepositoryError> {
        let mut guard = self.data.lock().await;
        let data = &mut *guard;
        if !data.merchants.contains_key(&merchant_id) {
            return Err(RepositoryError::NotFound);
        }

        let now = Utc::now();
        let key = (merchant_id, input.external_id.clone());
        let (product_id, created) = match data.product_keys.get(&key).copied() {
            Some(id) => {
                let product = data
                    .products
                    .get_mut(&id)
                    .ok_or_else(|| RepositoryError::DataCorruption(format!("dangling product {id}")))?;
                product.title.clone_from(&input.title);
                if let Some(description) = &input.description {
                    product.description.clone_from(description);
                }
                if let Some(product_type) = &input.product_type {
                    product.product_type.clone_from(product_type);
                }
                product.updated_at = now;
                (id, false)
            }
            None => {
                let id = ProductId::new(data.product_ids.next()?);
                data.products.insert(
                    id,
                    StoredProduct {
                        merchant_id,
                        external_id: input.external_id.clone(),
                        title: input.title.clone(),
                        description: input.description.clone().unwrap_or_default(),
                        product_type: input.product_type.clone().unwrap_or_default(),
                        active: true,
                        base_price: Price::ZERO,
                        created_at: now,
                        updated_at: now,
                    },
                );
                data.product_keys.insert(key, id);
                (id, true)
            }
        };

        for variant in &input.variants {
            let key = (product_id, variant.external_id.clone());
            if let Some(existing) = data
                .variant_keys
                .get(&key)
                .copied()
                .and_then(|id| data.variants.get_mut(&id))
            {
                existing.price = variant.price;
                existing.retail_price = variant.retail_price();
                existing.inventory_quantity = variant.inventory_quantity;
                continue;
            }

            let id = VariantId::new(data.variant_ids.next()?);
            data.variants.insert(
                id,
                StoredVariant {
                    product_id,
                    external_id: variant.external_id.clone(),
                    title: variant.title.clone(),
                    sku: variant.sku.clone().unwrap_or_default(),
                    price: variant.price,
                    retail_price: variant.retail_price(),
                    inventory_quantity: variant.inventory_quantity,
                    active: true,
                },
            );
            data.variant_keys.insert(key, id);
        }

        let base_price = data
            .variants_of(product_id)
            .map(|(_, v)| v.price)
            .min()
            .unwrap_or(Price::ZERO);
        if let Some(product) = data.products.get_mut(&product_id) {
            product.base_price = base_price;
        }

        Ok(ImportOutcome {
            product_id,
            created,
        })
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, RepositoryError> {
        let data = self.data.lock().await;
        let needle = query.search.as_deref().map(str::to_lowercase);

        let matching: Vec<_> = data
            .products
            .iter()
            .filter(|(_, p)| is_listed(p, query, needle.as_deref()))
            .collect();

        let items = matching
            .iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .map(|(id, p)| MemoryData::summary(**id, p))
            .collect();

        Ok(ProductPage {
            total: u64::try_from(matching.len()).unwrap_or(u64::MAX),
            items,
        })
    }

    async fn product_detail(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let data = self.data.lock().await;
        let Some(product) = data.products.get(&id) else {
            return Ok(None);
        };
        let merchant = data.merchants.get(&product.merchant_id).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("product {id} has no merchant"))
        })?;

        let variants = data
            .variants_of(id)
            .map(|(variant_id, v)| Variant {
                id: variant_id,
                external_id: v.external_id.clone(),
                title: v.title.clone(),
                sku: v.sku.clone(),
                price: v.price,
                retail_price: v.retail_price,
                inventory_quantity: v.inventory_quantity,
                active: v.active,
            })
            .collect();

        Ok(Some(ProductDetail {
            id,
            merchant_id: product.merchant_id,
            merchant_name: merchant.name.clone(),
            external_id: product.external_id.clone(),
            title: product.title.clone(),
            description: product.description.clone(),
            product_type: product.product_type.clone(),
            active: product.active,
            base_price: product.base_price,
            created_at: product.created_at,
            updated_at: product.updated_at,
            variants,
        }))
    }

    async fn set_active(&self, ids: &[ProductId], active: bool) -> Result<u64, RepositoryError> {
        let mut data = self.data.lock().await;
        let now = Utc::now();
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut matched = 0;
        for id in ids {
            if let Some(product) = data.products.get_mut(&id) {
                product.active = active;
                product.updated_at = now;
                matched += 1;
            }
        }
        Ok(matched)
    }

    async fn deactivate_product(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductSummary>, RepositoryError> {
        let mut data = self.data.lock().await;
        Ok(data.products.get_mut(&id).map(|product| {
            product.active = false;
            product.updated_at = Utc::now();
            MemoryData::summary(id, product)
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use catalog_core::{Email, VariantInput};

    use super::*;

    fn new_merchant(store_url: &str) -> NewMerchant {
        NewMerchant {
            name: "Test Store".to_owned(),
            email: Email::parse("owner@example.com").unwrap(),
            store_url: store_url.to_owned(),
        }
    }

    fn variant(id: &str, price: &str, stock: i32) -> VariantInput {
        VariantInput {
            external_id: id.to_owned(),
            title: format!("Variant {id}"),
            sku: None,
            price: Price::parse(price).unwrap(),
            compare_at_price: None,
            inventory_quantity: stock,
        }
    }

    fn product(id: &str, title: &str, variants: Vec<VariantInput>) -> ProductInput {
        ProductInput {
            external_id: id.to_owned(),
            title: title.to_owned(),
            description: None,
            product_type: None,
            variants,
        }
    }

    fn query(merchant_id: MerchantId) -> ProductQuery {
        ProductQuery {
            merchant_id,
            search: None,
            active: None,
            offset: 0,
            limit: 20,
        }
    }

    #[tokio::test]
    async fn test_duplicate_store_url_conflicts() {
        let store = MemoryCatalogStore::new();
        store.create_merchant(&new_merchant("a.example.com")).await.unwrap();
        let err = store
            .create_merchant(&new_merchant("a.example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_each_table_numbers_its_own_rows() {
        let store = MemoryCatalogStore::new();
        let merchant = store.create_merchant(&new_merchant("ids.example.com")).await.unwrap();
        assert_eq!(merchant.id, MerchantId::new(1));

        let first = store
            .import_product(
                merchant.id,
                &product("p1", "Shirt", vec![variant("v1", "1", 1), variant("v2", "2", 1)]),
            )
            .await
            .unwrap();
        let second = store
            .import_product(merchant.id, &product("p2", "Hat", vec![variant("v1", "3", 1)]))
            .await
            .unwrap();
        assert_eq!(first.product_id, ProductId::new(1));
        assert_eq!(second.product_id, ProductId::new(2));

        let detail = store.product_detail(second.product_id).await.unwrap().unwrap();
        let variant_ids: Vec<_> = detail.variants.iter().map(|v| v.id).collect();
        assert_eq!(variant_ids, [VariantId::new(3)]);
    }

    #[tokio::test]
    async fn test_reimport_merges_variants() {
        let store = MemoryCatalogStore::new();
        let merchant = store.create_merchant(&new_merchant("s.example.com")).await.unwrap();

        let first = store
            .import_product(
                merchant.id,
                &product("p1", "Shirt", vec![variant("v1", "20", 5), variant("v2", "15", 1)]),
            )
            .await
            .unwrap();
        assert!(first.created);

        let second = store
            .import_product(
                merchant.id,
                &product("p1", "Shirt v2", vec![variant("v1", "10", 9), variant("v3", "30", 0)]),
            )
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.product_id, first.product_id);

        let detail = store.product_detail(first.product_id).await.unwrap().unwrap();
        assert_eq!(detail.title, "Shirt v2");
        assert_eq!(detail.variants.len(), 3);
        assert_eq!(detail.variants[0].price.to_string(), "10.00");
        assert_eq!(detail.variants[0].inventory_quantity, 9);
        assert_eq!(detail.base_price.to_string(), "10.00");
    }

    #[tokio::test]
    async fn test_import_keeps_omitted_description() {
        let store = MemoryCatalogStore::new();
        let merchant = store.create_merchant(&new_merchant("d.example.com")).await.unwrap();

        let mut input = product("p1", "Mug", vec![]);
        input.description = Some("Ceramic".to_owned());
        let outcome = store.import_product(merchant.id, &input).await.unwrap();

        store
            .import_product(merchant.id, &product("p1", "Mug", vec![]))
            .await
            .unwrap();
        let detail = store.product_detail(outcome.product_id).await.unwrap().unwrap();
        assert_eq!(detail.description, "Ceramic");
        assert_eq!(detail.base_price, Price::ZERO);
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let store = MemoryCatalogStore::new();
        let merchant = store.create_merchant(&new_merchant("l.example.com")).await.unwrap();
        let other = store.create_merchant(&new_merchant("o.example.com")).await.unwrap();

        for (id, title) in [("1", "Red Shirt"), ("2", "Blue shirt"), ("3", "Hat")] {
            store
                .import_product(merchant.id, &product(id, title, vec![]))
                .await
                .unwrap();
        }
        store
            .import_product(other.id, &product("1", "Other Shirt", vec![]))
            .await
            .unwrap();

        let mut q = query(merchant.id);
        q.search = Some("SHIRT".to_owned());
        let page = store.list_products(&q).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].title, "Red Shirt");

        q.limit = 1;
        q.offset = 1;
        let page = store.list_products(&q).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Blue shirt");
    }

    #[tokio::test]
    async fn test_set_active_counts_existing_products_once() {
        let store = MemoryCatalogStore::new();
        let merchant = store.create_merchant(&new_merchant("b.example.com")).await.unwrap();
        let a = store
            .import_product(merchant.id, &product("a", "A", vec![]))
            .await
            .unwrap();

        let count = store
            .set_active(&[a.product_id, a.product_id, ProductId::new(9999)], false)
            .await
            .unwrap();
        assert_eq!(count, 1);

        let mut q = query(merchant.id);
        q.active = Some(false);
        assert_eq!(store.list_products(&q).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_deactivate_missing_product() {
        let store = MemoryCatalogStore::new();
        assert!(store.deactivate_product(ProductId::new(1)).await.unwrap().is_none());
    }
}
