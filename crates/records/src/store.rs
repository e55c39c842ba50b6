//! Read-only indexed record store.

use std::collections::HashMap;

use tracing::debug;

use crate::{Error, Product, RecordId, Result, Seed, User};

const SEED: &str = include_str!("../data/seed.json");

/// Immutable store of users and products.
///
/// Built once, then only read. Records keep their seed order; lookups by id
/// go through a hash index and searches scan precomputed lowercase fields.
#[derive(Debug, Clone)]
pub struct RecordStore {
    users: Vec<User>,
    user_index: HashMap<RecordId, usize>,
    user_haystacks: Vec<(String, String)>,
    products: Vec<Product>,
    product_index: HashMap<RecordId, usize>,
}

impl RecordStore {
    /// Build the store from the bundled seed data.
    pub fn seeded() -> Result<Self> {
        Self::from_json(SEED)
    }

    /// Build the store from a JSON seed document.
    pub fn from_json(json: &str) -> Result<Self> {
        let seed: Seed = serde_json::from_str(json)?;
        Self::from_records(seed.users, seed.products)
    }

    /// Build the store from already-decoded records.
    pub fn from_records(users: Vec<User>, products: Vec<Product>) -> Result<Self> {
        let user_index = index_by_id("users", users.iter().map(|u| u.id))?;
        let product_index = index_by_id("products", products.iter().map(|p| p.id))?;
        let user_haystacks = users
            .iter()
            .map(|u| (u.name.to_lowercase(), u.email.to_lowercase()))
            .collect();

        debug!(
            users = users.len(),
            products = products.len(),
            "record store loaded"
        );

        Ok(Self {
            users,
            user_index,
            user_haystacks,
            products,
            product_index,
        })
    }

    /// All users in seed order.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// All products in seed order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn user(&self, id: RecordId) -> Option<&User> {
        self.user_index.get(&id).map(|&i| &self.users[i])
    }

    pub fn product(&self, id: RecordId) -> Option<&Product> {
        self.product_index.get(&id).map(|&i| &self.products[i])
    }

    /// Users whose name or email contains `query`, ignoring case.
    ///
    /// An empty query matches every user.
    pub fn search_users(&self, query: &str) -> Vec<&User> {
        let needle = query.to_lowercase();
        self.users
            .iter()
            .zip(&self.user_haystacks)
            .filter(|(_, (name, email))| name.contains(&needle) || email.contains(&needle))
            .map(|(user, _)| user)
            .collect()
    }

    /// Product ids in seed order.
    pub fn product_ids(&self) -> Vec<RecordId> {
        self.products.iter().map(|p| p.id).collect()
    }

    /// Mean product price, or `None` when there are no products.
    pub fn average_price(&self) -> Option<f64> {
        if self.products.is_empty() {
            return None;
        }
        let total: f64 = self.products.iter().map(|p| p.price).sum();
        Some(total / self.products.len() as f64)
    }
}

fn index_by_id(
    collection: &'static str,
    ids: impl Iterator<Item = RecordId>,
) -> Result<HashMap<RecordId, usize>> {
    let mut index = HashMap::new();
    for (position, id) in ids.enumerate() {
        if index.insert(id, position).is_some() {
            return Err(Error::DuplicateId { collection, id });
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RecordStore {
        RecordStore::seeded().unwrap()
    }

    #[test]
    fn seeded_store_keeps_order() {
        let store = store();
        let names: Vec<_> = store.users().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob", "Charlie"]);
        assert_eq!(store.product_ids(), vec![101, 102, 103]);
    }

    #[test]
    fn lookup_by_id() {
        let store = store();
        assert_eq!(store.user(2).map(|u| u.email.as_str()), Some("bob@example.com"));
        assert_eq!(store.product(103).map(|p| p.name.as_str()), Some("Keyboard"));
        assert!(store.user(999).is_none());
        assert!(store.product(1).is_none());
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_email() {
        let store = store();
        let hits = store.search_users("BOB");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);

        let hits = store.search_users("example.com");
        assert_eq!(hits.len(), 3);

        assert!(store.search_users("zed").is_empty());
    }

    #[test]
    fn search_does_not_match_across_fields() {
        let store = RecordStore::from_records(
            vec![User::new(1, "Ann", "x@y.z")],
            Vec::new(),
        )
        .unwrap();
        assert!(store.search_users("annx").is_empty());
    }

    #[test]
    fn average_price() {
        let avg = store().average_price().unwrap();
        assert!((avg - (999.99 + 29.99 + 79.99) / 3.0).abs() < 1e-9);

        let empty = RecordStore::from_records(Vec::new(), Vec::new()).unwrap();
        assert!(empty.average_price().is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = RecordStore::from_records(
            Vec::new(),
            vec![Product::new(5, "A", 1.0), Product::new(5, "B", 2.0)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateId {
                collection: "products",
                id: 5
            }
        ));
    }

    #[test]
    fn malformed_seed_is_rejected() {
        let err = RecordStore::from_json(r#"{"users": [{"id": "one"}]}"#).unwrap_err();
        assert!(matches!(err, Error::Seed(_)));
    }
}
