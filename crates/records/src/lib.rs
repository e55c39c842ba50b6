//! In-memory record store for the data processor server.
//!
//! This crate holds the fixed datasets the demo tools query: a handful of
//! users and products. The data ships with the crate as JSON, is decoded
//! once at startup, and is never written afterwards.
//!
//! # Overview
//!
//! - [`RecordStore`]: the read-only store. Records keep their seed order,
//!   with an id index per collection and precomputed lowercase search
//!   fields for users.
//! - [`User`], [`Product`]: the record types.
//! - [`Seed`]: the shape of a seed document.
//!
//! # Example
//!
//! ```
//! use records::RecordStore;
//!
//! let store = RecordStore::seeded()?;
//!
//! let bob = store.user(2).expect("seeded");
//! assert_eq!(bob.email, "bob@example.com");
//!
//! let hits = store.search_users("ALICE");
//! assert_eq!(hits.len(), 1);
//!
//! assert_eq!(store.product_ids(), vec![101, 102, 103]);
//! # Ok::<(), records::Error>(())
//! ```

mod error;
mod record;
mod store;

pub use error::{Error, Result};
pub use record::{Product, RecordId, Seed, User};
pub use store::RecordStore;
