//! radio-dns - service discovery through DNS SRV records over HTTPS
//!
//! This crate finds the servers behind a DNS SRV name without relying on
//! the system resolver:
//! - Resolver: queries a DNS-over-HTTPS endpoint (JSON API) for SRV records
//! - Parser: turns raw answers into [`SrvRecord`]s, skipping anything else
//! - Ranker: orders records by priority and weight into a [`ServerList`]
//! - Strategies: picks one server per request (random, round-robin, weighted)
//!
//! # Example
//!
//! ```no_run
//! use radio_dns::{DohResolver, ServerList, SelectionStrategy, parse_answers};
//! use std::sync::atomic::AtomicUsize;
//!
//! # async fn example() -> radio_dns::Result<()> {
//! let resolver = DohResolver::cloudflare()?;
//! let answers = resolver.query_srv("_api._tcp.radio-browser.info").await?;
//!
//! let batch = parse_answers(&answers);
//! let servers = ServerList::from_records(batch.records);
//!
//! let cursor = AtomicUsize::new(0);
//! if let Some(server) = SelectionStrategy::Random.select(&servers, &cursor, &mut rand::rng()) {
//!     println!("using {}", server.url);
//! }
//! # Ok(())
//! # }
//! ```

mod doh;
pub mod error;
pub mod mock;
mod rank;
mod srv;
mod strategy;

pub use doh::{
    decode_response, DohResolver, RawAnswer, DEFAULT_DOH_ENDPOINT, DEFAULT_TIMEOUT,
    DNS_JSON_CONTENT_TYPE,
};
pub use error::{Error, Result};
pub use rank::{rank, ServerEntry, ServerList};
pub use srv::{decode_answer, parse_answers, AnswerOutcome, SkipReason, SrvBatch, SrvParseError, SrvRecord};
pub use strategy::SelectionStrategy;
