//! # snowmint
//!
//! Coordinator-free, roughly time-ordered 64-bit identifiers.
//!
//! Every [`SnowflakeId`] packs three fields below a reserved sign bit:
//!
//! ```text
//!  Bit Index:  63           63 62            22 21          18 17             0
//!              +--------------+----------------+--------------+---------------+
//!  Field:      | reserved (1) | timestamp (41) | worker ID (4)| sequence (18) |
//!              +--------------+----------------+--------------+---------------+
//!              |<----------- MSB ---------- 64 bits ----------- LSB --------->|
//! ```
//!
//! The widths above are [`Layout::DEFAULT`]. Any partition whose widths plus
//! the reserved bit sum to 64 is accepted by [`Layout::new`].
//!
//! ## Example
//!
//! ```
//! use snowmint::{GeneratorConfig, SnowflakeGenerator};
//!
//! let generator = GeneratorConfig::new(3).bits(41, 4, 18).build_lock()?;
//!
//! let a = generator.next_id()?;
//! let b = generator.next_id()?;
//! assert!(a < b);
//! assert_eq!(generator.decompose(b).worker_id, 3);
//! # Ok::<(), snowmint::Error>(())
//! ```
//!
//! ## Features
//!
//! - `tracing`: trace spans around issuance, warnings on clock anomalies.
//! - `serde`: `Serialize`/`Deserialize` for IDs, parts and configuration.
//! - `cache-padded`: pads generator state to a cache line.
//! - `async-tokio`: awaitable generation that sleeps instead of spinning.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod error;
#[cfg(feature = "async-tokio")]
mod futures;
mod generator;
mod id;
mod layout;
mod policy;
mod status;
mod time;

pub use crate::config::*;
pub use crate::error::*;
#[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
#[cfg(feature = "async-tokio")]
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::layout::*;
pub use crate::policy::*;
pub use crate::status::*;
pub use crate::time::*;
