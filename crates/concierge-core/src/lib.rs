//! # Concierge Core
//!
//! Pure routing logic for the Sifnos travel concierge: vocabulary tables,
//! entity extraction, date resolution, intent classification, routing,
//! conversation context and response merging, plus the [`source::DataSource`]
//! trait that backend adapters implement.
//!
//! This crate performs no I/O and pulls in no runtime. The application crate
//! supplies HTTP adapters and drives execution.
//!
//! ```text
//! text ─▶ entities + dates ─▶ intent ─▶ route ─▶ (sources) ─▶ merge
//! ```

pub mod context;
pub mod dates;
pub mod entities;
pub mod intent;
pub mod merge;
pub mod models;
pub mod routing;
pub mod source;
pub mod vocabulary;
