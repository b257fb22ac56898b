//! # apkg-filter
//!
//! Extracts the cards of an Anki deck package (`.apkg`) whose chosen field
//! matches a wordlist, and repackages them, together with the media they
//! reference, as a new deck.
//!
//! ## Pipeline
//!
//! ```text
//! ┌────────┐   ┌────────┐   ┌────────┐   ┌────────┐   ┌────────┐   ┌──────┐
//! │ unpack │──▶│ select │──▶│ filter │──▶│ prune  │──▶│ update │──▶│ pack │
//! │  zip   │   │ field  │   │ notes  │   │ media  │   │ SQLite │   │ zip  │
//! └────────┘   └────────┘   └────────┘   └────────┘   └────────┘   └──────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Defaults and optional TOML overrides |
//! | [`archive`] | Unpacking and packing `.apkg` files |
//! | [`db`] | Collection database connection |
//! | [`schema`] | Note types and field selection |
//! | [`wordlist`] | Wordlist loading |
//! | [`filter`] | Note matching |
//! | [`media`] | Media manifest and markup references |
//! | [`prune`] | Removal of unreferenced media |
//! | [`update`] | Note/card deletion and deck rename |
//! | [`pipeline`] | End-to-end run |

pub mod archive;
pub mod config;
pub mod db;
pub mod filter;
pub mod media;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod prune;
pub mod schema;
pub mod update;
pub mod wordlist;

#[cfg(test)]
mod testutil;
