//! Core types and trait definitions for the leadline lead store.
//!
//! This crate is free of HTTP and database dependencies. Backends implement
//! [`store::LeadStore`]; everything above them talks to a
//! [`service::LeadService`].

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// returned futures where they matter.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod lead;
pub mod service;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
pub use lead::{CreateLead, Lead, LeadPatch, LeadStatus, NewLead};
pub use service::LeadService;
pub use store::{LeadField, LeadStore, OrderSpec};
