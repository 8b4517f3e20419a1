//! Personal income tax engine.
//!
//! This crate exposes the tax calculation service and its HTTP API as
//! reusable modules.  External applications may depend on the
//! `naira_tax` crate and call [`engine::TaxService::calculate_tax`]
//! directly or embed the API via [`api::build_router`].

pub mod models;
pub mod deductions;
pub mod tax;
pub mod engine;
pub mod scenarios;
pub mod config;
pub mod api;
