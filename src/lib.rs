//! Helena ↔ FACTA API Library
//!
//! Backend-for-frontend that lets the Helena conversational agent query
//! payroll-loan offers and drive the FACTA formalization workflow.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `facta_client`: FACTA lender API client.
//! - `formalization`: Formalization workflow.
//! - `handlers`: HTTP request handlers.
//! - `models`: Request, response and domain models.
//! - `normalizer`: Tolerant readers for lender JSON.
//! - `offers`: Offer lookup.
//! - `routes`: Router construction.
//! - `table_selector`: Rate-table ranking.

// Applicant profiles in tests are large `json!` literals
#![recursion_limit = "256"]

pub mod api;
pub mod core;
pub mod integrations;

pub mod config;
pub mod errors;
pub mod facta_client;
pub mod formalization;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod offers;
pub mod routes;
pub mod table_selector;
