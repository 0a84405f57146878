//! Channel Readiness Index
//!
//! Lead-capture service: renders the Channel Readiness questionnaire, scores
//! submissions and appends them to a CSV lead file. An `admin` query flag
//! switches the page to a read-only listing with CSV export and per-lead
//! text reports.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `lead_store`: Append-only CSV lead storage.
//! - `models`: Core data models.
//! - `pages`: Server-rendered HTML.
//! - `questionnaire`: Pillars, questions, scale and tier bands.
//! - `report`: Plain-text lead report.
//! - `scoring`: Readiness score computation.
//! - `validation`: Form validation and prefill.
//! - `view`: Client/admin view selection.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod lead_store;
pub mod models;
pub mod pages;
pub mod questionnaire;
pub mod report;
pub mod scoring;
pub mod validation;
pub mod view;
