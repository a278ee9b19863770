//! ShopAssist server library.
//!
//! Customer-service chat backend for the ShopAssist store. A customer
//! message and its conversation history go to a hosted model with
//! instructions to reply in structured JSON; the extracted action is
//! validated, executed against the relational store, and the user-facing
//! reply is rewritten to match what actually happened.
//!
//! # Modules
//!
//! - [`agent`] - Gemini client, prompt assembly, JSON extraction
//! - [`actions`] - Typed action interpretation and dispatch
//! - [`routes`] - HTTP endpoints under `/api/v1`
//! - [`db`] - sqlx repositories over the `PostgreSQL` store

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod actions;
pub mod agent;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
