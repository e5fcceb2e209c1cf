//! # IO Module
//!
//! Adapter layer between the front desk UI and the domain services.
//!
//! Requests arrive as the `shared` DTOs, are mapped to domain commands (dates,
//! times and categories parsed here), and results are mapped back. Domain
//! errors become JSON `{ error, code }` bodies with a matching HTTP status.
//!
//! ## Current Implementation
//!
//! - **Web Framework**: Axum routers, one per resource
//! - **Serialization**: Serde JSON bodies
//! - **Desk Session**: The `x-desk-passcode` header is checked once here and
//!   handed to the domain as a `SessionContext`

pub mod rest;
