//! Remote collaborators for the Sightline engine.
//!
//! Responsibilities:
//! - Implement the `sightline-core` service traits against HTTP APIs.
//! - Encapsulate request encoding and response decoding for each API.
//!
//! Boundaries:
//! - Do not encode scoring rules (live in `sightline-core`).
//! - Keep credentials out of errors and logs.
//!
//! Invariants:
//! - Thread-safe by default; one client may serve concurrent pipelines.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod google;
