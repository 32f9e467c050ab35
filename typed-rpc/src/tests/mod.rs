//! Test module for typed-rpc
//!
//! Property-based tests (proptest) and async unit tests covering the
//! procedure pipeline, dispatch, the HTTP adapter and the client.

pub mod support;

pub mod router_tests;
