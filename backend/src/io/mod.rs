//! # IO Layer
//!
//! Interfaces exposing the domain to the outside world. Currently only the
//! JSON REST API.

pub mod rest;
