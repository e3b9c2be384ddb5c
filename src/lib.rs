// src/lib.rs

//! Prospector Library
//!
//! Finds small-business websites that look due for a redesign and keeps
//! track of outreach to them.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
