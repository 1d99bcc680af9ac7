//! Execution Tests Module
//!
//! DAO round trips and in-memory engine behavior.

pub mod dao;
pub mod memory_engine;
