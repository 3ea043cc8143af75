//! # AgroDetect Common Library
//!
//! Shared code for the AgroDetect service crates:
//! - Error and result types
//! - Configuration loading and root folder resolution
//! - Database initialization and models
//! - Password hashing
//! - Diagnosis and voice-language domain types

pub mod config;
pub mod db;
pub mod diagnosis;
pub mod error;
pub mod password;

pub use diagnosis::{DiagnosisResult, Language};
pub use error::{Error, Result};
