//! `kanzanso` - A personal wellness tracking service
//!
//! This library provides the REST API, domain services and storage behind the
//! Kanzanso app: todos, journaling, moods, gratitude, quotes, quizzes, streaks
//! and daily challenges.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod logging;
pub mod models;
pub mod seed;
pub mod services;
pub mod storage;
pub mod validate;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use storage::{Storage, StorageStats};
