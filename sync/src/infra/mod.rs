//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, DNS,
//! filesystem walks and reads, and working-directory lifecycle.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.

pub mod collector;
pub mod command_runner;
pub mod config;
pub mod fs;
pub mod git;
pub mod identity;
pub mod manifest;
pub mod repo;
pub mod resolver;
pub mod tree;
pub mod workdir;
