#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for starcheck
//!
//! This library consolidates all functionality for the starcheck tool, which estimates
//! whether the stargazers of a GitHub repository look organically earned or artificially
//! inflated.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`facts`]: Stargazer listing, sampling, contribution fetching and response caching
//! - [`trust`]: Reduction of the collected data into a trust report
//! - [`reports`]: Report rendering for the console and JSON files

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub(crate) type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub(crate) type HashSet<T> = rustc_hash::FxHashSet<T>;

pub mod commands;
pub mod facts;
pub mod reports;
pub mod trust;

pub use crate::commands::{Host, run};
