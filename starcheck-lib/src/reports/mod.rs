//! Report generation for trust scores
//!
//! Two generators are provided, each accessed through a `generate` function:
//! - **Console**: an aligned table of averages and letter grades, optionally colored
//! - **JSON**: machine-readable structured data with the raw values and trust levels
//!
//! Both operate on a [`ReportableRepo`], which pairs the trust scores with what is known
//! about the scanned population. Grading and value formatting live in the `common`
//! module so that both formats agree.

mod common;
mod console;
mod json;
mod reportable_repo;

pub use console::generate as generate_console;
pub use json::generate as generate_json;
pub use reportable_repo::ReportableRepo;
