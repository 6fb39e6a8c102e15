#![doc = "reportfill-core: core logic library for reportfill."]

//! Student records, template layouts and Word table editing behind the
//! `reportfill` CLI. Everything that touches files or documents lives here;
//! the CLI crate only parses arguments and configuration.
//!
//! # Pipelines
//! - [`fill::fill_reports`]: one filled document per student record
//! - [`redate::redate_folder`]: rewrite term dates across generated reports
//! - [`tsv::convert_file`]: class list TSV to blank record YAML

pub mod contract;
pub mod dates;
pub mod docx;
pub mod fill;
#[cfg(any(test, feature = "test-export-mocks"))]
pub mod fixture;
pub mod inspect;
pub mod layout;
pub mod record;
pub mod redate;
pub mod report;
pub mod sink;
pub mod tsv;
