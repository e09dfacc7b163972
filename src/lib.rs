//! Trade-contract PDF generation.
//!
//! A [`layout::LayoutPlan`] is computed once from page geometry and font
//! metrics, a [`compose::ContractComposer`] draws and saves the document in
//! one pass, and a [`amend::SignatureAmender`] reopens the saved artifact
//! to add one signature per role. Variable-length text is measured before
//! it is drawn and anything wider than its region aborts the call.

pub mod amend;
pub mod artifact;
pub mod compose;
pub mod config;
mod draw;
pub mod error;
pub mod fonts;
pub mod idgen;
pub mod layout;
pub mod storage;
pub mod trade;

pub use amend::SignatureAmender;
pub use artifact::ArtifactHandle;
pub use compose::ContractComposer;
pub use config::ContractConfig;
pub use error::{ContractError, Result};
pub use fonts::{FontCatalog, FontSpec};
pub use idgen::DisplayIdGenerator;
pub use layout::{LayoutPlan, PageGeometry, Region};
pub use storage::{ContractStore, StorageError};
pub use trade::{Party, Signee, Trade};
