//! Update-resolution pipeline.
//!
//! The pipeline runs in three pure stages over one sync response:
//! [`decode`] turns the raw document into install records and secured
//! fragments, [`candidates`] groups and architecture-filters the records,
//! and [`identities`] decides against the installed inventory which
//! packages need an update and in what order. The [`crate::store::Store`]
//! facade drives the stages.

pub mod candidates;
pub mod decode;
pub mod identities;

pub use candidates::{resolve_candidates, Candidate};
pub use decode::{decode_sync_catalog, InstallRecord, SecuredFragment, SyncCatalog};
pub use identities::build_update_identities;
