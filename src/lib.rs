//! partner-catalog: validate partner records and publish the partner manifest.
//!
//! Each partner lives in its own directory with a declaration file and a set
//! of branding images. A run scans those directories, validates every
//! partner, aggregates the valid records into a JSON manifest, and publishes
//! the manifest and images to an object store, removing images of partners
//! that are gone.
//!
//! Pipeline, leaf-first:
//! [`scan`] → [`partner`] → [`assets`] + [`fields`] → [`aggregate`] → [`publish`].
//! The remote side is reached only through [`contract::RemoteStore`].

pub mod aggregate;
pub mod assets;
pub mod cli;
pub mod config;
pub mod contract;
pub mod fields;
pub mod load_config;
pub mod partner;
pub mod publish;
pub mod scan;
pub mod store;

pub use cli::{run, Cli, Commands};
