#![doc = "s3-deploy-core: core upload pipeline for s3-deploy."]

//! This crate contains all logic for deploying a directory tree to object
//! storage: file discovery and filtering, per-file metadata and key
//! derivation, bounded concurrent upload, and CDN invalidation planning.
//! Cloud SDKs stay out of it; they plug in through the traits in [`contract`].
//!
//! # Usage
//! Build a [`deploy::DeployConfig`], provide a [`contract::StorageClient`] and a
//! [`contract::CdnClient`], and call [`deploy::deploy`].

pub mod contract;
pub mod deploy;
pub mod error;
pub mod invalidation;
pub mod metadata;
pub mod options;
pub mod paths;
pub mod pipeline;
pub mod rule;
pub mod uploader;
pub mod walker;

pub use deploy::{deploy, DeployConfig, DeployReport};
pub use error::DeployError;
