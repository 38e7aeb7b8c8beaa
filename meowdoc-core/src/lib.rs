#![doc = "meowdoc-core: core pipeline library for meowdoc."]

//! This crate holds the documentation pipeline: corpus collection, concurrent
//! generation through an injected [`contract::Generator`], output writing and
//! MkDocs navigation merging. It has no knowledge of concrete LLM backends.
//!
//! # Usage
//! Build a [`config::PipelineConfig`], pick a generator, and call
//! [`pipeline::run`].

pub mod config;
pub mod contract;
pub mod corpus;
pub mod dispatch;
pub mod error;
pub mod ignore;
pub mod index;
pub mod nav;
pub mod pages;
pub mod pipeline;
pub mod scaffold;
pub mod site_config;
pub mod themes;
pub mod writer;

pub use error::{Error, Result};
