//! # yorbox
//!
//! Wraps the tag groups that yor generates in Terraform configurations with a toggle expression,
//! so the tags can be switched off with a single boolean variable.
//!
//! - [hcl]: a lossless HCL token stream and a locator for blocks and attributes.
//! - [boxing]: box templates, the tag and toggle scanners, and the transformation engine.
//! - [config]: layered configuration and template rendering.
//! - [processor]: applies a [boxing::Boxer] to source text, files and directories.

pub mod boxing;
pub mod config;
pub mod hcl;
pub mod processor;
