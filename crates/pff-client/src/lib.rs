//! PFF client library
//!
//! This library provides the command handlers for the `pff` CLI tool.

pub mod commands;
