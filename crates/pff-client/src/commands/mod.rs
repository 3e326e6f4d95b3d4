//! Command handlers for the `pff` CLI

pub mod extract;
pub mod inspect;
pub mod pack;
