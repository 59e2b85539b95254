//! Tool function implementations organized by toolset

pub mod context;
pub mod dynamic;
pub mod issues;
pub mod repos;
