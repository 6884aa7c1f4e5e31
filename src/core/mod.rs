//! Core schedule evaluation: alias tables, field parsing, and the bounded
//! next-occurrence search engine.

pub mod aliases;
pub(crate) mod calendar;
pub mod field;
pub mod schedule;
mod search;
