//! Kana data: character tables and practice rows
//!
//! # Components
//! - `charset.rs`: CharacterSet (character → romaji)
//! - `rows.rs`: Practice rows and the active-character filter

pub mod charset;
pub mod rows;

pub use charset::CharacterSet;
pub use rows::RowTable;
