//! Parsers: référentiel CSV et saisie de codes PR

pub mod selection;
pub mod table;
