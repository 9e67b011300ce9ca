//! tabula_engine - A1 addressing, grid storage, ranges and row/column views.

pub mod engine;
