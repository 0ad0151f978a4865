// src/models/mod.rs

pub mod message;
pub mod quiz;
