// src/utils/mod.rs

pub mod gemini;
pub mod scoring;
