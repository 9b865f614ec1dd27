// src/integrations/mod.rs
//
// External Integrations Module

pub mod moaplay;

pub use moaplay::MoaplayClient;
