pub mod client;

pub use client::MoaplayClient;
