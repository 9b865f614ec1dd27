pub mod entity;

pub use entity::{EventStatus, EventSummary, UserSummary};
