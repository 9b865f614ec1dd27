pub mod entity;

pub use entity::{MonthRange, ScheduleItem, ScheduleQuery};
