// src/repositories/mod.rs
//
// Remote data access seams. Implemented over HTTP by
// `integrations::MoaplayClient`; mocked in tests.

pub mod favorite_repository;
pub mod schedule_repository;

pub use favorite_repository::FavoriteRepository;
pub use schedule_repository::ScheduleRepository;

#[cfg(test)]
pub use favorite_repository::MockFavoriteRepository;
#[cfg(test)]
pub use schedule_repository::MockScheduleRepository;
