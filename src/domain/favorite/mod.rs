pub mod entity;
pub mod invariants;

pub use entity::{
    FavoritePage, FavoriteRecord, FavoriteState, Pagination, ToggleOutcome, ToggleState,
};
pub use invariants::{validate_event_id, validate_page_params, MAX_PAGE_SIZE};
