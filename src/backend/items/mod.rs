//! Wish Items
//!
//! Item CRUD, image upload and the reservation workflow. Items carry no
//! sharing state of their own; access is always evaluated against the
//! parent wishlist.

pub mod handlers;
pub mod reservation;
pub mod service;

pub use service::ItemService;
