//! Components - The three runtime behaviors of a portfolio page
//!
//! - **Reveal** - one-shot scroll reveal per region
//! - **Ticker** - live clock plus rotating highlighted item
//! - **Catalog** - category filter over the project list
//!
//! Each instance owns its state and its subscriptions; nothing is shared
//! between instances, and every component releases what it registered when
//! it is unmounted or dropped.

pub mod catalog;
pub mod reveal;
pub mod ticker;

pub use catalog::{CatalogEntry, CatalogFilter, CategoryKey, FilterAction, FilterState, FilterView, ALL_CATEGORIES};
pub use reveal::{RevealController, RevealView};
pub use ticker::{ClockView, LiveClockTicker, TickerAction, TickerChanges, TickerItem, TickerState};
