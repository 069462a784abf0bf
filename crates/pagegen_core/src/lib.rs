//! Core pipeline for collection routes.
//!
//! A collection route is a page component whose file path contains parameter
//! segments. Every record returned by the component's collection query becomes
//! one concrete page. This crate holds the pure, synchronous half of that
//! pipeline:
//!
//! ```text
//!  products/{unstable_category}/{unstable_id}.js
//!            │
//!            ▼  pattern::Pattern::parse
//!  [Literal(products), Required(category), Required(id)]
//!            │
//!            ▼  derive::derive_path (+ record)
//!  /products/shoes/42 ────────────┬──────────────────────┐
//!            │                    │                      │
//!            ▼                    ▼                      ▼
//!  match_path::match_path   params::route_params   params::reverse_lookup_params
//!  (optional segments)      {id: "42"}             {id: 42}
//! ```
//!
//! Nothing here performs I/O or suspends, so every function is safe to call
//! repeatedly from any task.

pub mod derive;
pub mod match_path;
pub mod params;
pub mod pattern;
pub mod record;
pub mod slug;

pub use derive::{DeriveOptions, DerivedPath, FieldError, TrailingSlash, derive_path};
pub use match_path::{MatchPath, match_path};
pub use params::{ParamError, QueryParams, RouteParams, reverse_lookup_params, route_params};
pub use pattern::{Param, Pattern, PatternError, Segment};
pub use slug::SlugMode;
