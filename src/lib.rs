//! clusterx - Bitcoin address-cluster explorer
//!
//! This library provides the presentation core for clusterx: everything
//! between a user gesture and the data a view renders, without the
//! rendering itself.
//!
//! ## Architecture
//!
//! - **classify / navigation / router**: search input, clicks and paths
//!   become [`NavigationIntent`]s
//! - **gateway**: typed GETs against the analytics API
//! - **aggregate / views**: concurrent fetches per view, with required and
//!   optional legs
//! - **cursor**: offset arithmetic for paginated lists
//! - **app**: session state, stale-response guard and background runners
//!
//! ## Usage
//!
//! For the command-line front end:
//! ```bash
//! cargo run -- search 1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa
//! ```

pub mod config;
pub mod error;
pub mod types;
pub mod util_text;

pub mod classify;
pub mod navigation;
pub mod router;

pub mod gateway;

pub mod aggregate;
pub mod cursor;
pub mod views;

pub mod app;

pub use app::{App, AppEvent, LoadTicket, PageTicket};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use gateway::{Gateway, HttpGateway};
pub use navigation::NavigationIntent;
pub use views::{ViewSettings, ViewState};
