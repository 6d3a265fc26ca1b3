//! # TUI Components
//!
//! UI components for the terminal interface.
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `StatusBar`: Top line with user, query context and status
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `SearchBox`: Single-line search input
//! - `PostTable`: Current page of posts with selection and delete
//!
//! Components receive external data as props, not by reaching into `App`.
//! Each file holds the component's state, events, rendering and tests.

mod post_table;
mod search_box;
mod status_bar;

pub use post_table::{PostTable, PostTableState, TableEvent};
pub use search_box::{SearchBox, SearchEvent};
pub use status_bar::StatusBar;
