//! Calendar arithmetic for emocal.
//!
//! Month bounds, the forecast request window, the 6x7 month grid, and the
//! serializable view state they are derived from.

pub mod error;
pub mod grid;
pub mod types;
pub mod view;
pub mod window;

pub use error::CalendarError;
pub use grid::{month_grid, GridCell, GRID_CELLS, GRID_COLUMNS, GRID_ROWS, WEEKDAY_LABELS};
pub use types::{DateRange, YearMonth};
pub use view::ViewState;
pub use window::{horizon, request_window, DEFAULT_HORIZON_DAYS};
