//! Shared constants for the page builder.

// ── Grid ────────────────────────────────────────────────────────

/// Number of grid units a row spans.
pub const GRID_UNITS: u32 = 12;

/// Largest percentage a layout descriptor part may carry.
pub const MAX_PERCENT: u32 = 100;

/// Default row width in grid units.
pub const ROW_WIDTH: u32 = 12;

/// Default row height in grid units.
pub const ROW_HEIGHT: u32 = 4;

/// Prefix shared by every column-container row tag (`Column-2`, `Column-70-30`, ...).
pub const ROW_TAG_PREFIX: &str = "Column";

// ── Persistence ─────────────────────────────────────────────────

/// Storage key holding the saved-layout array.
pub const SAVED_LAYOUTS_KEY: &str = "savedLayouts";

/// Default directory for file-backed storage.
pub const DEFAULT_STORE_DIR: &str = ".pagebuilder";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "pagebuilder=info";

// ── Default content ─────────────────────────────────────────────

pub const TEXT_PLACEHOLDER: &str = "This is a new text block. Change the text.";

pub const BUTTON_LABEL: &str = "Click Me";

pub const BUTTON_ALERT: &str = "Button clicked!";

pub const CARD_TITLE: &str = "Welcome to My Card";

pub const CARD_DESCRIPTION: &str = "This is a sample card description. You can edit both the title and description to create your own custom card content.";

/// Placeholder written into new table cells.
pub const TABLE_CELL: &str = "Cell";

/// Rows and columns of a freshly created table.
pub const TABLE_SIZE: usize = 3;
