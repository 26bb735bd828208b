//! Library preferences for shelf.
//!
//! Every toggle the library pipeline reads lives on a plain [`Preferences`]
//! value that is handed to the pipeline explicitly; nothing reads
//! preferences from process-global state. Values are layered by [`load`]:
//!
//! 1. Built-in defaults ([`Preferences::default`]).
//! 2. A configuration file (TOML, YAML or JSON, chosen by extension).
//! 3. Environment variables prefixed with `SHELF_`, using `__` to descend
//!    into sections (e.g. `SHELF_BADGES__LANGUAGE=true` or
//!    `SHELF_FILTERS__TRACKING__2=exclude`).

pub mod error;
mod load;
mod prefs;
mod tristate;

pub use crate::load::{default_path, load};
pub use crate::prefs::{BadgePreferences, DisplayPreferences, FilterPreferences, Preferences};
pub use crate::tristate::TriState;
