//! Response-to-view transformations.
//!
//! Turns a bot message's raw analysis payload into chart series and
//! table cells ready for rendering. Chart assembly is the selection
//! logic (which series, which axis, which color); table assembly is
//! column derivation plus scalar formatting.

pub mod chart;
pub mod table;

pub use chart::{Axis, ChartSpec, Series, build_chart};
pub use table::{Column, TableSpec, build_table};
