pub mod icons;
pub mod output;
pub mod table;

pub use icons::Icons;
pub use output::{amount, dim, error, header, info, section, success, summary_row, timing, warn, Palette};
pub use table::{asset_class_table, commitment_table, investor_table, stats_table};
