pub mod blocks;
pub mod sections;
pub mod table;

pub use sections::parse_sections;
pub use table::{Row, Table};
