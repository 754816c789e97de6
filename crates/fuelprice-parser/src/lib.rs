pub mod columns;
pub mod errors;
pub mod model;
mod reader;

pub use columns::{ColumnKind, SourceColumn};
pub use errors::ParserError;
pub use model::{RawPriceTable, ReadOptions, DEFAULT_DATE_FORMAT};
pub use reader::{read_price_str, read_price_table};
