//! CSV reading and writing.

mod header;
mod reader;
mod writer;

pub use header::{Delimiter, normalize_header, sniff_line};
pub use reader::{
    read_bytes, read_first_line, read_grid, read_table, read_table_inferred, read_table_with,
    sniff_delimiter,
};
pub use writer::{render_table, write_bytes, write_table};
