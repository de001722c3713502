pub mod json;

pub use json::{FileStats, JsonArrayWriter, write_json_array};
