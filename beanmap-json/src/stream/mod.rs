//! Token-level JSON reading and writing
mod token;
mod reader;
mod writer;

pub use token::TokenKind;
pub use reader::JsonReader;
pub use writer::JsonWriter;

pub(crate) use reader::{parse_integer, parse_float, is_json_number};
