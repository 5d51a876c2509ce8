pub mod code;

pub use code::{generate_code, is_valid_code, normalize_code, ALPHABET, CODE_LENGTH};
