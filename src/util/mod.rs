//! Utility modules

pub mod text;

pub use text::{
    char_type, escape_regex_word, is_punctuation, slice_chars, truncate_to_byte_limit,
    word_range_at, CharType,
};
