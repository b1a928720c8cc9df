//! Item sources for the coordinator
//!
//! A source is anything that hands out work items one at a time. Text sources implement
//! [`ReadString`]; the three built-in variants (fixed list, line stream, regex filter) are
//! gathered in the [`StringSource`] enum so they can be composed without boxing trait objects.
//!
//! Whatever the origin, items reach the workers through a [`Feed`]: a single channel that is
//! closed exactly once when production ends.
//!
//! ```rust
//! use fanout::source::{ReadString, StringSource};
//! use regex::Regex;
//!
//! let list = StringSource::list(["alpha", "beta", "gamma"]);
//! let mut filtered = StringSource::filtered(list, Regex::new("^[ab]").unwrap());
//!
//! assert_eq!(filtered.read_string().as_deref(), Some("alpha"));
//! assert_eq!(filtered.read_string().as_deref(), Some("beta"));
//! assert_eq!(filtered.read_string(), None);
//! ```

pub mod feed;
pub mod filter;
pub mod lines;
pub mod list;

use regex::Regex;
use std::io::BufRead;

pub use feed::{Feed, Paged, PagedIterator};
pub use filter::FilteredReader;
pub use lines::LineReader;
pub use list::ListReader;

/// Pull-based producer of text items.
///
/// Returns `None` once the sequence is exhausted, and keeps returning `None` on every call
/// after that. Items are never empty strings.
pub trait ReadString {
    fn read_string(&mut self) -> Option<String>;
}

impl<R: ReadString + ?Sized> ReadString for Box<R> {
    fn read_string(&mut self) -> Option<String> {
        (**self).read_string()
    }
}

/// The built-in text producers
pub enum StringSource {
    List(ListReader),
    Lines(LineReader),
    Filtered(FilteredReader),
}

impl StringSource {
    /// Fixed list of strings, returned in order
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StringSource::List(ListReader::new(items))
    }

    /// One trimmed, non-empty line per item from a buffered stream
    pub fn lines<R: BufRead + Send + 'static>(reader: R) -> Self {
        StringSource::Lines(LineReader::new(reader))
    }

    /// Only the items of `inner` that match `pattern`
    pub fn filtered(inner: StringSource, pattern: Regex) -> Self {
        StringSource::Filtered(FilteredReader::new(inner, pattern))
    }
}

impl ReadString for StringSource {
    fn read_string(&mut self) -> Option<String> {
        match self {
            StringSource::List(reader) => reader.read_string(),
            StringSource::Lines(reader) => reader.read_string(),
            StringSource::Filtered(reader) => reader.read_string(),
        }
    }
}

impl std::fmt::Debug for StringSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StringSource::List(reader) => f.debug_tuple("List").field(reader).finish(),
            StringSource::Lines(_) => f.write_str("Lines"),
            StringSource::Filtered(reader) => f.debug_tuple("Filtered").field(reader).finish(),
        }
    }
}
