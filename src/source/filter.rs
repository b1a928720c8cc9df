use super::{ReadString, StringSource};
use regex::Regex;

/// Forwards only the items of an inner source that match a pattern.
#[derive(Debug)]
pub struct FilteredReader {
    inner: Box<StringSource>,
    pattern: Regex,
    done: bool,
}

impl FilteredReader {
    pub fn new(inner: StringSource, pattern: Regex) -> Self {
        Self {
            inner: Box::new(inner),
            pattern,
            done: false,
        }
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl ReadString for FilteredReader {
    fn read_string(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        while let Some(item) = self.inner.read_string() {
            if self.pattern.is_match(&item) {
                return Some(item);
            }
        }
        self.done = true;
        None
    }
}
