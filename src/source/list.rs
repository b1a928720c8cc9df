use super::ReadString;

/// Hands out a fixed list of strings in order, then reports exhaustion forever.
#[derive(Debug, Clone, Default)]
pub struct ListReader {
    items: Vec<String>,
    pos: usize,
}

impl ListReader {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            pos: 0,
        }
    }

    /// Number of items not yet returned
    pub fn remaining(&self) -> usize {
        self.items.len() - self.pos
    }
}

impl ReadString for ListReader {
    fn read_string(&mut self) -> Option<String> {
        let item = self.items.get(self.pos)?.clone();
        self.pos += 1;
        Some(item)
    }
}
