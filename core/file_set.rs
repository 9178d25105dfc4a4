use indexmap::IndexSet;

/// Insertion-ordered set of relative file paths.
///
/// Iteration yields paths in the order they were first inserted; inserting a
/// path that is already present keeps the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    paths: IndexSet<String>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the path was not already present.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        // Order-preserving, unlike IndexSet::swap_remove.
        self.paths.retain(|p| keep(p));
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.paths.iter().cloned().collect()
    }
}

impl Extend<String> for FileSet {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        self.paths.extend(iter);
    }
}

impl FromIterator<String> for FileSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for FileSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}
