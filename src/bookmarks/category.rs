/// Opaque handle of a bookmark category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(usize);

/// Application-owned list of bookmark categories
///
/// Categories are registered explicitly by whoever owns the view; the
/// bookmark code itself knows nothing about them.
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    names: Vec<String>,
}

impl CategoryRegistry {
    pub const USER: &'static str = "user";
    pub const SEARCH: &'static str = "search";
    pub const QUERY: &'static str = "query";
    pub const META: &'static str = "meta";

    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the categories every view has
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for name in [Self::USER, Self::SEARCH, Self::QUERY, Self::META] {
            registry.register(name);
        }
        registry
    }

    /// Register `name`, returning the existing id if already known
    pub fn register(&mut self, name: &str) -> CategoryId {
        if let Some(id) = self.find(name) {
            return id;
        }
        self.names.push(name.to_string());
        CategoryId(self.names.len() - 1)
    }

    pub fn find(&self, name: &str) -> Option<CategoryId> {
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(CategoryId)
    }

    pub fn name(&self, id: CategoryId) -> Option<&str> {
        self.names.get(id.0).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = CategoryId> + '_ {
        (0..self.names.len()).map(CategoryId)
    }
}
