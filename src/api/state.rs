use crate::library::Library;

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub library: Library,
}

impl AppState {
    #[must_use]
    pub fn new(library: Library) -> Self {
        Self { library }
    }
}
