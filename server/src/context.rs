use recipe_core::{RecipeStore, StoreError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Lazily opened store. The first caller opens it, later callers reuse the
/// same handle; a failed open leaves the cell empty so the next call retries.
pub struct StoreHandle {
    path: PathBuf,
    store: OnceCell<RecipeStore>,
}

impl StoreHandle {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf(), store: OnceCell::new() }
    }

    /// Handle around an already open store.
    pub fn connected(store: RecipeStore) -> Self {
        Self { path: PathBuf::new(), store: OnceCell::from(store) }
    }

    pub async fn ensure_connected(&self) -> Result<&RecipeStore, StoreError> {
        self.store
            .get_or_try_init(|| async {
                let store = RecipeStore::open(&self.path)?;
                tracing::info!(path = %self.path.display(), recipes = store.count(), "connected to recipe store");
                Ok::<_, StoreError>(store)
            })
            .await
    }

    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }
}

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppContext {
    store: Arc<StoreHandle>,
}

impl AppContext {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self { store: Arc::new(StoreHandle::new(db_path)) }
    }

    pub fn with_store(store: RecipeStore) -> Self {
        Self { store: Arc::new(StoreHandle::connected(store)) }
    }

    pub fn store_handle(&self) -> &StoreHandle {
        &self.store
    }

    pub async fn store(&self) -> Result<&RecipeStore, StoreError> {
        self.store.ensure_connected().await
    }
}
