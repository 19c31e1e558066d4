use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;
use std::path::Path;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::StoreError;
use crate::index::TextIndex;
use crate::model::{Recipe, RecipeInput};
use crate::query::RecipeFilter;
use crate::RecipeId;

const RECIPES_TREE: &str = "recipes";
const INDEX_TREE: &str = "text_index";

/// Persistent recipe collection. Records are bincode-encoded under their id;
/// the keyword index is kept in step within the same transaction.
///
/// Concurrent writers to one id serialize through sled's transaction
/// conflict detection: the last commit wins, and its postings are the ones
/// left in the index.
#[derive(Clone)]
pub struct RecipeStore {
    db: sled::Db,
    recipes: sled::Tree,
    index: TextIndex,
}

impl RecipeStore {
    /// Open (or create) a store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opened recipe store");
        Self::from_db(db)
    }

    /// Store that lives only as long as this handle.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, StoreError> {
        let recipes = db.open_tree(RECIPES_TREE)?;
        let index = TextIndex::new(db.open_tree(INDEX_TREE)?);
        Ok(Self { db, recipes, index })
    }

    pub fn index(&self) -> &TextIndex {
        &self.index
    }

    pub fn count(&self) -> usize {
        self.recipes.len()
    }

    /// Recipes matching `filter`, newest first.
    pub fn find(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, StoreError> {
        if filter.is_unsatisfiable() {
            return Ok(Vec::new());
        }
        let keyword_hits = match filter.keyword_query() {
            Some(q) => Some(self.index.matching(q)?),
            None => None,
        };

        let mut found = Vec::new();
        for entry in self.recipes.iter() {
            let (_, bytes) = entry?;
            let recipe: Recipe = bincode::deserialize(&bytes)?;
            if let Some(hits) = &keyword_hits {
                if !hits.contains(&recipe.id) {
                    continue;
                }
            }
            if filter.matches(&recipe) {
                found.push(recipe);
            }
        }
        // ids grow monotonically, so they break timestamp ties by insertion order
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(found)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Recipe, StoreError> {
        match self.recipes.get(id.as_bytes())? {
            Some(bytes) => Ok(bincode::deserialize(&bytes)?),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    /// Validate, assign an id and timestamps, persist.
    pub fn insert(&self, input: RecipeInput) -> Result<Recipe, StoreError> {
        let fields = input.normalize()?;
        let id = self.next_id()?;
        let recipe = Recipe::create(id, fields, OffsetDateTime::now_utc());
        let bytes = bincode::serialize(&recipe)?;
        let added = TextIndex::keys_for(&recipe);
        (&self.recipes, self.index.tree())
            .transaction(|(recipes, index)| {
                recipes.insert(recipe.id.as_bytes(), bytes.as_slice())?;
                TextIndex::apply(index, &[], &added)?;
                Ok::<(), ConflictableTransactionError<StoreError>>(())
            })
            .map_err(unwrap_transaction)?;
        debug!(id = %recipe.id, category = %recipe.category, "inserted recipe");
        Ok(recipe)
    }

    /// Overwrite every mutable field of an existing recipe.
    pub fn replace(&self, id: &str, input: RecipeInput) -> Result<Recipe, StoreError> {
        let fields = input.normalize()?;
        let now = OffsetDateTime::now_utc();
        let updated = self
            .modify(id, |current| Some(current.replaced(fields.clone(), now)))?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        debug!(id, "replaced recipe");
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.modify(id, |_| None)?;
        debug!(id, "deleted recipe");
        Ok(())
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    fn next_id(&self) -> Result<RecipeId, StoreError> {
        Ok(format!("{:016x}", self.db.generate_id()?))
    }

    /// Read the current record, derive its successor (`None` deletes) and
    /// write record and index postings, all in one serializable transaction
    /// so the index always reflects the record that won.
    fn modify<F>(&self, id: &str, change: F) -> Result<Option<Recipe>, StoreError>
    where
        F: Fn(&Recipe) -> Option<Recipe>,
    {
        (&self.recipes, self.index.tree())
            .transaction(|(recipes, index)| {
                let current: Recipe = match recipes.get(id.as_bytes())? {
                    Some(bytes) => bincode::deserialize(&bytes).map_err(abort)?,
                    None => return Err(abort(StoreError::NotFound(id.to_string()))),
                };
                let next = change(&current);
                match &next {
                    Some(recipe) => {
                        let bytes = bincode::serialize(recipe).map_err(abort)?;
                        recipes.insert(id.as_bytes(), bytes)?;
                    }
                    None => {
                        recipes.remove(id.as_bytes())?;
                    }
                }
                let removed = TextIndex::keys_for(&current);
                let added = next.as_ref().map(TextIndex::keys_for).unwrap_or_default();
                TextIndex::apply(index, &removed, &added)?;
                Ok(next)
            })
            .map_err(unwrap_transaction)
    }
}

fn abort(err: impl Into<StoreError>) -> ConflictableTransactionError<StoreError> {
    ConflictableTransactionError::Abort(err.into())
}

fn unwrap_transaction(err: TransactionError<StoreError>) -> StoreError {
    match err {
        TransactionError::Abort(err) => err,
        TransactionError::Storage(err) => StoreError::Storage(err),
    }
}
