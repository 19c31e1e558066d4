use sled::transaction::{TransactionalTree, UnabortableTransactionError};
use std::collections::HashSet;

use crate::error::StoreError;
use crate::tokenizer::{recipe_terms, terms};
use crate::{Recipe, RecipeId};

const SEP: u8 = 0;

/// Keyword index over title and ingredients. Keys are `term \0 id` with
/// empty values, so every term's postings sit under one prefix.
#[derive(Clone)]
pub struct TextIndex {
    tree: sled::Tree,
}

fn posting_key(term: &str, id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(term.len() + 1 + id.len());
    key.extend_from_slice(term.as_bytes());
    key.push(SEP);
    key.extend_from_slice(id.as_bytes());
    key
}

fn term_prefix(term: &str) -> Vec<u8> {
    let mut prefix = term.as_bytes().to_vec();
    prefix.push(SEP);
    prefix
}

impl TextIndex {
    pub(crate) fn new(tree: sled::Tree) -> Self {
        Self { tree }
    }

    pub(crate) fn tree(&self) -> &sled::Tree {
        &self.tree
    }

    /// Index keys a recipe contributes.
    pub(crate) fn keys_for(recipe: &Recipe) -> Vec<Vec<u8>> {
        recipe_terms(&recipe.title, &recipe.ingredients)
            .iter()
            .map(|term| posting_key(term, &recipe.id))
            .collect()
    }

    pub(crate) fn apply(
        tx: &TransactionalTree,
        removed: &[Vec<u8>],
        added: &[Vec<u8>],
    ) -> Result<(), UnabortableTransactionError> {
        for key in removed {
            tx.remove(key.as_slice())?;
        }
        for key in added {
            tx.insert(key.as_slice(), &[] as &[u8])?;
        }
        Ok(())
    }

    /// Ids of every recipe containing `term` (already normalized).
    pub fn postings(&self, term: &str) -> Result<HashSet<RecipeId>, StoreError> {
        let prefix = term_prefix(term);
        let mut ids = HashSet::new();
        for entry in self.tree.scan_prefix(&prefix) {
            let (key, _) = entry?;
            let id = String::from_utf8_lossy(&key[prefix.len()..]).into_owned();
            ids.insert(id);
        }
        Ok(ids)
    }

    /// Ids matching every term of `query`. A query without indexable terms
    /// matches nothing.
    pub fn matching(&self, query: &str) -> Result<HashSet<RecipeId>, StoreError> {
        let mut result: Option<HashSet<RecipeId>> = None;
        for term in terms(query) {
            let ids = self.postings(&term)?;
            let narrowed = match result {
                Some(acc) => acc.intersection(&ids).cloned().collect(),
                None => ids,
            };
            if narrowed.is_empty() {
                return Ok(narrowed);
            }
            result = Some(narrowed);
        }
        Ok(result.unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}
