use std::path::Path;

use crate::error::GatewayError;
use crate::exchange::GatewayResponse;

const GENERATION_PREFIX: &str = "cache:";

/// Named cache generations, one sled tree each, surviving restarts.
#[derive(Clone)]
pub struct CacheStorage {
    db: sled::Db,
}

/// One generation: cache key -> bincode-encoded response.
#[derive(Clone)]
pub struct Cache {
    name: String,
    tree: sled::Tree,
}

fn tree_name(generation: &str) -> String {
    format!("{GENERATION_PREFIX}{generation}")
}

impl CacheStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GatewayError> {
        Ok(Self { db: sled::open(path)? })
    }

    pub fn temporary() -> Result<Self, GatewayError> {
        Ok(Self { db: sled::Config::new().temporary(true).open()? })
    }

    /// Open a generation, creating it when absent.
    pub fn open_cache(&self, generation: &str) -> Result<Cache, GatewayError> {
        let tree = self.db.open_tree(tree_name(generation))?;
        Ok(Cache { name: generation.to_string(), tree })
    }

    /// Names of every generation present.
    pub fn keys(&self) -> Vec<String> {
        self.db
            .tree_names()
            .into_iter()
            .filter_map(|raw| {
                let name = String::from_utf8_lossy(&raw).into_owned();
                name.strip_prefix(GENERATION_PREFIX).map(str::to_string)
            })
            .collect()
    }

    pub fn has(&self, generation: &str) -> bool {
        self.keys().iter().any(|k| k == generation)
    }

    /// Drop a generation and all of its entries. False when it did not exist.
    pub fn delete(&self, generation: &str) -> Result<bool, GatewayError> {
        Ok(self.db.drop_tree(tree_name(generation))?)
    }
}

impl Cache {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lookup(&self, key: &str) -> Result<Option<GatewayResponse>, GatewayError> {
        match self.tree.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn put(&self, key: &str, response: &GatewayResponse) -> Result<(), GatewayError> {
        let bytes = bincode::serialize(response)?;
        self.tree.insert(key.as_bytes(), bytes)?;
        Ok(())
    }

    /// Store several entries in one atomic batch.
    pub fn put_all<'a, I>(&self, entries: I) -> Result<usize, GatewayError>
    where
        I: IntoIterator<Item = (&'a str, &'a GatewayResponse)>,
    {
        let mut batch = sled::Batch::default();
        let mut count = 0;
        for (key, response) in entries {
            batch.insert(key.as_bytes(), bincode::serialize(response)?);
            count += 1;
        }
        self.tree.apply_batch(batch)?;
        Ok(count)
    }

    pub fn keys(&self) -> Result<Vec<String>, GatewayError> {
        self.tree
            .iter()
            .keys()
            .map(|key| -> Result<String, GatewayError> { Ok(String::from_utf8_lossy(&key?).into_owned()) })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}
