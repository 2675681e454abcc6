//! File-backed JSON recipe storage.
//!
//! The whole collection lives in one pretty-printed JSON file. Saves go through
//! a temporary file and a rename, and the previous file is kept as a backup
//! that is used to recover from a corrupted main file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::types::{Recipe, RecipeId};

/// Everything persisted in the recipe file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeFile {
    /// Next id to hand out. Persisted so deleted ids are never reused.
    pub next_id: RecipeId,
    pub recipes: Vec<Recipe>,
}

impl Default for RecipeFile {
    fn default() -> Self {
        Self {
            next_id: 1,
            recipes: Vec::new(),
        }
    }
}

/// On-disk layouts accepted when loading.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFile {
    Wrapped {
        #[serde(default)]
        next_id: Option<RecipeId>,
        recipes: Vec<serde_json::Value>,
    },
    Bare(Vec<serde_json::Value>),
}

/// JSON file store for the recipe collection.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Create a store backed by the given file. Nothing is touched until load/save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the default recipe file: ~/.recipebox/recipes.json
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".recipebox").join("recipes.json"))
            .unwrap_or_else(|| PathBuf::from("recipes.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, "backup")
    }

    fn temp_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, "tmp")
    }

    /// Load the collection.
    ///
    /// A missing file is an empty collection. Individually malformed recipes
    /// are skipped. If the file is not valid JSON, the backup is restored and
    /// used instead; without a usable backup this fails with
    /// [`StoreError::Corrupt`].
    pub fn load(&self) -> Result<RecipeFile, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "recipe file not found, starting empty");
            return Ok(RecipeFile::default());
        }

        let content = read_file(&self.path)?;
        match serde_json::from_str::<StoredFile>(&content) {
            Ok(stored) => Ok(self.build_recipe_file(stored)),
            Err(error) => self.restore_from_backup(error),
        }
    }

    fn restore_from_backup(&self, error: serde_json::Error) -> Result<RecipeFile, StoreError> {
        let backup = self.backup_path();
        let corrupt = |source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        };

        if !backup.exists() {
            return Err(corrupt(error));
        }

        tracing::warn!(
            path = %self.path.display(),
            backup = %backup.display(),
            %error,
            "recipe file is corrupted, restoring from backup"
        );

        let content = read_file(&backup)?;
        let stored = serde_json::from_str::<StoredFile>(&content).map_err(|_| corrupt(error))?;

        fs::copy(&backup, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        Ok(self.build_recipe_file(stored))
    }

    fn build_recipe_file(&self, stored: StoredFile) -> RecipeFile {
        let (next_id, values) = match stored {
            StoredFile::Wrapped { next_id, recipes } => (next_id, recipes),
            StoredFile::Bare(recipes) => (None, recipes),
        };

        let mut recipes = Vec::with_capacity(values.len());
        for (idx, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<Recipe>(value) {
                Ok(recipe) if recipe.id == 0 || recipe.id == RecipeId::MAX => tracing::warn!(
                    path = %self.path.display(),
                    index = idx,
                    id = recipe.id,
                    "skipping recipe with out-of-range id"
                ),
                Ok(recipe) => recipes.push(recipe),
                Err(error) => tracing::warn!(
                    path = %self.path.display(),
                    index = idx,
                    %error,
                    "skipping invalid recipe entry"
                ),
            }
        }

        // Stored ids are below RecipeId::MAX, so this never saturates.
        let after_max = recipes
            .iter()
            .map(|r| r.id)
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        let next_id = next_id.unwrap_or(after_max).max(after_max);

        tracing::debug!(
            path = %self.path.display(),
            recipes = recipes.len(),
            next_id,
            "loaded recipes"
        );

        RecipeFile { next_id, recipes }
    }

    /// Save the collection: back up the current file, write a temp file, rename.
    pub fn save(&self, file: &RecipeFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        if self.path.exists() {
            let backup = self.backup_path();
            if let Err(error) = fs::copy(&self.path, &backup) {
                tracing::warn!(backup = %backup.display(), %error, "could not create backup");
            }
        }

        let json = serde_json::to_string_pretty(file)?;
        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|source| StoreError::Write {
            path: temp.clone(),
            source,
        })?;
        fs::rename(&temp, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            path = %self.path.display(),
            recipes = file.recipes.len(),
            "saved recipes"
        );

        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// "recipes.json" -> "recipes.json.<suffix>"
fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
