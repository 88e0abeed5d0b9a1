//! RON layout loader

use crate::error::{Error, Result};
use crate::layout::LayoutDef;
use ember_core::RelayConfig;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Parse a standalone relay configuration, clamped to valid ranges
pub fn load_config_str(content: &str) -> Result<RelayConfig> {
    let config: RelayConfig = ron::from_str(content)?;
    Ok(config.normalized())
}

/// Loaded layouts by name, in load order
#[derive(Debug, Default)]
pub struct Layouts {
    layouts: IndexMap<String, LayoutDef>,
}

impl Layouts {
    pub fn get(&self, name: &str) -> Option<&LayoutDef> {
        self.layouts.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

/// Loader for RON layout files
///
/// A layout's name is its file stem: `chain.ron` loads as `"chain"`.
#[derive(Debug, Default)]
pub struct Loader {
    layouts: Layouts,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidLayout(format!("unnamed layout file {path:?}")))?
            .to_string();
        let content = fs::read_to_string(path)?;
        self.load_str(name, &content)
    }

    /// Load a layout from a RON string under the given name
    pub fn load_str(&mut self, name: impl Into<String>, content: &str) -> Result<()> {
        let name = name.into();
        if self.layouts.layouts.contains_key(&name) {
            return Err(Error::DuplicateLayout(name));
        }
        let layout = LayoutDef::from_ron(content)?;
        debug!(layout = %name, blocks = layout.blocks.len(), "loaded layout");
        self.layouts.layouts.insert(name, layout);
        Ok(())
    }

    /// Load all RON files from a directory
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for file_path in entries {
            if file_path.extension().is_some_and(|e| e == "ron") {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }

        Ok(())
    }

    /// Finish loading and return the layouts
    pub fn finish(self) -> Layouts {
        self.layouts
    }

    /// Get the current layouts (for inspection during loading)
    pub fn layouts(&self) -> &Layouts {
        &self.layouts
    }
}
