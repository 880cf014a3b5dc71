//! Package identity and the process-scoped build graph view (spec §3).

use crate::errors::{Error, Result};
use crate::ids::{ActionId, PackageId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

/// Everything the engine knows about one package for the duration of a
/// single hook invocation.
#[derive(Debug)]
pub struct PackageRecord {
    pub import_path: PackageId,
    pub object_file: PathBuf,
    pub action_id: ActionId,
    /// Lazily-resolved: `original name -> emitted name` for every
    /// package-scope declaration of the *obfuscated* version of this
    /// package. Absence of a key (once loaded) means the name was never a
    /// package-scope declaration to begin with; a value equal to the key
    /// means the rewriter chose not to rename it.
    loaded: RefCell<Option<HashMap<String, String>>>,
}

impl PackageRecord {
    pub fn new(import_path: PackageId, object_file: PathBuf, action_id: ActionId) -> Self {
        PackageRecord {
            import_path,
            object_file,
            action_id,
            loaded: RefCell::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.borrow().is_some()
    }

    /// Record the obfuscated view of this package (spec §4.4 "key material
    /// selection" / §9 "loaded_package").
    pub fn set_loaded(&self, names: HashMap<String, String>) {
        *self.loaded.borrow_mut() = Some(names);
    }

    /// The name this package now emits `original` under, if its view has
    /// been loaded and `original` was one of its package-scope
    /// declarations.
    pub fn emitted_name(&self, original: &str) -> Option<String> {
        self.loaded
            .borrow()
            .as_ref()
            .and_then(|names| names.get(original).cloned())
    }

    /// Ask whether `name`, as originally spelled in this package, still
    /// appears unrenamed in its obfuscated view. `None` means we have not
    /// loaded this package's view yet.
    pub fn still_exposes(&self, name: &str) -> Option<bool> {
        self.loaded
            .borrow()
            .as_ref()
            .map(|names| names.get(name).map(|v| v == name).unwrap_or(true))
    }
}

/// The per-compile build graph: every package known to this build, plus the
/// vendoring remap and the first-listed import (the main package at link
/// time).
#[derive(Debug, Default)]
pub struct BuildInfo {
    packages: HashMap<PackageId, PackageRecord>,
    /// `after -> before`: vendored rewrites. Both keys must resolve to the
    /// same record.
    import_map: HashMap<PackageId, PackageId>,
    pub first_import: Option<PackageId>,
}

impl BuildInfo {
    pub fn new() -> Self {
        BuildInfo::default()
    }

    pub fn insert(&mut self, record: PackageRecord) {
        if self.first_import.is_none() {
            self.first_import = Some(record.import_path.clone());
        }
        self.packages.insert(record.import_path.clone(), record);
    }

    pub fn alias(&mut self, after: PackageId, before: PackageId) {
        self.import_map.insert(after, before);
    }

    fn resolve<'a>(&self, id: &'a PackageId) -> &'a PackageId {
        // import_map never chains more than one level in practice (spec §3),
        // but guard against a cycle defensively rather than looping forever.
        let mut current = id;
        for _ in 0..8 {
            match self.import_map.get(current) {
                Some(before) => current = before,
                None => return current,
            }
        }
        current
    }

    pub fn get(&self, id: &PackageId) -> Option<&PackageRecord> {
        self.packages.get(self.resolve(id))
    }

    pub fn get_or_corruption(&self, id: &PackageId) -> Result<&PackageRecord> {
        self.get(id).ok_or_else(|| {
            Error::internal(format!("package {} missing from import config", id))
        })
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageRecord> {
        self.packages.values()
    }
}
