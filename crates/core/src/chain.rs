//! Ordered application of several IPS patches to one image.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PatchError, Result};
use crate::ips::IpsPatch;
use crate::variant::{PatchSpec, Variant};

/// Where patch file bytes come from.
pub trait PatchSource {
    /// Load the raw bytes of `spec.file_name` for `variant`.
    fn load(&self, variant: Variant, spec: &PatchSpec) -> Result<Vec<u8>>;

    /// Short description for logs and error messages.
    fn describe(&self) -> String;
}

/// Patch files on disk.
///
/// `<root>/<slug>/<file>` is preferred over `<root>/<file>` so one patch
/// directory can hold per-game files with the same name.
#[derive(Debug, Clone)]
pub struct DirPatchSource {
    root: PathBuf,
}

impl DirPatchSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    /// Path the given patch resolves to (the per-game path if neither exists).
    pub fn resolve(&self, variant: Variant, spec: &PatchSpec) -> PathBuf {
        let per_game = self.root.join(variant.slug()).join(spec.file_name);
        if per_game.is_file() {
            return per_game;
        }
        let shared = self.root.join(spec.file_name);
        if shared.is_file() {
            shared
        } else {
            per_game
        }
    }
}

impl PatchSource for DirPatchSource {
    fn load(&self, variant: Variant, spec: &PatchSpec) -> Result<Vec<u8>> {
        let path = self.resolve(variant, spec);
        fs::read(&path).map_err(|e| PatchError::io(path, e))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Patch files held in memory, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct MemoryPatchSource {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryPatchSource {
    pub fn new() -> Self {
        Self { files: HashMap::new() }
    }

    pub fn insert(&mut self, file_name: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.files.insert(file_name.into(), bytes);
        self
    }
}

impl PatchSource for MemoryPatchSource {
    fn load(&self, _variant: Variant, spec: &PatchSpec) -> Result<Vec<u8>> {
        self.files.get(spec.file_name).cloned().ok_or_else(|| {
            PatchError::io(
                spec.file_name,
                std::io::Error::new(std::io::ErrorKind::NotFound, "patch not loaded"),
            )
        })
    }

    fn describe(&self) -> String {
        format!("in-memory ({} file(s))", self.files.len())
    }
}

/// Parsed patches in the order they will be applied.
#[derive(Debug, Clone)]
pub struct PatchChain {
    patches: Vec<IpsPatch>,
}

impl PatchChain {
    /// Resolve patch ids for `variant`, loading and parsing each one.
    ///
    /// Fails on the first unknown, ineligible, unreadable, or malformed patch.
    pub fn resolve<S: AsRef<str>>(
        variant: Variant,
        ids: &[S],
        source: &dyn PatchSource,
    ) -> Result<Self> {
        let mut patches = Vec::with_capacity(ids.len());
        for id in ids {
            let spec = variant.patch(id.as_ref())?;
            let bytes = source.load(variant, spec)?;
            patches.push(IpsPatch::parse(spec.file_name, &bytes)?);
        }
        Ok(Self { patches })
    }

    pub fn names(&self) -> Vec<String> {
        self.patches.iter().map(|p| p.name().to_string()).collect()
    }

    /// Apply the chain to a copy of `image`. See [`apply_chain`].
    pub fn apply(&self, image: &[u8]) -> Result<Vec<u8>> {
        apply_chain(image, &self.patches)
    }
}

/// Apply `patches` in order to a copy of `image` and return the copy.
///
/// Each patch sees the output of the previous one. The input is never
/// modified; on error the partially patched copy is dropped.
pub fn apply_chain(image: &[u8], patches: &[IpsPatch]) -> Result<Vec<u8>> {
    let mut working = image.to_vec();
    for patch in patches {
        patch.apply_to(&mut working)?;
    }
    Ok(working)
}
