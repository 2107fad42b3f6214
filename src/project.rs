//! Project loading
//!
//! A [`Project`] is a directory of C# sources parsed into one [`ElementTree`].
//! Files are found recursively, visited in file-name order and parsed one after
//! another into the same root, each starting from the same seeded symbol set.

use crate::error::{DocError, Result};
use crate::parser::{DefinedSymbols, ElementTree, Parser};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub struct Project {
    directory: PathBuf,
    source_extension: String,
    defines: String,
    tree: ElementTree,
    files: Vec<PathBuf>,
    errors: Vec<DocError>,
}

impl Project {
    /// Parse every `*.<source_extension>` file below `directory`.
    ///
    /// Files that cannot be read or parsed are recorded in [`Project::errors`];
    /// whatever they contributed before failing stays in the tree.
    pub fn load(directory: impl AsRef<Path>, source_extension: &str, defines: &str) -> Result<Self> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(DocError::MissingDirectory(directory.to_path_buf()));
        }

        let mut project = Project {
            directory: directory.to_path_buf(),
            source_extension: source_extension.trim_start_matches('.').to_string(),
            defines: defines.to_string(),
            tree: ElementTree::new(root_label(directory)),
            files: Vec::new(),
            errors: Vec::new(),
        };
        project.parse_all()?;
        Ok(project)
    }

    /// Parse the same directory again with different constants
    pub fn reload(&mut self, defines: &str) -> Result<()> {
        self.defines = defines.to_string();
        self.tree = ElementTree::new(root_label(&self.directory));
        self.files.clear();
        self.errors.clear();
        self.parse_all()
    }

    fn parse_all(&mut self) -> Result<()> {
        info!("Loading {}", self.directory.display());
        let seed = DefinedSymbols::parse(&self.defines);
        let root = self.tree.root();

        for path in source_files(&self.directory, &self.source_extension)? {
            let source = match std::fs::read_to_string(&path) {
                Ok(source) => source,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    self.errors.push(DocError::io("read", &path, e));
                    continue;
                }
            };

            let before = self.tree.len();
            // Editors commonly save a byte-order mark ahead of the first line
            let source = source.strip_prefix('\u{feff}').unwrap_or(&source);
            let mut parser = Parser::new(source, seed.clone());
            if let Err(e) = parser.parse_into(&mut self.tree, root) {
                warn!("{}: {}", path.display(), e);
                self.errors.push(DocError::Parse {
                    path: path.clone(),
                    source: e,
                });
            }
            debug!(
                file = %path.display(),
                nodes = self.tree.len() - before,
                "parsed"
            );
            self.files.push(path);
        }

        info!(
            "Loaded {} files, {} elements, {} errors",
            self.files.len(),
            self.tree.len() - 1,
            self.errors.len()
        );
        Ok(())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The `;`-separated constants the tree was parsed with
    pub fn defines(&self) -> &str {
        &self.defines
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    /// Parsed files in visiting order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn errors(&self) -> &[DocError] {
        &self.errors
    }

    pub fn status_line(&self) -> String {
        format!("Code loaded with: {}", self.defines)
    }
}

/// Last path component of `directory`, resolving `.` and friends first
pub fn root_label(directory: &Path) -> String {
    let resolved = directory
        .canonicalize()
        .unwrap_or_else(|_| directory.to_path_buf());
    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| resolved.display().to_string())
}

/// Files below `directory` with the given extension, sorted by file name per directory
pub fn source_files(directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(directory).sort_by_file_name() {
        let entry = entry.map_err(|source| DocError::Walk {
            path: directory.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}
