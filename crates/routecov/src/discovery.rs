//! Project file discovery
//!
//! Finds the files that may declare routes and decides, through include and
//! exclude patterns, which of them take part in a coverage run.

use crate::result::{RouteCoverageError, RouteCoverageResult};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension of route builder sources
pub const SOURCE_EXTENSION: &str = "rs";

/// Extension of route markup files
pub const MARKUP_EXTENSION: &str = "xml";

/// Where a project keeps its route declarations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectLayout {
    /// Project base directory
    pub base_dir: PathBuf,
    /// Main source roots
    pub source_roots: Vec<PathBuf>,
    /// Main resource directories
    pub resource_dirs: Vec<PathBuf>,
    /// Test source roots
    pub test_source_roots: Vec<PathBuf>,
    /// Test resource directories
    pub test_resource_dirs: Vec<PathBuf>,
}

impl ProjectLayout {
    /// `src`, `resources`, `tests` and `tests/resources` below `base_dir`
    #[must_use]
    pub fn conventional(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            source_roots: vec![base_dir.join("src")],
            resource_dirs: vec![base_dir.join("resources")],
            test_source_roots: vec![base_dir.join("tests")],
            test_resource_dirs: vec![base_dir.join("tests").join("resources")],
            base_dir,
        }
    }

    /// Replace the main source roots, resolved against the base directory
    #[must_use]
    pub fn with_source_roots(mut self, roots: &[PathBuf]) -> Self {
        if !roots.is_empty() {
            self.source_roots = roots.iter().map(|r| self.base_dir.join(r)).collect();
        }
        self
    }

    /// Replace the main resource directories, resolved against the base directory
    #[must_use]
    pub fn with_resource_dirs(mut self, dirs: &[PathBuf]) -> Self {
        if !dirs.is_empty() {
            self.resource_dirs = dirs.iter().map(|d| self.base_dir.join(d)).collect();
        }
        self
    }

    /// Roots searched for files with `extension`
    #[must_use]
    pub fn roots_for(&self, extension: &str, include_test: bool) -> Vec<&Path> {
        let (main, test) = if extension == MARKUP_EXTENSION {
            (&self.resource_dirs, &self.test_resource_dirs)
        } else {
            (&self.source_roots, &self.test_source_roots)
        };
        let mut roots: Vec<&Path> = main.iter().map(PathBuf::as_path).collect();
        if include_test {
            roots.extend(test.iter().map(PathBuf::as_path));
        }
        roots
    }
}

/// A discovered file together with the root it was found under
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiscoveredFile {
    /// Full path
    pub path: PathBuf,
    /// Root the file was found under
    pub root: PathBuf,
}

impl DiscoveredFile {
    /// Path below the owning root, with `/` separators
    #[must_use]
    pub fn relative_name(&self) -> String {
        self.path
            .strip_prefix(&self.root)
            .unwrap_or(&self.path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Bare file name
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Find every file with `extension` below the layout's roots.
///
/// Hidden entries and `target` directories are skipped. The result is sorted
/// and free of duplicates even when roots overlap.
pub fn discover_files(
    layout: &ProjectLayout,
    include_test: bool,
    extension: &str,
) -> RouteCoverageResult<Vec<DiscoveredFile>> {
    let mut seen = BTreeSet::new();
    let mut files = Vec::new();
    for root in layout.roots_for(extension, include_test) {
        if !root.is_dir() {
            debug!(root = %root.display(), "root does not exist, skipping");
            continue;
        }
        let mut found = Vec::new();
        collect_files(root, extension, &mut found)?;
        found.sort();
        for path in found {
            if seen.insert(path.clone()) {
                files.push(DiscoveredFile {
                    path,
                    root: root.to_path_buf(),
                });
            }
        }
    }
    Ok(files)
}

fn collect_files(dir: &Path, extension: &str, found: &mut Vec<PathBuf>) -> RouteCoverageResult<()> {
    for entry in std::fs::read_dir(dir)?.filter_map(Result::ok) {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            if name == "target" {
                continue;
            }
            collect_files(&path, extension, found)?;
        } else if path.extension().is_some_and(|ext| ext == extension) {
            found.push(path);
        }
    }
    Ok(())
}

/// One include or exclude pattern
#[derive(Debug, Clone)]
struct NamePattern {
    raw: String,
    glob: Option<Pattern>,
    regex: Option<Regex>,
}

impl NamePattern {
    fn parse(raw: &str) -> RouteCoverageResult<Self> {
        let glob = Pattern::new(raw).ok();
        let regex = Regex::new(&format!("^(?:{raw})$")).ok();
        if glob.is_none() && regex.is_none() {
            return Err(RouteCoverageError::Pattern {
                pattern: raw.to_string(),
                message: "neither a valid glob nor a valid regular expression".to_string(),
            });
        }
        Ok(Self {
            raw: raw.to_string(),
            glob,
            regex,
        })
    }

    fn matches(&self, name: &str) -> bool {
        self.raw == name
            || self.glob.as_ref().is_some_and(|g| g.matches(name))
            || self.regex.as_ref().is_some_and(|r| r.is_match(name))
    }
}

/// Include/exclude filter over discovered files
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    includes: Vec<NamePattern>,
    excludes: Vec<NamePattern>,
}

impl FileFilter {
    /// Build a filter from comma-separated pattern lists
    pub fn new(includes: Option<&str>, excludes: Option<&str>) -> RouteCoverageResult<Self> {
        Ok(Self {
            includes: split_patterns(includes)?,
            excludes: split_patterns(excludes)?,
        })
    }

    /// Whether `file` takes part in the run. Excludes win over includes.
    #[must_use]
    pub fn accepts(&self, file: &DiscoveredFile) -> bool {
        let relative = file.relative_name();
        let bare = file.file_name();
        let any = |patterns: &[NamePattern]| {
            patterns
                .iter()
                .any(|p| p.matches(&relative) || p.matches(&bare))
        };

        if any(&self.excludes) {
            debug!(file = %relative, "excluded");
            return false;
        }
        self.includes.is_empty() || any(&self.includes)
    }
}

fn split_patterns(list: Option<&str>) -> RouteCoverageResult<Vec<NamePattern>> {
    list.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(NamePattern::parse)
        .collect()
}
