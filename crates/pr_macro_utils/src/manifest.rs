use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// Umbrella crates that re-export the workspace members under a short name,
/// in lookup order.
const UMBRELLA_CRATES: [&str; 3] = ["packrat", "pr_core", "pr"];

/// Prefix shared by every workspace member.
const MEMBER_PREFIX: &str = "pr_";

/// The caller's `Cargo.toml`, used to emit paths that resolve from the
/// crate invoking a derive.
///
/// # Example
///
/// ```rust
/// # use pr_macro_utils::Manifest;
/// let path: syn::Path = Manifest::shared(|m| m.get_crate_path("pr_archive"));
/// ```
///
/// # Resolution rules
///
/// 1. `name` is a direct dependency: `::name`.
/// 2. `name` starts with `pr_` and an umbrella crate (`packrat`, `pr_core`,
///    `pr`, in that order) is a dependency: `::umbrella::suffix`, e.g.
///    `pr_archive` becomes `::pr_core::archive`.
/// 3. Steps 1-2 again against `dev-dependencies`.
/// 4. Otherwise `::name`.
///
/// A crate that names itself from its own doc tests should declare
/// `extern crate self as name;` so that rule 4 also holds inside it.
#[derive(Debug)]
pub struct Manifest {
    document: Document<Box<str>>,
    modified: SystemTime,
}

impl Manifest {
    #[inline(never)]
    fn locate() -> PathBuf {
        let dir = env::var_os("CARGO_MANIFEST_DIR")
            .expect("CARGO_MANIFEST_DIR should be set by cargo for proc-macros");
        let path = PathBuf::from(dir).join("Cargo.toml");
        assert!(path.exists(), "no Cargo.toml at {}", path.display());
        path
    }

    #[inline(never)]
    fn modified(path: &Path) -> Result<SystemTime, std::io::Error> {
        std::fs::metadata(path)?.modified()
    }

    #[inline(never)]
    fn parse(path: &Path) -> Document<Box<str>> {
        let text = std::fs::read_to_string(path)
            .unwrap_or_else(|_| panic!("cannot read {}", path.display()))
            .into_boxed_str();
        Document::parse(text).unwrap_or_else(|_| panic!("cannot parse {}", path.display()))
    }

    fn path(text: &str) -> syn::Path {
        syn::parse_str(text).unwrap_or_else(|_| panic!("`{text}` is not a path"))
    }

    fn lookup(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(Self::path(&format!("::{name}")));
        }
        let suffix = name.strip_prefix(MEMBER_PREFIX)?;
        UMBRELLA_CRATES
            .iter()
            .find(|umbrella| deps.contains_key(umbrella))
            .map(|umbrella| Self::path(&format!("::{umbrella}::{suffix}")))
    }

    /// Path of crate `name` as seen from the caller. See the type docs for the rules.
    #[inline(never)]
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        ["dependencies", "dev-dependencies"]
            .into_iter()
            .filter_map(|section| match self.document.get(section) {
                Some(Item::Table(deps)) => Self::lookup(deps, name),
                _ => None,
            })
            .next()
            .unwrap_or_else(|| Self::path(&format!("::{name}")))
    }

    /// Run `func` against the caller's manifest.
    ///
    /// Parsed manifests are cached per path and re-read when the file's
    /// modification time changes. Call this once per macro invocation.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static CACHE: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let path = Self::locate();
        let modified = Self::modified(&path).expect("Cargo.toml should have a modification time");

        {
            let cache = CACHE.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(manifest) = cache.get(&path)
                && manifest.modified == modified
            {
                return func(manifest);
            }
        }

        let manifest = Manifest {
            document: Self::parse(&path),
            modified,
        };
        let result = func(&manifest);

        CACHE
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);

        result
    }
}
