//! Where external tools live on this machine.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const FXCOP: &str = "fxcop";
pub const FXCOP_PATH_ENV: &str = "FXCOP_PATH";

const FXCOP_INSTALL_DIRS: [&str; 3] = [
    "Microsoft FxCop 1.36",
    "Microsoft FxCop 1.35",
    "Microsoft FxCop 1.32",
];

type Discover = Box<dyn Fn() -> Option<PathBuf>>;

/// Maps a tool name to a function that finds its install directory.
#[derive(Default)]
pub struct ToolLocator {
    discoverers: HashMap<String, Discover>,
}

impl ToolLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator with the built-in FxCop discovery registered.
    pub fn with_defaults() -> Self {
        let mut locator = Self::new();
        locator.register(FXCOP, discover_fxcop);
        locator
    }

    pub fn register(&mut self, tool: &str, discover: impl Fn() -> Option<PathBuf> + 'static) {
        self.discoverers.insert(tool.to_string(), Box::new(discover));
    }

    /// Install directory of `tool`, if any registered discoverer finds it.
    pub fn locate(&self, tool: &str) -> Option<PathBuf> {
        let found = self.discoverers.get(tool).and_then(|discover| discover());
        match &found {
            Some(dir) => tracing::debug!(tool, dir = %dir.display(), "tool located"),
            None => tracing::debug!(tool, "tool not found"),
        }
        found
    }
}

impl std::fmt::Debug for ToolLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tools: Vec<_> = self.discoverers.keys().collect();
        tools.sort();
        f.debug_struct("ToolLocator").field("tools", &tools).finish()
    }
}

fn discover_fxcop() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(FXCOP_PATH_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    let program_files = ["ProgramFiles", "ProgramFiles(x86)"]
        .iter()
        .filter_map(std::env::var_os)
        .map(PathBuf::from);
    for base in program_files {
        if let Some(dir) = first_existing(&base) {
            return Some(dir);
        }
    }
    which::which("FxCopCmd")
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

fn first_existing(base: &Path) -> Option<PathBuf> {
    FXCOP_INSTALL_DIRS
        .iter()
        .map(|name| base.join(name))
        .find(|dir| dir.is_dir())
}
