//! Light/dark preference: persistence and the style flag the renderer reads.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Theme {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow!("Unknown theme '{value}'. Expected 'light' or 'dark'.")),
        }
    }
}

/// Document-level styling flag. The renderer switches palettes on `dark`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStyle {
    pub dark: bool,
}

impl DocumentStyle {
    pub fn apply(&mut self, theme: Theme) {
        self.dark = theme == Theme::Dark;
    }
}

/// Where the single persisted theme value lives.
pub trait ThemeStorage: Send + Sync + fmt::Debug {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Theme>>;
    fn save(&self, theme: Theme) -> Result<()>;
}

/// Theme stored as the bare string `light` or `dark` in one file.
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ThemeStorage for FileThemeStore {
    fn load(&self) -> Result<Option<Theme>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read theme file: {}", self.path.display()))?;

        Theme::try_from(contents.as_str()).map(Some)
    }

    fn save(&self, theme: Theme) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create theme directory: {}", parent.display())
            })?;
        }

        fs::write(&self.path, theme.as_str())
            .with_context(|| format!("Failed to write theme file: {}", self.path.display()))
    }
}

/// In-process store for tests that exercise persistence without touching disk.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryThemeStore {
    value: std::sync::Mutex<Option<Theme>>,
}

#[cfg(test)]
impl MemoryThemeStore {
    pub(crate) fn new(initial: Option<Theme>) -> Self {
        Self {
            value: std::sync::Mutex::new(initial),
        }
    }
}

#[cfg(test)]
impl ThemeStorage for MemoryThemeStore {
    fn load(&self) -> Result<Option<Theme>> {
        let guard = self
            .value
            .lock()
            .map_err(|_| anyhow!("theme store poisoned"))?;
        Ok(*guard)
    }

    fn save(&self, theme: Theme) -> Result<()> {
        let mut guard = self
            .value
            .lock()
            .map_err(|_| anyhow!("theme store poisoned"))?;
        *guard = Some(theme);
        Ok(())
    }
}
