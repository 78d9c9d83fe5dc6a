//! Profile header shown on the landing view: a few lines of text and an optional portrait.

use log::warn;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Default portrait file name, expected next to the application.
pub const DEFAULT_PORTRAIT: &str = "profile.jpg";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub name: String,
    pub headline: String,
    pub summary: Vec<String>,
    pub skills: Vec<String>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            name: "Your Name".into(),
            headline: "Data analyst".into(),
            summary: vec![
                "Transit punctuality and station services, explored with a small dashboard.".into(),
            ],
            skills: vec!["Rust".into(), "Data visualization".into(), "SQL".into()],
        }
    }
}

/// Decoded RGBA pixels of the portrait.
#[derive(Debug, Clone, PartialEq)]
pub struct PortraitImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Result of looking for the portrait; only `Loaded` carries pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Portrait {
    Loaded(PortraitImage),
    Missing { path: PathBuf },
    Unreadable { path: PathBuf, reason: String },
}

impl Portrait {
    /// Warning to show instead of the image, if any.
    pub fn warning(&self) -> Option<String> {
        match self {
            Portrait::Loaded(_) => None,
            Portrait::Missing { path } => Some(format!(
                "Portrait '{}' not found; place it next to the application.",
                path.display()
            )),
            Portrait::Unreadable { path, reason } => Some(format!(
                "Portrait '{}' could not be decoded: {reason}",
                path.display()
            )),
        }
    }
}

/// Load the portrait. Never fails: absence and decode errors degrade to a warning.
pub fn load_portrait<P: AsRef<Path>>(path: P) -> Portrait {
    let path = path.as_ref();
    match image::open(path) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            Portrait::Loaded(PortraitImage {
                width,
                height,
                rgba: rgba.into_raw(),
            })
        }
        Err(image::ImageError::IoError(e)) if e.kind() == io::ErrorKind::NotFound => {
            warn!("portrait {} not found", path.display());
            Portrait::Missing {
                path: path.to_path_buf(),
            }
        }
        Err(e) => {
            warn!("portrait {} unreadable: {e}", path.display());
            Portrait::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_portrait_is_a_warning() {
        let p = load_portrait("definitely/not/here/profile.jpg");
        assert!(matches!(p, Portrait::Missing { .. }));
        assert!(p.warning().unwrap().contains("not found"));
    }

    #[test]
    fn garbage_portrait_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.jpg");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(load_portrait(&path), Portrait::Unreadable { .. }));
    }
}
