//! The gallery manifest (`pics/galerie.txt`).
//!
//! The viewer script fetches this file with a relative request and reads two
//! fields from it:
//!
//! ```json
//! {"title":"Summer 2024","images":["a.jpg","b.png"]}
//! ```
//!
//! ## Escaping
//!
//! Only the double quote is escaped (`"` → `\"`). Backslashes and control
//! characters are written verbatim, which is what deployed viewers read.
//! Titles and file names containing `\` or control characters therefore do
//! not round-trip through a strict JSON parser.

use crate::scan::PictureAsset;

/// File name of the manifest inside the pictures directory.
pub const MANIFEST_FILE_NAME: &str = "galerie.txt";

/// Gallery title plus the ordered picture names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub title: String,
    pub images: Vec<String>,
}

impl Manifest {
    /// Build the manifest for an ordered asset list.
    pub fn new(title: &str, assets: &[PictureAsset]) -> Self {
        Self {
            title: title.to_string(),
            images: assets.iter().map(|a| a.file_name.clone()).collect(),
        }
    }

    /// Render the wire format read by the viewer.
    pub fn to_wire(&self) -> String {
        let images = self
            .images
            .iter()
            .map(|name| format!("\"{}\"", escape_quotes(name)))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{{\"title\":\"{}\",\"images\":[{}]}}",
            escape_quotes(&self.title),
            images
        )
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_wire().into_bytes()
    }
}

fn escape_quotes(text: &str) -> String {
    text.replace('"', "\\\"")
}
