//! The static viewer bundle.
//!
//! Every publish starts by writing four fixed files that make up the
//! in-browser viewer:
//!
//! ```text
//! target/
//! ├── index.html                 # Landing page
//! ├── content/galerie.css        # Style sheet
//! └── scripts/
//!     ├── galerie-lib.js         # DOM helpers used by the viewer
//!     └── galerie.js             # Viewer: reads pics/galerie.txt
//! ```
//!
//! The scripts and the style sheet are embedded at compile time from
//! `static/`. The landing page is rendered with [maud](https://maud.lambda.xyz/).
//! It does not contain the gallery title: the viewer reads the title from
//! the manifest, so a title change only touches `pics/galerie.txt` and the
//! rest of the bundle stays byte-identical between runs.
//!
//! An `assets_dir` override replaces individual files by name, for sites
//! that ship their own viewer build.

use crate::delta::TreeDir;
use maud::{DOCTYPE, Markup, html};
use std::borrow::Cow;
use std::path::Path;

const SCRIPT: &[u8] = include_bytes!("../static/galerie.js");
const LIBRARY: &[u8] = include_bytes!("../static/galerie-lib.js");
const STYLE: &[u8] = include_bytes!("../static/galerie.css");

pub const LANDING_PAGE_NAME: &str = "index.html";
pub const SCRIPT_NAME: &str = "galerie.js";
pub const LIBRARY_NAME: &str = "galerie-lib.js";
pub const STYLE_NAME: &str = "galerie.css";

/// One file of the static bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFile {
    pub dir: TreeDir,
    pub name: &'static str,
    pub contents: Cow<'static, [u8]>,
}

/// The complete bundle, in publishing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticBundle {
    pub files: Vec<StaticFile>,
}

impl StaticBundle {
    /// The bundle compiled into the binary.
    pub fn embedded() -> Self {
        let landing_page = render_landing_page().into_string().into_bytes();
        Self {
            files: vec![
                StaticFile {
                    dir: TreeDir::Scripts,
                    name: LIBRARY_NAME,
                    contents: Cow::Borrowed(LIBRARY),
                },
                StaticFile {
                    dir: TreeDir::Scripts,
                    name: SCRIPT_NAME,
                    contents: Cow::Borrowed(SCRIPT),
                },
                StaticFile {
                    dir: TreeDir::Content,
                    name: STYLE_NAME,
                    contents: Cow::Borrowed(STYLE),
                },
                StaticFile {
                    dir: TreeDir::Root,
                    name: LANDING_PAGE_NAME,
                    contents: Cow::Owned(landing_page),
                },
            ],
        }
    }

    /// The embedded bundle with any same-named file from `dir` swapped in.
    pub fn with_overrides(dir: &Path) -> std::io::Result<Self> {
        let mut bundle = Self::embedded();
        for file in &mut bundle.files {
            let candidate = dir.join(file.name);
            if candidate.is_file() {
                file.contents = Cow::Owned(std::fs::read(&candidate)?);
            }
        }
        Ok(bundle)
    }

    /// Embedded bundle, or the overridden one when a directory is given.
    pub fn load(overrides: Option<&Path>) -> std::io::Result<Self> {
        match overrides {
            Some(dir) => Self::with_overrides(dir),
            None => Ok(Self::embedded()),
        }
    }
}

/// The landing page: an empty gallery container the viewer fills in.
fn render_landing_page() -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Galerie" }
                link rel="stylesheet" href={ "content/" (STYLE_NAME) };
                script src={ "scripts/" (LIBRARY_NAME) } {}
                script src={ "scripts/" (SCRIPT_NAME) } {}
            }
            body.thumbnailView {
                h1.galerieTitle {}
                div.galerie data-directory="pics" {}
            }
        }
    }
}
