//! # Galerie
//!
//! A publisher for flat, static photo galleries. Point it at a directory of
//! pictures and it writes a self-contained viewer site: the original pictures,
//! a thumbnail for each, a small manifest the in-browser viewer reads, and the
//! viewer itself.
//!
//! # The Publish Run
//!
//! ```text
//! source/                 target/
//! ├── a.jpg               ├── index.html
//! ├── B.png       ──▶     ├── content/galerie.css
//! └── notes.txt           ├── scripts/{galerie-lib.js, galerie.js}
//!                         └── pics/
//!                             ├── galerie.txt        {"title":..,"images":["a.jpg","B.png"]}
//!                             ├── a.jpg   tn_a.jpg
//!                             └── B.png   tn_B.png
//! ```
//!
//! Only JPEG, BMP, GIF and PNG files (by extension, any case) are published.
//! Order is case-insensitive by file name. Thumbnails fit a 200 pixel box,
//! keep the aspect ratio, and stay in the source format.
//!
//! # Delta Publishing
//!
//! Given the root of a previously published tree (the *reference*) and a
//! *delta* root, every file whose bytes differ from its reference counterpart
//! is also copied into the delta tree, under the same relative path. Upload the
//! delta tree and the live site catches up with the minimum transfer. Files
//! that turn out identical have any stale delta copy removed. See [`delta`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `galerie.toml` loading, CLI overlay, validation into a [`config::RunConfig`] |
//! | [`scan`] | Lists the pictures of the source directory in publishing order |
//! | [`manifest`] | The `galerie.txt` document the viewer reads |
//! | [`delta`] | Writes to the target tree and stages changed files into the delta tree |
//! | [`imaging`] | Thumbnail math and the `image`-crate backend |
//! | [`assets`] | The static viewer bundle (landing page rendered with Maud) |
//! | [`publish`] | The run itself: pipeline, worker thread, progress events |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Full Rewrite, Delta by Comparison
//!
//! The target tree is rewritten in full on every run and nothing is cached.
//! The delta tree is derived by comparing bytes against the reference tree, so
//! a crashed or partial run heals itself the next time round. There is no
//! state file to get out of sync.
//!
//! ## Deterministic Output
//!
//! Thumbnails, the manifest and the bundle are pure functions of their inputs.
//! Publishing an unchanged source twice produces byte-identical trees, which
//! is what keeps the delta tree empty when nothing changed.

pub mod assets;
pub mod config;
pub mod delta;
pub mod imaging;
pub mod manifest;
pub mod output;
pub mod publish;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
