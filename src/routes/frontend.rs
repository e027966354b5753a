use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Static file service for the bundled single-page frontend.
///
/// Unknown paths fall back to `index.html` so client-side routes resolve.
pub fn frontend_service(dist_dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dist_dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(dist_dir.join("index.html")))
}
