//! Static panel assets
//!
//! Serves the built relations panel from a directory on disk when one is
//! configured.

use std::path::Path;

use tower_http::services::ServeDir;
use tracing::debug;

/// URL prefix the panel is mounted under
pub const PANEL_PATH: &str = "/advancedrelations-panel";

/// Service for the panel directory; directory requests resolve to `index.html`
pub fn panel_service(panel_dir: &Path) -> ServeDir {
    debug!("Serving relations panel from {:?}", panel_dir);
    ServeDir::new(panel_dir).append_index_html_on_directories(true)
}
