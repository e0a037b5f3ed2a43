mod demo;
mod http;

use std::sync::Arc;

use svcdash_core::config::DashConfig;
use svcdash_core::directory::{DirectoryError, ServiceDirectory};

pub use demo::DemoDirectory;
pub use http::{HttpDirectory, normalize_addr};

/// Pick the directory implementation for this run.
pub fn build_directory(
    config: &DashConfig,
    demo: bool,
) -> Result<Arc<dyn ServiceDirectory>, DirectoryError> {
    if demo {
        return Ok(Arc::new(DemoDirectory::new()));
    }
    let http = HttpDirectory::new(config.base_url(), config.request_timeout())?;
    Ok(Arc::new(http))
}
