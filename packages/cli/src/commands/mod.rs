pub mod css;
pub mod init;
pub mod inspect;
pub mod migrate;

pub use css::{css, CssArgs};
pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
pub use migrate::{migrate, MigrateArgs};

use crate::config::Project;
use anyhow::{anyhow, Result};
use vantage_layout::compat::needs_migration;
use vantage_layout::{decode_document, normalize, PageDocument};

/// A stored page decoded and normalized, plus whether the stored JSON
/// still needs converting
pub(crate) struct LoadedPage {
    pub document: PageDocument,
    pub legacy: bool,
}

pub(crate) async fn load_page(project: &Project, page_id: &str) -> Result<LoadedPage> {
    let raw = project
        .storage()
        .load_raw(page_id)
        .await?
        .ok_or_else(|| anyhow!("Page not found: {}", page_id))?;

    let layout = &project.config.layout;
    let legacy = needs_migration(&raw);
    let document = decode_document(raw, layout)?;
    let legacy = legacy || document.is_legacy();

    Ok(LoadedPage {
        document: normalize(&document, layout.default_section_height),
        legacy,
    })
}
