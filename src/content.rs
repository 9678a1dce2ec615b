//! Read, replace and reset the homepage document.
//!
//! Every write is a plain read-modify-write against the store: load the current
//! document (or the defaults), change it, stamp `updated_at`, upsert.

use log::info;
use thiserror::Error;

use crate::models::homepage::{HomepageContent, HomepageUpdate, DEMO_SLOTS};
use crate::store::Store;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Invalid demo item index {0}. Must be 0, 1, or 2")]
    InvalidDemoIndex(i64),
    #[error("Demo item at index {0} does not exist")]
    MissingDemoItem(usize),
    #[error("{}", .0.join("; "))]
    Invalid(Vec<String>),
    #[error("storage error: {0}")]
    Storage(String),
}

/// A validated demo item position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoSlot(usize);

impl DemoSlot {
    pub fn index(self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for DemoSlot {
    type Error = ContentError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        usize::try_from(raw)
            .ok()
            .filter(|i| *i < DEMO_SLOTS)
            .map(DemoSlot)
            .ok_or(ContentError::InvalidDemoIndex(raw))
    }
}

fn load_or_default(store: &dyn Store) -> Result<HomepageContent, ContentError> {
    Ok(store
        .homepage_get()
        .map_err(ContentError::Storage)?
        .unwrap_or_else(HomepageContent::defaults))
}

fn persist(store: &dyn Store, mut content: HomepageContent) -> Result<HomepageContent, ContentError> {
    content.touch();
    store
        .homepage_upsert(&content)
        .map_err(ContentError::Storage)?;
    Ok(content)
}

/// Stored document, or the defaults when nothing was written yet. Never writes.
pub fn get(store: &dyn Store) -> Result<HomepageContent, ContentError> {
    load_or_default(store)
}

/// Shallow merge: each field present in `update` replaces the stored one.
pub fn replace(store: &dyn Store, update: HomepageUpdate) -> Result<HomepageContent, ContentError> {
    update.validate().map_err(ContentError::Invalid)?;
    let mut content = load_or_default(store)?;
    update.apply_to(&mut content);
    let saved = persist(store, content)?;
    info!("Homepage content updated");
    Ok(saved)
}

/// Overwrite whatever is stored with the defaults.
pub fn reset(store: &dyn Store) -> Result<HomepageContent, ContentError> {
    let saved = persist(store, HomepageContent::defaults())?;
    info!("Homepage content reset to defaults");
    Ok(saved)
}

pub fn set_hero_image(store: &dyn Store, reference: String) -> Result<HomepageContent, ContentError> {
    let mut content = load_or_default(store)?;
    content.hero.hero_image_base64 = Some(reference);
    persist(store, content)
}

pub fn set_demo_image(
    store: &dyn Store,
    slot: DemoSlot,
    reference: String,
) -> Result<HomepageContent, ContentError> {
    let mut content = load_or_default(store)?;
    let item = content
        .demo_items
        .get_mut(slot.index())
        .ok_or(ContentError::MissingDemoItem(slot.index()))?;
    item.image_base64 = Some(reference);
    persist(store, content)
}
