//! Theme preference.

use ep_store::{LocalStore, StoreError, Theme};

use crate::error::AppResult;

/// Stored theme; missing or unrecognised values read as light.
pub fn current_theme(store: &LocalStore) -> AppResult<Theme> {
    match store.theme() {
        Ok(theme) => Ok(theme.unwrap_or_default()),
        Err(StoreError::InvalidValue { value, .. }) => {
            tracing::warn!(value = %value, "ignoring unrecognised theme preference");
            Ok(Theme::default())
        }
        Err(err) => Err(err.into()),
    }
}

pub fn set_theme(store: &LocalStore, theme: Theme) -> AppResult<Theme> {
    store.set_theme(theme)?;
    Ok(theme)
}

pub fn toggle_theme(store: &LocalStore) -> AppResult<Theme> {
    let next = current_theme(store)?.toggled();
    set_theme(store, next)
}
