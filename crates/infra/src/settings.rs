//! Per-user settings records (theme preference).

use serde_json::Value as JsonValue;
use tracing::debug;

use realtyops_core::{Theme, ThemePreference, UserId};

use crate::store::{Filter, Query, Record, RecordStore, StoreError, Table, ID_FIELD};

const THEME_FIELD: &str = "theme";

/// The user's stored preference; the default when nothing was saved.
///
/// An unrecognised stored theme reads as "not chosen".
pub async fn load_preference<S>(store: &S, user: UserId) -> Result<ThemePreference, StoreError>
where
    S: RecordStore + ?Sized,
{
    let rows = store
        .select(Table::Settings, &Query::filtered(Filter::by_id(user)).limit(1))
        .await?;
    let saved = rows
        .first()
        .and_then(|r| r.get(THEME_FIELD))
        .and_then(|v| serde_json::from_value::<Theme>(v.clone()).ok());
    Ok(ThemePreference { saved })
}

/// Write the preference, creating the user's settings record on first use.
pub async fn save_preference<S>(store: &S, user: UserId, pref: ThemePreference) -> Result<ThemePreference, StoreError>
where
    S: RecordStore + ?Sized,
{
    let theme = match pref.saved {
        Some(t) => JsonValue::String(t.as_str().to_string()),
        None => JsonValue::Null,
    };
    let mut fields = Record::new();
    fields.insert(THEME_FIELD.to_string(), theme);

    let updated = store
        .update(Table::Settings, &Filter::by_id(user), fields.clone())
        .await?;
    if updated.is_empty() {
        let mut record = fields.clone();
        record.insert(ID_FIELD.to_string(), JsonValue::String(user.to_string()));
        match store.insert(Table::Settings, record).await {
            Ok(_) => {}
            // Created concurrently; ours is the later write.
            Err(StoreError::Duplicate { .. }) => {
                store.update(Table::Settings, &Filter::by_id(user), fields).await?;
            }
            Err(e) => return Err(e),
        }
    }

    debug!(user_id = %user, theme = ?pref.saved, "theme preference saved");
    Ok(pref)
}

/// Flip the effective theme and persist the result as an explicit choice.
pub async fn toggle_theme<S>(store: &S, user: UserId, system: Option<Theme>) -> Result<ThemePreference, StoreError>
where
    S: RecordStore + ?Sized,
{
    let current = load_preference(store, user).await?;
    save_preference(store, user, current.toggle(system)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRecordStore;

    #[tokio::test]
    async fn unknown_user_has_no_saved_theme() {
        let store = InMemoryRecordStore::new();
        let pref = load_preference(&store, UserId::new()).await.unwrap();
        assert_eq!(pref, ThemePreference::default());
        assert_eq!(pref.resolve(None), Theme::Dark);
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = InMemoryRecordStore::new();
        let user = UserId::new();
        save_preference(&store, user, ThemePreference::explicit(Theme::Light)).await.unwrap();
        save_preference(&store, user, ThemePreference::explicit(Theme::Dark)).await.unwrap();

        assert_eq!(load_preference(&store, user).await.unwrap().saved, Some(Theme::Dark));
        assert_eq!(store.count(Table::Settings, &Filter::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn toggle_starts_from_system_hint() {
        let store = InMemoryRecordStore::new();
        let user = UserId::new();

        let pref = toggle_theme(&store, user, Some(Theme::Light)).await.unwrap();
        assert_eq!(pref.saved, Some(Theme::Dark));

        // Once saved, the hint no longer matters.
        let pref = toggle_theme(&store, user, Some(Theme::Dark)).await.unwrap();
        assert_eq!(pref.saved, Some(Theme::Light));
    }

    #[tokio::test]
    async fn preferences_are_per_user() {
        let store = InMemoryRecordStore::new();
        let (a, b) = (UserId::new(), UserId::new());
        save_preference(&store, a, ThemePreference::explicit(Theme::Light)).await.unwrap();
        assert_eq!(load_preference(&store, b).await.unwrap().saved, None);
    }
}
