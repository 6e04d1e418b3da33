use anyhow::Result;
use evevault::{Error, EveEntityCategory};

#[path = "util.rs"]
mod util;

#[tokio::test]
async fn create_then_get() -> Result<()> {
    let st = util::memory_storage().await;
    st.create_eve_entity(42, "CONCORD", EveEntityCategory::Corporation)
        .await?;
    let got = st.get_eve_entity(42).await?;
    assert_eq!(got.name, "CONCORD");
    assert_eq!(got.category, EveEntityCategory::Corporation);
    Ok(())
}

#[tokio::test]
async fn duplicate_create_reports_conflict() -> Result<()> {
    let st = util::memory_storage().await;
    st.create_eve_entity(42, "CONCORD", EveEntityCategory::Corporation)
        .await?;
    let err = st
        .create_eve_entity(42, "Other", EveEntityCategory::Corporation)
        .await
        .unwrap_err();
    assert!(err.is_already_exists());
    Ok(())
}

#[tokio::test]
async fn get_missing_is_not_found() -> Result<()> {
    let st = util::memory_storage().await;
    let err = st.get_eve_entity(999).await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn zero_id_is_rejected() -> Result<()> {
    let st = util::memory_storage().await;
    let err = st
        .create_eve_entity(0, "Nobody", EveEntityCategory::Character)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    Ok(())
}

#[tokio::test]
async fn get_or_create_never_overwrites() -> Result<()> {
    let st = util::memory_storage().await;
    st.create_eve_entity(7, "Original", EveEntityCategory::Character)
        .await?;
    let got = st
        .get_or_create_eve_entity(7, "Imposter", EveEntityCategory::Alliance)
        .await?;
    assert_eq!(got.name, "Original");
    assert_eq!(got.category, EveEntityCategory::Character);
    Ok(())
}

#[tokio::test]
async fn update_or_create_refreshes_in_place() -> Result<()> {
    let st = util::memory_storage().await;
    st.create_eve_entity(7, "Old Name", EveEntityCategory::Character)
        .await?;
    let got = st
        .update_or_create_eve_entity(7, "New Name", EveEntityCategory::Character)
        .await?;
    assert_eq!(got.name, "New Name");
    assert_eq!(st.get_eve_entity(7).await?.name, "New Name");
    Ok(())
}

#[tokio::test]
async fn partial_name_search_matches_substring() -> Result<()> {
    let st = util::memory_storage().await;
    st.create_eve_entity(1, "Jita Trade Corp", EveEntityCategory::Corporation)
        .await?;
    st.create_eve_entity(2, "Amarr Holdings", EveEntityCategory::Corporation)
        .await?;
    let found = st.list_eve_entities_by_partial_name("trade").await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 1);
    Ok(())
}

#[tokio::test]
async fn missing_ids_reports_unknown_only() -> Result<()> {
    let st = util::memory_storage().await;
    st.create_eve_entity(10, "Known", EveEntityCategory::Character)
        .await?;
    let missing = st.missing_eve_entity_ids(&[10, 20, 30, 20]).await?;
    assert_eq!(missing, vec![20, 30]);
    Ok(())
}
