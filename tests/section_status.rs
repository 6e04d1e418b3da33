use anyhow::Result;
use evevault::{
    now_ms, CharacterSection, GeneralSection, UpdateOrCreateCharacterSectionStatusParams,
    UpdateOrCreateGeneralSectionStatusParams,
};

#[path = "util.rs"]
mod util;

#[tokio::test]
async fn first_write_creates_status_row() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    let before = now_ms();

    let status = st
        .update_or_create_character_section_status(
            CharacterSection::Assets,
            UpdateOrCreateCharacterSectionStatusParams {
                character_id: 90_000_001,
                completed_at: Some(Some(before)),
                content_hash: Some("abc123".into()),
                error: None,
                started_at: None,
            },
        )
        .await?;

    assert_eq!(status.section, CharacterSection::Assets);
    assert_eq!(status.completed_at, Some(before));
    assert_eq!(status.content_hash, "abc123");
    assert!(status.is_ok());
    assert!(status.updated_at >= before);
    Ok(())
}

#[tokio::test]
async fn patch_preserves_unspecified_fields() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    let completed = now_ms();
    st.update_or_create_character_section_status(
        CharacterSection::Mails,
        UpdateOrCreateCharacterSectionStatusParams {
            character_id: 90_000_001,
            completed_at: Some(Some(completed)),
            content_hash: Some("hash-1".into()),
            error: None,
            started_at: None,
        },
    )
    .await?;

    // A later failure records the error without touching the last success.
    let status = st
        .update_or_create_character_section_status(
            CharacterSection::Mails,
            UpdateOrCreateCharacterSectionStatusParams {
                character_id: 90_000_001,
                completed_at: None,
                content_hash: None,
                error: Some("upstream timeout".into()),
                started_at: None,
            },
        )
        .await?;

    assert_eq!(status.completed_at, Some(completed));
    assert_eq!(status.content_hash, "hash-1");
    assert_eq!(status.error, "upstream timeout");
    assert!(!status.is_ok());
    Ok(())
}

#[tokio::test]
async fn explicit_none_clears_timestamp() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    st.update_or_create_character_section_status(
        CharacterSection::Skills,
        UpdateOrCreateCharacterSectionStatusParams {
            character_id: 90_000_001,
            started_at: Some(Some(now_ms())),
            ..Default::default()
        },
    )
    .await?;

    let status = st
        .update_or_create_character_section_status(
            CharacterSection::Skills,
            UpdateOrCreateCharacterSectionStatusParams {
                character_id: 90_000_001,
                started_at: Some(None),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(status.started_at, None);
    Ok(())
}

#[tokio::test]
async fn sections_are_tracked_independently() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    for section in [CharacterSection::Assets, CharacterSection::WalletBalance] {
        st.update_or_create_character_section_status(
            section,
            UpdateOrCreateCharacterSectionStatusParams {
                character_id: 90_000_001,
                content_hash: Some(format!("{section:?}")),
                ..Default::default()
            },
        )
        .await?;
    }

    let all = st.list_character_section_status(90_000_001).await?;
    assert_eq!(all.len(), 2);
    let assets = st
        .get_character_section_status(90_000_001, CharacterSection::Assets)
        .await?;
    assert_eq!(assets.content_hash, "Assets");
    Ok(())
}

#[tokio::test]
async fn get_missing_status_is_not_found() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    let err = st
        .get_character_section_status(90_000_001, CharacterSection::Planets)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn general_status_upserts_per_section() -> Result<()> {
    let st = util::memory_storage().await;
    st.update_or_create_general_section_status(
        GeneralSection::Entities,
        UpdateOrCreateGeneralSectionStatusParams {
            completed_at: Some(Some(now_ms())),
            content_hash: Some("entities-v1".into()),
            ..Default::default()
        },
    )
    .await?;
    st.update_or_create_general_section_status(
        GeneralSection::Entities,
        UpdateOrCreateGeneralSectionStatusParams {
            content_hash: Some("entities-v2".into()),
            ..Default::default()
        },
    )
    .await?;

    let status = st
        .get_general_section_status(GeneralSection::Entities)
        .await?;
    assert_eq!(status.content_hash, "entities-v2");
    assert!(status.completed_at.is_some());
    assert_eq!(st.list_general_section_status().await?.len(), 1);
    Ok(())
}
