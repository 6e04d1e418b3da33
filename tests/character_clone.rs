use anyhow::Result;
use evevault::CreateCharacterJumpCloneParams;

#[path = "util.rs"]
mod util;

#[tokio::test]
async fn replace_implants_leaves_only_new_set() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    let a = util::seed_type(&st, 9899).await;
    let b = util::seed_type(&st, 9941).await;
    let c = util::seed_type(&st, 10208).await;

    st.replace_character_implants(90_000_001, &[a.id, b.id])
        .await?;
    st.replace_character_implants(90_000_001, &[c.id]).await?;

    let implants = st.list_character_implants(90_000_001).await?;
    assert_eq!(implants.len(), 1);
    assert_eq!(implants[0].eve_type.id, c.id);
    Ok(())
}

#[tokio::test]
async fn replace_implants_with_empty_set_clears() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    let a = util::seed_type(&st, 9899).await;
    st.replace_character_implants(90_000_001, &[a.id]).await?;
    st.replace_character_implants(90_000_001, &[]).await?;
    assert!(st.list_character_implants(90_000_001).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn replace_jump_clones_replaces_nested_implants() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    let system = util::seed_solar_system(&st, 30000142).await;
    let a = util::seed_type(&st, 9899).await;
    let b = util::seed_type(&st, 9941).await;

    st.replace_character_jump_clones(
        90_000_001,
        &[CreateCharacterJumpCloneParams {
            character_id: 90_000_001,
            jump_clone_id: 1,
            location_id: system.id,
            name: "Combat clone".into(),
            implants: vec![a.id, b.id],
        }],
    )
    .await?;

    st.replace_character_jump_clones(
        90_000_001,
        &[CreateCharacterJumpCloneParams {
            character_id: 90_000_001,
            jump_clone_id: 2,
            location_id: system.id,
            name: String::new(),
            implants: vec![b.id],
        }],
    )
    .await?;

    let clones = st.list_character_jump_clones(90_000_001).await?;
    assert_eq!(clones.len(), 1);
    assert_eq!(clones[0].jump_clone_id, 2);
    assert_eq!(clones[0].location.id, system.id);
    let implant_ids: Vec<i64> = clones[0].implants.iter().map(|t| t.id).collect();
    assert_eq!(implant_ids, vec![b.id]);

    let old = st.get_character_jump_clone(90_000_001, 1).await;
    assert!(old.unwrap_err().is_not_found());
    Ok(())
}

#[tokio::test]
async fn get_jump_clone_by_game_id() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    let system = util::seed_solar_system(&st, 30000142).await;

    st.replace_character_jump_clones(
        90_000_001,
        &[CreateCharacterJumpCloneParams {
            character_id: 90_000_001,
            jump_clone_id: 7,
            location_id: system.id,
            name: "Spare".into(),
            implants: vec![],
        }],
    )
    .await?;

    let clone = st.get_character_jump_clone(90_000_001, 7).await?;
    assert_eq!(clone.name, "Spare");
    assert!(clone.implants.is_empty());
    Ok(())
}
