use anyhow::Result;
use evevault::UpdateOrCreateCharacterSkillParams;

#[path = "util.rs"]
mod util;

fn skill(type_id: i64, active: i64, trained: i64, sp: i64) -> UpdateOrCreateCharacterSkillParams {
    UpdateOrCreateCharacterSkillParams {
        character_id: 90_000_001,
        eve_type_id: type_id,
        active_skill_level: active,
        trained_skill_level: trained,
        skill_points_in_skill: sp,
    }
}

#[tokio::test]
async fn upsert_twice_keeps_one_row_with_new_levels() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    let t = util::seed_type(&st, 3300).await;

    st.update_or_create_character_skill(skill(t.id, 3, 4, 90_000))
        .await?;
    st.update_or_create_character_skill(skill(t.id, 4, 4, 135_765))
        .await?;

    let got = st.get_character_skill(90_000_001, t.id).await?;
    assert_eq!(got.active_skill_level, 4);
    assert_eq!(got.skill_points_in_skill, 135_765);
    assert_eq!(st.list_character_skills(90_000_001).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn list_resolves_types_in_type_id_order() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    let b = util::seed_type(&st, 3301).await;
    let a = util::seed_type(&st, 3300).await;
    st.update_or_create_character_skill(skill(b.id, 1, 1, 250))
        .await?;
    st.update_or_create_character_skill(skill(a.id, 1, 1, 250))
        .await?;

    let skills = st.list_character_skills(90_000_001).await?;
    let ids: Vec<i64> = skills.iter().map(|s| s.eve_type.id).collect();
    assert_eq!(ids, vec![3300, 3301]);
    Ok(())
}

#[tokio::test]
async fn delete_removes_only_named_types() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    for type_id in [3300, 3301, 3302] {
        let t = util::seed_type(&st, type_id).await;
        st.update_or_create_character_skill(skill(t.id, 1, 1, 250))
            .await?;
    }

    st.delete_character_skills(90_000_001, &[3300, 3302]).await?;
    assert_eq!(st.list_character_skill_ids(90_000_001).await?, vec![3301]);

    st.delete_character_skills(90_000_001, &[]).await?;
    assert_eq!(st.list_character_skill_ids(90_000_001).await?, vec![3301]);
    Ok(())
}

#[tokio::test]
async fn get_missing_skill_is_not_found() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    let err = st.get_character_skill(90_000_001, 404).await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}
