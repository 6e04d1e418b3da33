use anyhow::Result;
use evevault::{CreateEveCharacterParams, EveEntityCategory, UpdateOrCreateCharacterParams};

#[path = "util.rs"]
mod util;

#[tokio::test]
async fn get_character_resolves_nested_references() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    util::seed_solar_system(&st, 30000142).await;
    let ship = util::seed_type(&st, 587).await;

    st.update_or_create_character(UpdateOrCreateCharacterParams {
        id: 90_000_001,
        home_id: Some(30000142),
        location_id: Some(30000142),
        ship_id: Some(ship.id),
        last_login_at: Some(1_700_000_000_000),
        total_sp: Some(5_000_000),
        unallocated_sp: Some(1_000),
        wallet_balance: Some(1234.5),
        asset_value: Some(99.0),
        is_training_watched: true,
    })
    .await?;

    let got = st.get_character(90_000_001).await?;
    assert_eq!(got.eve_character.name, "Character 90000001");
    assert_eq!(got.eve_character.corporation.id, 2001);
    assert_eq!(got.home.unwrap().id, 30000142);
    assert_eq!(got.ship.unwrap().id, 587);
    assert_eq!(got.total_sp, Some(5_000_000));
    assert!(got.is_training_watched);
    Ok(())
}

#[tokio::test]
async fn character_with_alliance_and_faction() -> Result<()> {
    let st = util::memory_storage().await;
    st.get_or_create_eve_entity(2001, "Corp", EveEntityCategory::Corporation)
        .await?;
    st.get_or_create_eve_entity(3001, "Alliance", EveEntityCategory::Alliance)
        .await?;
    st.get_or_create_eve_entity(500001, "Faction", EveEntityCategory::Faction)
        .await?;
    st.get_or_create_eve_race(1, "Caldari", "").await?;
    st.create_eve_character(CreateEveCharacterParams {
        id: 90_000_002,
        alliance_id: Some(3001),
        birthday: 0,
        corporation_id: 2001,
        description: String::new(),
        faction_id: Some(500001),
        gender: "male".into(),
        name: "Pilot".into(),
        race_id: 1,
        security_status: -1.2,
        title: "CEO".into(),
    })
    .await?;

    let got = st.get_eve_character(90_000_002).await?;
    assert_eq!(got.alliance.unwrap().name, "Alliance");
    assert_eq!(got.faction.unwrap().name, "Faction");
    Ok(())
}

#[tokio::test]
async fn list_characters_short_is_sorted_by_name() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_009).await;
    util::seed_character(&st, 90_000_001).await;
    let short = st.list_characters_short().await?;
    let names: Vec<&str> = short.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Character 90000001", "Character 90000009"]);
    Ok(())
}

#[tokio::test]
async fn field_updates_apply_and_clear() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    util::seed_solar_system(&st, 30000142).await;

    st.update_character_home(90_000_001, Some(30000142)).await?;
    assert_eq!(st.get_character(90_000_001).await?.home.unwrap().id, 30000142);

    st.update_character_home(90_000_001, None).await?;
    assert!(st.get_character(90_000_001).await?.home.is_none());

    st.update_character_wallet_balance(90_000_001, Some(42.0))
        .await?;
    st.update_character_skill_points(90_000_001, Some(100), Some(5))
        .await?;
    st.update_character_is_training_watched(90_000_001, true)
        .await?;
    let got = st.get_character(90_000_001).await?;
    assert_eq!(got.wallet_balance, Some(42.0));
    assert_eq!(got.total_sp, Some(100));
    assert!(got.is_training_watched);
    Ok(())
}

#[tokio::test]
async fn update_on_missing_character_is_not_found() -> Result<()> {
    let st = util::memory_storage().await;
    let err = st
        .update_character_wallet_balance(404, Some(1.0))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn delete_character_cascades_to_children() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    st.replace_character_implants(90_000_001, &[util::seed_type(&st, 587).await.id])
        .await?;

    st.delete_character(90_000_001).await?;
    assert!(st.get_character(90_000_001).await.unwrap_err().is_not_found());
    assert!(st.list_character_implants(90_000_001).await?.is_empty());
    assert!(st.list_character_ids().await?.is_empty());
    Ok(())
}
