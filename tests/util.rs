#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use evevault::{
    CreateEveCharacterParams, EveEntityCategory, EvePlanet, EveSolarSystem, EveType, Storage,
    UpdateOrCreateCharacterParams,
};

/// Opt-in test logging via RUST_LOG, e.g. RUST_LOG=evevault=debug.
pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub async fn memory_storage() -> Storage {
    init_tracing();
    Storage::open_in_memory()
        .await
        .expect("open in-memory storage")
}

/// Seeds the inventory chain and returns a type with the given ID.
pub async fn seed_type(st: &Storage, type_id: i64) -> EveType {
    st.get_or_create_eve_category(6, "Ship", true).await.unwrap();
    st.get_or_create_eve_group(25, 6, "Frigate", true)
        .await
        .unwrap();
    st.get_or_create_eve_type(type_id, 25, &format!("Type {type_id}"), "", true)
        .await
        .unwrap()
}

/// Seeds the map chain and returns a solar system with the given ID.
pub async fn seed_solar_system(st: &Storage, system_id: i64) -> EveSolarSystem {
    st.get_or_create_eve_region(10000002, "The Forge", "")
        .await
        .unwrap();
    st.get_or_create_eve_constellation(20000020, 10000002, "Kimotoro")
        .await
        .unwrap();
    st.get_or_create_eve_solar_system(system_id, 20000020, &format!("System {system_id}"), 0.9)
        .await
        .unwrap()
}

pub async fn seed_planet(st: &Storage, planet_id: i64, system_id: i64) -> EvePlanet {
    seed_solar_system(st, system_id).await;
    seed_type(st, 2016).await;
    st.get_or_create_eve_planet(planet_id, system_id, 2016, &format!("Planet {planet_id}"))
        .await
        .unwrap()
}

/// Creates a character with the minimal reference rows it depends on.
pub async fn seed_character(st: &Storage, id: i64) {
    st.get_or_create_eve_entity(2001, "Seed Corporation", EveEntityCategory::Corporation)
        .await
        .unwrap();
    st.get_or_create_eve_race(1, "Caldari", "").await.unwrap();
    st.create_eve_character(CreateEveCharacterParams {
        id,
        alliance_id: None,
        birthday: 1_200_000_000_000,
        corporation_id: 2001,
        description: String::new(),
        faction_id: None,
        gender: "female".into(),
        name: format!("Character {id}"),
        race_id: 1,
        security_status: 0.5,
        title: String::new(),
    })
    .await
    .unwrap();
    st.update_or_create_character(UpdateOrCreateCharacterParams {
        id,
        ..Default::default()
    })
    .await
    .unwrap();
}
