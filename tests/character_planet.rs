use anyhow::Result;
use evevault::{CreateCharacterPlanetParams, CreatePlanetPinParams, PlanetPinContent};

#[path = "util.rs"]
mod util;

fn colony(planet_id: i64, pins: Vec<CreatePlanetPinParams>) -> CreateCharacterPlanetParams {
    CreateCharacterPlanetParams {
        character_id: 90_000_001,
        eve_planet_id: planet_id,
        last_update: 1_700_000_000_000,
        upgrade_level: 4,
        pins,
    }
}

#[tokio::test]
async fn replace_then_get_resolves_full_tree() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    let planet = util::seed_planet(&st, 40000001, 30000142).await;
    let extractor = util::seed_type(&st, 3060).await;

    st.replace_character_planets(
        90_000_001,
        &[colony(
            planet.id,
            vec![CreatePlanetPinParams {
                pin_id: 1,
                eve_type_id: extractor.id,
                schematic_id: Some(121),
                expiry_time: Some(1_700_100_000_000),
                contents: vec![
                    PlanetPinContent {
                        eve_type_id: 2268,
                        amount: 9000,
                    },
                    PlanetPinContent {
                        eve_type_id: 2305,
                        amount: 150,
                    },
                ],
            }],
        )],
    )
    .await?;

    let got = st.get_character_planet(90_000_001, planet.id).await?;
    assert_eq!(got.planet.id, planet.id);
    assert_eq!(got.upgrade_level, 4);
    assert_eq!(got.pins.len(), 1);
    let pin = &got.pins[0];
    assert_eq!(pin.kind.id, extractor.id);
    assert_eq!(pin.schematic_id, Some(121));
    assert_eq!(pin.contents.len(), 2);
    assert_eq!(pin.contents[0].eve_type_id, 2268);
    assert_eq!(pin.contents[0].amount, 9000);
    Ok(())
}

#[tokio::test]
async fn replace_removes_previous_colonies() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    let first = util::seed_planet(&st, 40000001, 30000142).await;
    let second = st
        .get_or_create_eve_planet(40000002, 30000142, 2016, "Planet II")
        .await?;

    st.replace_character_planets(90_000_001, &[colony(first.id, vec![])])
        .await?;
    st.replace_character_planets(90_000_001, &[colony(second.id, vec![])])
        .await?;

    let planets = st.list_character_planets(90_000_001).await?;
    assert_eq!(planets.len(), 1);
    assert_eq!(planets[0].planet.id, second.id);
    assert!(st
        .get_character_planet(90_000_001, first.id)
        .await
        .unwrap_err()
        .is_not_found());
    Ok(())
}

#[tokio::test]
async fn pins_without_schematic_read_back_as_none() -> Result<()> {
    let st = util::memory_storage().await;
    util::seed_character(&st, 90_000_001).await;
    let planet = util::seed_planet(&st, 40000001, 30000142).await;
    let spaceport = util::seed_type(&st, 2544).await;

    st.replace_character_planets(
        90_000_001,
        &[colony(
            planet.id,
            vec![CreatePlanetPinParams {
                pin_id: 9,
                eve_type_id: spaceport.id,
                schematic_id: None,
                expiry_time: None,
                contents: vec![],
            }],
        )],
    )
    .await?;

    let got = st.get_character_planet(90_000_001, planet.id).await?;
    assert_eq!(got.pins[0].schematic_id, None);
    assert_eq!(got.pins[0].expiry_time, None);
    assert!(got.pins[0].contents.is_empty());
    Ok(())
}
