//! End-to-end load of realistic SavedVariables files.

use crate::helpers::{FAR_FUTURE, saved_variables_file, write_saved_variables};
use missionminder::addon::{
    ExtractError, FollowerType, LoadError, PayloadDecoder, Reward, SavedVariables,
};
use missionminder::report::{Report, Urgency};

const NOW: i64 = 1_700_000_000;

fn export_json() -> String {
    serde_json::json!({
        "Characters": {
            "Kyrian-Area 52": {
                "Name": "Kyrian", "Realm": "Area 52", "Class": "PRIEST", "Level": 60,
                "Money": 12_345_678,
                "AdventureTables": {
                    "123": {
                        "Type": 123,
                        "Followers": {
                            "1001": {"name": "Pelagos", "level": 30, "isAutoTroop": false},
                            "1002": {"name": "Kleia", "level": 28},
                            "1003": {"name": "Mikanikos", "level": 25},
                            "1004": {"name": "Ascended Troop", "isAutoTroop": true}
                        },
                        "Missions": [
                            {
                                "missionID": 2200, "name": "Hubris", "missionEndTime": NOW - 60,
                                "missionScalar": 60, "xp": 1500, "followers": [1001],
                                "rewards": [{"followerXP": 1500, "name": "XP", "title": "Bonus XP"}]
                            },
                            {
                                "missionID": 2201, "name": "Anima Drain", "missionEndTime": NOW + 600,
                                "missionScalar": 58, "xp": "900", "followers": ["1002", "1004"],
                                "rewards": [
                                    {"currencyID": 0, "title": "Money Reward", "quantity": 123_456},
                                    {"currencyID": 1813, "title": "Reservoir Anima", "quantity": 5},
                                    {"mystery": true}
                                ]
                            },
                            {
                                "missionID": 2202, "name": "Long Haul", "missionEndTime": FAR_FUTURE,
                                "missionScalar": 54, "xp": 700, "followers": [],
                                "rewards": [
                                    {"itemID": 184_286, "quantity": 1,
                                     "itemLink": "|cff0070dd|Hitem:184286::::::::60:::::|h[Extinguished Soul Anima]|h|r"}
                                ]
                            }
                        ]
                    }
                }
            },
            "Bank-Area 52": { "Name": "Bank", "Realm": "Area 52", "AdventureTables": [] }
        }
    })
    .to_string()
}

#[tokio::test]
async fn loads_full_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_saved_variables(dir.path(), &export_json());
    let snapshot = SavedVariables::new(&path, PayloadDecoder::default())
        .load()
        .await
        .unwrap();

    assert_eq!(snapshot.character_keys(), vec!["Bank-Area 52", "Kyrian-Area 52"]);
    let kyrian = snapshot.character("Kyrian-Area 52").unwrap();
    assert_eq!(kyrian.to_string(), "Kyrian-Area 52");
    assert_eq!(kyrian.money, 12_345_678);

    let table = kyrian.table(FollowerType::Shadowlands).unwrap();
    assert_eq!(table.num_companions(), 3);
    assert_eq!(table.missions_active().len(), 3);
    assert_eq!(table.missions_complete(NOW).len(), 1);
    // Pelagos and Kleia are out; Mikanikos is home.
    let idle: Vec<&str> = table
        .idle_companions()
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(idle, vec!["Mikanikos"]);

    assert!(snapshot.character("Bank-Area 52").unwrap().adventure_tables.is_empty());
}

#[tokio::test]
async fn rewards_are_classified_and_rendered() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_saved_variables(dir.path(), &export_json());
    let snapshot = SavedVariables::new(&path, PayloadDecoder::default())
        .load()
        .await
        .unwrap();
    let table = snapshot
        .character("Kyrian-Area 52")
        .and_then(|c| c.table(FollowerType::Shadowlands))
        .unwrap();

    let drain = &table.missions[1];
    assert_eq!(drain.xp, 900);
    assert!(matches!(drain.rewards[0], Reward::Currency(ref c) if c.amount() == "12.3456"));
    assert!(matches!(drain.rewards[1], Reward::Currency(ref c) if c.amount() == "5"));
    assert!(matches!(drain.rewards[2], Reward::Unknown(_)));
    assert_eq!(
        drain.reward_summary(),
        "[900XP] Money Reward: 12.3456g; Reservoir Anima: 5"
    );

    let haul = &table.missions[2];
    assert_eq!(haul.reward_summary(), "[700XP] [Extinguished Soul Anima]x1");

    assert!(matches!(table.missions[0].rewards[0], Reward::Experience(_)));
}

#[tokio::test]
async fn report_over_loaded_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_saved_variables(dir.path(), &export_json());
    let snapshot = SavedVariables::new(&path, PayloadDecoder::default())
        .load()
        .await
        .unwrap();

    let report = Report::build(&snapshot, FollowerType::Shadowlands, NOW, 3);
    assert_eq!(report.total_characters, 2);
    assert_eq!(report.total_complete, 1);
    assert_eq!(report.total_active, 3);
    assert_eq!(report.characters.len(), 1);

    let kyrian = &report.characters[0];
    assert_eq!(kyrian.idle_companions, 1);
    let next: Vec<&str> = kyrian.next.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(next, vec!["Anima Drain", "Long Haul"]);
    assert_eq!(kyrian.next[0].companions, 1);
    assert_eq!(kyrian.next[0].urgency(), Urgency::Alert);
    assert_eq!(kyrian.next[1].urgency(), Urgency::Normal);
}

#[tokio::test]
async fn empty_file_reports_empty_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("MissionMinder.lua");
    std::fs::write(&path, "").unwrap();

    let err = SavedVariables::new(&path, PayloadDecoder::default())
        .load()
        .await
        .unwrap_err();
    assert!(err.is_empty_contents());
}

#[tokio::test]
async fn file_without_export_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("MissionMinder.lua");
    std::fs::write(&path, "MissionMinderDB = {\n\t[\"version\"] = 3,\n}\n").unwrap();

    let err = SavedVariables::new(&path, PayloadDecoder::default())
        .load()
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::Extract(ExtractError::NotFound)));
}

#[tokio::test]
async fn oversized_export_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("MissionMinder.lua");
    std::fs::write(&path, saved_variables_file(&export_json())).unwrap();

    let err = SavedVariables::new(&path, PayloadDecoder::new(64))
        .load()
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::Decompression(_)));
}

#[tokio::test]
async fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SavedVariables::new(dir.path().join("absent.lua"), PayloadDecoder::default())
        .load()
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::Read { .. }));
}
