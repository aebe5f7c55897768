use std::{fs, io, path::Path};

use crate::model::RunSnapshot;

/// Overwrites `path` with the snapshot as pretty printed JSON.
pub fn save_snapshot(path: &Path, snapshot: &RunSnapshot) -> Result<(), SaveSnapshotError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;

    Ok(())
}

#[derive(thiserror::Error, Debug)]
pub enum SaveSnapshotError {
    #[error("error serializing the snapshot")]
    Serialize(#[from] serde_json::Error),

    #[error("error writing the snapshot file")]
    Write(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;
    use crate::model::{RouteResult, TimePair};

    #[test]
    fn test_save_overwrites() -> Result<(), anyhow::Error> {
        let path = env::temp_dir().join(format!("rail_timetable_{}_snapshot.json", std::process::id()));
        fs::write(&path, "old contents that are much longer than the new snapshot will ever be, surely")?;

        let snapshot = RunSnapshot {
            last_updated: "2024-05-01 06:00:00".to_string(),
            routes: vec![RouteResult {
                name: "A to B".to_string(),
                departure_station: "A".to_string(),
                arrival_station: "B".to_string(),
                timetable: vec![TimePair::new("07:05", "07:21")],
            }],
        };
        save_snapshot(&path, &snapshot)?;

        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(written["last_updated"], "2024-05-01 06:00:00");
        assert_eq!(written["routes"]["A to B"]["timetable"][0]["arrival"], "07:21");

        fs::remove_file(&path)?;
        Ok(())
    }
}
