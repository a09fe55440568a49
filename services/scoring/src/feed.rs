//! Cricsheet CSV feed decoding
//!
//! Two file shapes are understood:
//!
//! - `<match>_info.csv`: headerless rows such as `info,team,<name>` or
//!   `info,player,<team>,<name>`, decoded into setup events
//! - `all_matches.csv` / `<match>.csv`: one delivery per row with a header
//!   line, decoded into delivery events
//!
//! The delivery reader emits an `InningsBreak` whenever the innings column
//! advances within a match, so a replayed file needs no out-of-band signal
//! to swap sides.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use tracing::debug;
use types::errors::FeedError;
use types::extras::ExtraKind;
use types::ids::{MatchId, PlayerName};

use crate::events::{Delivery, EventPayload, Extras, InfoEntry, MatchEvent, Participants};

const INFO_DATE_FORMATS: [&str; 2] = ["%Y/%m/%d", "%Y-%m-%d"];

fn csv_error(err: csv::Error) -> FeedError {
    FeedError::Csv {
        message: err.to_string(),
    }
}

fn field<'r>(record: &'r StringRecord, index: usize, name: &str) -> Result<&'r str, FeedError> {
    record
        .get(index)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FeedError::MissingField {
            field: name.to_string(),
        })
}

fn parse_date(value: &str) -> Result<NaiveDate, FeedError> {
    INFO_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .ok_or_else(|| FeedError::MalformedField {
            field: "date".to_string(),
            value: value.to_string(),
        })
}

/// Parse an optional count column. Blank means absent.
fn parse_count(field: &str, value: &str) -> Result<Option<u32>, FeedError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| FeedError::MalformedField {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// Decode one info-file row.
///
/// Returns `Ok(None)` for rows that carry nothing the scorecard keeps
/// (`version`, `registry`, blank lines).
pub fn decode_info_record(
    match_id: &MatchId,
    record: &StringRecord,
) -> Result<Option<MatchEvent>, FeedError> {
    let kind = match record.get(0).map(str::trim) {
        None | Some("") => return Ok(None),
        Some(kind) => kind,
    };
    match kind {
        "info" => {}
        "version" | "registry" => return Ok(None),
        other => {
            return Err(FeedError::UnknownRecord {
                record: other.to_string(),
            })
        }
    }

    let key = field(record, 1, "key")?;
    let entry = match key {
        "team" => InfoEntry::Team {
            name: field(record, 2, "team")?.to_string(),
        },
        "player" | "players" => InfoEntry::Player {
            team: field(record, 2, "team")?.to_string(),
            name: PlayerName::new(field(record, 3, "player")?),
        },
        "balls_per_over" => {
            let value = field(record, 2, key)?;
            let balls = value.parse::<u32>().map_err(|_| FeedError::MalformedField {
                field: key.to_string(),
                value: value.to_string(),
            })?;
            InfoEntry::BallsPerOver(balls)
        }
        "date" => InfoEntry::Date(parse_date(field(record, 2, key)?)?),
        "venue" => InfoEntry::Venue(field(record, 2, key)?.to_string()),
        "city" => InfoEntry::City(field(record, 2, key)?.to_string()),
        _ => {
            let value = record
                .iter()
                .skip(2)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(",");
            InfoEntry::Other {
                key: key.to_string(),
                value,
            }
        }
    };

    Ok(Some(MatchEvent::info(match_id.clone(), entry)))
}

/// Decode a whole info file.
pub fn read_info<R: Read>(match_id: &MatchId, reader: R) -> Result<Vec<MatchEvent>, FeedError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut events = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if let Some(event) = decode_info_record(match_id, &record)? {
            events.push(event);
        }
    }
    debug!(match_id = %match_id, events = events.len(), "Info file decoded");
    Ok(events)
}

/// Open and decode an info file from disk.
pub fn read_info_file(match_id: &MatchId, path: &Path) -> Result<Vec<MatchEvent>, FeedError> {
    let file = File::open(path).map_err(|e| FeedError::Csv {
        message: format!("{}: {}", path.display(), e),
    })?;
    read_info(match_id, file)
}

/// Match id from an info file name: `335982_info.csv` → `335982`.
pub fn match_id_from_info_path(path: &Path) -> Option<MatchId> {
    let stem = path.file_stem()?.to_str()?;
    let id = stem.strip_suffix("_info").unwrap_or(stem);
    MatchId::try_new(id)
}

/// One row of a Cricsheet deliveries file.
///
/// Columns are kept as text and parsed in `into_event`, so a bad value is
/// reported with its column name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryRow {
    pub match_id: String,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub innings: String,
    #[serde(default)]
    pub ball: String,
    #[serde(default)]
    pub batting_team: String,
    #[serde(default)]
    pub bowling_team: String,
    #[serde(default)]
    pub striker: String,
    #[serde(default)]
    pub non_striker: String,
    #[serde(default)]
    pub bowler: String,
    #[serde(default)]
    pub runs_off_bat: String,
    #[serde(default)]
    pub extras: String,
    #[serde(default)]
    pub wides: String,
    #[serde(default)]
    pub noballs: String,
    #[serde(default)]
    pub byes: String,
    #[serde(default)]
    pub legbyes: String,
    #[serde(default)]
    pub penalty: String,
    #[serde(default)]
    pub wicket_type: String,
    #[serde(default)]
    pub player_dismissed: String,
    #[serde(default)]
    pub other_wicket_type: String,
    #[serde(default)]
    pub other_player_dismissed: String,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl DeliveryRow {
    fn participants(&self) -> Result<Option<Participants>, FeedError> {
        let columns = [
            ("striker", self.striker.trim()),
            ("non_striker", self.non_striker.trim()),
            ("bowler", self.bowler.trim()),
        ];
        if columns.iter().all(|(_, v)| v.is_empty()) {
            return Ok(None);
        }
        if let Some((name, _)) = columns.iter().find(|(_, v)| v.is_empty()) {
            return Err(FeedError::MissingField {
                field: name.to_string(),
            });
        }
        Ok(Some(Participants::new(
            columns[0].1,
            columns[1].1,
            columns[2].1,
        )))
    }

    /// Convert to a delivery event.
    pub fn into_event(self) -> Result<MatchEvent, FeedError> {
        let match_id = MatchId::try_new(&self.match_id).ok_or_else(|| FeedError::MissingField {
            field: "match_id".to_string(),
        })?;

        let mut extras = Extras::default();
        for (kind, value) in [
            (ExtraKind::Wides, &self.wides),
            (ExtraKind::NoBalls, &self.noballs),
            (ExtraKind::Byes, &self.byes),
            (ExtraKind::LegByes, &self.legbyes),
            (ExtraKind::Penalty, &self.penalty),
        ] {
            extras.set(kind, parse_count(kind.as_str(), value)?);
        }

        let delivery = Delivery {
            innings: parse_count("innings", &self.innings)?,
            ball: non_empty(&self.ball),
            batting_team: non_empty(&self.batting_team),
            participants: self.participants()?,
            runs_off_bat: parse_count("runs_off_bat", &self.runs_off_bat)?,
            extras,
            wicket_type: non_empty(&self.wicket_type),
        };

        Ok(MatchEvent::delivery(match_id, delivery))
    }
}

/// Streams delivery events from a Cricsheet deliveries file.
pub struct DeliveryReader<R> {
    rows: csv::DeserializeRecordsIntoIter<R, DeliveryRow>,
    /// Innings of the last delivery emitted, per match. Matches may be
    /// interleaved in one file.
    innings: HashMap<MatchId, u32>,
    pending: Option<MatchEvent>,
}

impl<R: Read> DeliveryReader<R> {
    pub fn new(reader: R) -> Self {
        let rows = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader)
            .into_deserialize();
        Self {
            rows,
            innings: HashMap::new(),
            pending: None,
        }
    }

    /// Returns an innings break to emit before `event`, if the innings
    /// advanced within the same match.
    fn track_innings(&mut self, event: &MatchEvent) -> Option<MatchEvent> {
        let innings = match &event.payload {
            EventPayload::Delivery(delivery) => delivery.innings?,
            _ => return None,
        };

        let previous = self.innings.insert(event.match_id.clone(), innings);
        let advanced = previous.is_some_and(|previous| innings > previous);

        advanced.then(|| MatchEvent::new(event.match_id.clone(), EventPayload::InningsBreak))
    }
}

impl DeliveryReader<File> {
    pub fn open(path: &Path) -> Result<Self, FeedError> {
        let file = File::open(path).map_err(|e| FeedError::Csv {
            message: format!("{}: {}", path.display(), e),
        })?;
        Ok(Self::new(file))
    }
}

impl<R: Read> Iterator for DeliveryReader<R> {
    type Item = Result<MatchEvent, FeedError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.pending.take() {
            return Some(Ok(event));
        }

        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(err) => return Some(Err(csv_error(err))),
        };
        let event = match row.into_event() {
            Ok(event) => event,
            Err(err) => return Some(Err(err)),
        };

        match self.track_innings(&event) {
            Some(innings_break) => {
                self.pending = Some(event);
                Some(Ok(innings_break))
            }
            None => Some(Ok(event)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MATCH: &str = "335982";

    const INFO: &str = "\
version,1.3.0
info,team,Kolkata Knight Riders
info,team,Royal Challengers Bangalore
info,balls_per_over,6
info,season,2007/08
info,date,2008/04/18
info,city,Bangalore
info,venue,\"M Chinnaswamy Stadium, Bangalore\"
info,umpire,Asad Rauf
info,player,Kolkata Knight Riders,SC Ganguly
info,player,Royal Challengers Bangalore,P Kumar
registry,people,SC Ganguly,ae7b5e84
";

    const DELIVERIES: &str = "\
match_id,season,start_date,venue,innings,ball,batting_team,bowling_team,striker,non_striker,bowler,runs_off_bat,extras,wides,noballs,byes,legbyes,penalty,wicket_type,player_dismissed,other_wicket_type,other_player_dismissed
335982,2007/08,2008-04-18,M Chinnaswamy Stadium,1,0.1,Kolkata Knight Riders,Royal Challengers Bangalore,SC Ganguly,BB McCullum,P Kumar,0,1,,,,1,,,,,
335982,2007/08,2008-04-18,M Chinnaswamy Stadium,1,0.2,Kolkata Knight Riders,Royal Challengers Bangalore,BB McCullum,SC Ganguly,P Kumar,0,0,,,,,,,,,
335982,2007/08,2008-04-18,M Chinnaswamy Stadium,2,0.1,Royal Challengers Bangalore,Kolkata Knight Riders,R Dravid,W Jaffer,AB Dinda,4,0,,,,,,,,,
335982,2007/08,2008-04-18,M Chinnaswamy Stadium,2,0.2,Royal Challengers Bangalore,Kolkata Knight Riders,R Dravid,W Jaffer,AB Dinda,0,0,,,,,,caught,R Dravid,,
";

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_decode_team_and_player() {
        let id = MatchId::new(MATCH);
        let team = decode_info_record(&id, &record(&["info", "team", "KKR"]))
            .unwrap()
            .unwrap();
        assert_eq!(
            team.payload,
            EventPayload::Info {
                entry: InfoEntry::Team { name: "KKR".into() }
            }
        );

        let player = decode_info_record(&id, &record(&["info", "player", "KKR", " SC Ganguly "]))
            .unwrap()
            .unwrap();
        assert_eq!(
            player.payload,
            EventPayload::Info {
                entry: InfoEntry::Player {
                    team: "KKR".into(),
                    name: PlayerName::new("SC Ganguly"),
                }
            }
        );
    }

    #[test]
    fn test_player_row_without_name() {
        let id = MatchId::new(MATCH);
        let err = decode_info_record(&id, &record(&["info", "player", "KKR"])).unwrap_err();
        assert_eq!(
            err,
            FeedError::MissingField {
                field: "player".to_string()
            }
        );
    }

    #[test]
    fn test_skipped_and_unknown_records() {
        let id = MatchId::new(MATCH);
        assert!(decode_info_record(&id, &record(&["version", "1.3.0"]))
            .unwrap()
            .is_none());
        assert!(decode_info_record(&id, &record(&["registry", "people", "X", "1"]))
            .unwrap()
            .is_none());
        assert!(matches!(
            decode_info_record(&id, &record(&["scores", "x"])),
            Err(FeedError::UnknownRecord { .. })
        ));
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(
            parse_date("2008/04/18").unwrap(),
            NaiveDate::from_ymd_opt(2008, 4, 18).unwrap()
        );
        assert_eq!(
            parse_date("2008-04-18").unwrap(),
            NaiveDate::from_ymd_opt(2008, 4, 18).unwrap()
        );
        assert!(matches!(
            parse_date("18 April"),
            Err(FeedError::MalformedField { .. })
        ));
    }

    #[test]
    fn test_malformed_balls_per_over() {
        let id = MatchId::new(MATCH);
        let err = decode_info_record(&id, &record(&["info", "balls_per_over", "six"])).unwrap_err();
        assert_eq!(
            err,
            FeedError::MalformedField {
                field: "balls_per_over".to_string(),
                value: "six".to_string()
            }
        );
    }

    #[test]
    fn test_read_info() {
        let id = MatchId::new(MATCH);
        let events = read_info(&id, INFO.as_bytes()).unwrap();

        assert_eq!(events.len(), 10);
        assert!(events.iter().all(|e| e.is_setup() && e.match_id == id));
        assert!(events.contains(&MatchEvent::info(
            id.clone(),
            InfoEntry::Venue("M Chinnaswamy Stadium, Bangalore".into())
        )));
        assert!(events.contains(&MatchEvent::info(
            id.clone(),
            InfoEntry::Other {
                key: "season".into(),
                value: "2007/08".into()
            }
        )));
    }

    #[test]
    fn test_read_info_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("335982_info.csv");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(INFO.as_bytes())
            .unwrap();

        let id = match_id_from_info_path(&path).unwrap();
        assert_eq!(id, MatchId::new(MATCH));
        assert_eq!(read_info_file(&id, &path).unwrap().len(), 10);
    }

    #[test]
    fn test_missing_info_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_info_file(&MatchId::new(MATCH), &dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, FeedError::Csv { .. }));
    }

    #[test]
    fn test_delivery_row_into_event() {
        let row = DeliveryRow {
            match_id: MATCH.to_string(),
            innings: "1".to_string(),
            ball: "0.1".to_string(),
            batting_team: "KKR".to_string(),
            striker: "SC Ganguly".to_string(),
            non_striker: "BB McCullum".to_string(),
            bowler: "P Kumar".to_string(),
            runs_off_bat: "0".to_string(),
            legbyes: "1".to_string(),
            ..DeliveryRow::default()
        };

        let event = row.into_event().unwrap();
        let delivery = match event.payload {
            EventPayload::Delivery(delivery) => delivery,
            other => panic!("Expected Delivery, got {:?}", other),
        };
        assert_eq!(delivery.innings, Some(1));
        assert_eq!(delivery.runs_off_bat, Some(0));
        assert_eq!(delivery.extras.legbyes, Some(1));
        assert_eq!(delivery.extras.wides, None);
        assert_eq!(delivery.batting_team.as_deref(), Some("KKR"));
        assert_eq!(
            delivery.participants,
            Some(Participants::new("SC Ganguly", "BB McCullum", "P Kumar"))
        );
    }

    #[test]
    fn test_delivery_row_malformed_count() {
        let row = DeliveryRow {
            match_id: MATCH.to_string(),
            runs_off_bat: "four".to_string(),
            ..DeliveryRow::default()
        };
        assert_eq!(
            row.into_event().unwrap_err(),
            FeedError::MalformedField {
                field: "runs_off_bat".to_string(),
                value: "four".to_string()
            }
        );
    }

    #[test]
    fn test_delivery_row_partial_participants() {
        let row = DeliveryRow {
            match_id: MATCH.to_string(),
            striker: "SC Ganguly".to_string(),
            bowler: "P Kumar".to_string(),
            ..DeliveryRow::default()
        };
        assert_eq!(
            row.into_event().unwrap_err(),
            FeedError::MissingField {
                field: "non_striker".to_string()
            }
        );
    }

    #[test]
    fn test_delivery_reader_inserts_innings_break() {
        let events: Vec<_> = DeliveryReader::new(DELIVERIES.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();

        let labels: Vec<_> = events.iter().map(|e| e.event_type_label()).collect();
        assert_eq!(
            labels,
            vec!["Delivery", "Delivery", "InningsBreak", "Delivery", "Delivery"]
        );

        match &events[4].payload {
            EventPayload::Delivery(delivery) => {
                assert!(delivery.has_wicket());
                assert_eq!(delivery.innings, Some(2));
            }
            other => panic!("Expected Delivery, got {:?}", other),
        }
    }

    #[test]
    fn test_delivery_reader_no_break_across_matches() {
        let csv = "\
match_id,innings,ball,striker,non_striker,bowler,runs_off_bat
1,2,0.1,A,B,C,1
2,1,0.1,D,E,F,0
2,1,0.2,D,E,F,0
";
        let labels: Vec<_> = DeliveryReader::new(csv.as_bytes())
            .map(|e| e.unwrap().event_type_label())
            .collect();
        assert_eq!(labels, vec!["Delivery"; 3]);
    }

    #[test]
    fn test_delivery_reader_interleaved_matches() {
        let csv = "\
match_id,innings,ball,striker,non_striker,bowler,runs_off_bat
1,1,0.1,A,B,C,1
2,1,0.1,D,E,F,0
1,2,0.1,C,G,A,4
2,1,0.2,D,E,F,0
2,2,0.1,F,H,D,0
";
        let labels: Vec<_> = DeliveryReader::new(csv.as_bytes())
            .map(|e| {
                let e = e.unwrap();
                format!("{}:{}", e.match_id, e.event_type_label())
            })
            .collect();
        assert_eq!(
            labels,
            vec![
                "1:Delivery",
                "2:Delivery",
                "1:InningsBreak",
                "1:Delivery",
                "2:Delivery",
                "2:InningsBreak",
                "2:Delivery",
            ]
        );
    }

    #[test]
    fn test_delivery_reader_reports_bad_row_and_continues() {
        let csv = "\
match_id,innings,ball,striker,non_striker,bowler,runs_off_bat
1,1,0.1,A,B,C,x
1,1,0.2,A,B,C,2
";
        let results: Vec<_> = DeliveryReader::new(csv.as_bytes()).collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(FeedError::MalformedField { .. })));
        assert!(results[1].is_ok());
    }
}
