use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Shown when a CSV row has no date or location.
pub const TBD: &str = "TBD";

/// One candidate event. Read-only once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub name: String,
    pub description: String,
    pub date: String,
    pub location: String,
}

#[derive(Debug, Deserialize)]
struct EventRow {
    #[serde(rename = "Event Name")]
    name: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Date", default)]
    date: Option<String>,
    #[serde(rename = "Location", default)]
    location: Option<String>,
}

impl From<EventRow> for EventRecord {
    fn from(row: EventRow) -> Self {
        let or_tbd = |v: Option<String>| v.filter(|s| !s.is_empty()).unwrap_or_else(|| TBD.to_string());
        Self {
            name: row.name,
            description: row.description,
            date: or_tbd(row.date),
            location: or_tbd(row.location),
        }
    }
}

/// Parses an events table with the columns `Event Name`, `Description`, and optionally
/// `Date` and `Location`. Extra columns are ignored.
pub fn parse_events_csv(data: &[u8]) -> Result<Vec<EventRecord>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Validation(format!("Error reading CSV file: {e}")))?
        .clone();
    for required in ["Event Name", "Description"] {
        if !headers.iter().any(|h| h == required) {
            return Err(AppError::Validation(format!(
                "Error reading CSV file: missing column '{required}'"
            )));
        }
    }

    reader
        .deserialize::<EventRow>()
        .enumerate()
        .map(|(i, row)| {
            row.map(EventRecord::from).map_err(|e| {
                AppError::Validation(format!("Error reading CSV file: row {}: {e}", i + 1))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_rows() {
        let csv = "Event Name,Description,Date,Location\n\
                   Leadership 101,Intro to leading teams,2025-05-01,HQ Room 2\n\
                   Yoga Break,Stretching session,2025-05-02,Gym\n";
        let events = parse_events_csv(csv.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "Leadership 101");
        assert_eq!(events[0].location, "HQ Room 2");
        assert_eq!(events[1].date, "2025-05-02");
    }

    #[test]
    fn test_missing_optional_columns_default_to_tbd() {
        let csv = "Event Name,Description\nExcel Basics,Spreadsheet skills\n";
        let events = parse_events_csv(csv.as_bytes()).unwrap();
        assert_eq!(events[0].date, TBD);
        assert_eq!(events[0].location, TBD);
    }

    #[test]
    fn test_empty_optional_cells_default_to_tbd() {
        let csv = "Event Name,Description,Date,Location\nExcel Basics,Spreadsheets, ,\n";
        let events = parse_events_csv(csv.as_bytes()).unwrap();
        assert_eq!(events[0].date, TBD);
        assert_eq!(events[0].location, TBD);
    }

    #[test]
    fn test_missing_required_column_is_rejected() {
        let csv = "Name,Description\nExcel Basics,Spreadsheets\n";
        let err = parse_events_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("Event Name")));
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let csv = "Event Name,Description\nOnly one field\n";
        assert!(parse_events_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv = "Event Name,Host,Description\nMentoring Lunch,HR,Meet a mentor\n";
        let events = parse_events_csv(csv.as_bytes()).unwrap();
        assert_eq!(events[0].description, "Meet a mentor");
    }
}
