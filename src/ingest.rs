//! CSV ingestion boundary.
//!
//! Maps loosely formatted CSV exports (mixed header casing, alternative
//! column names, blank cells) into the typed records of [`crate::model`].
//! Nothing past this module looks at raw strings except timestamps.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::IngestError;
use crate::model::{Dataset, Location, LocationRelation, Route, Segment, Vehicle};

pub const VEHICLE_FILES: &[&str] = &["Vehicles.csv", "vehicles.csv"];
pub const LOCATION_FILES: &[&str] = &["Locations.csv", "locations.csv", "Location.csv", "location.csv"];
pub const RELATION_FILES: &[&str] = &[
    "Locations_relations.csv",
    "locations_relations.csv",
    "Location_relations.csv",
    "location_relations.csv",
];
pub const ROUTE_FILES: &[&str] = &["Routes.csv", "routes.csv"];
pub const SEGMENT_FILES: &[&str] = &["Segments.csv", "segments.csv"];

/// Load all five tables from `dir`. The relations table may be absent.
pub fn load_dataset(dir: impl AsRef<Path>) -> Result<Dataset, IngestError> {
    let dir = dir.as_ref();

    let vehicles = read_required(dir, VEHICLE_FILES, parse_vehicles)?;
    let locations = read_required(dir, LOCATION_FILES, parse_locations)?;
    let relations = match find_file(dir, RELATION_FILES) {
        Some(path) => parse_relations(&file_label(&path), File::open(&path)?)?,
        None => {
            debug!(dir = %dir.display(), "no relations file, continuing without relations");
            Vec::new()
        }
    };
    let routes = read_required(dir, ROUTE_FILES, parse_routes)?;
    let segments = read_required(dir, SEGMENT_FILES, parse_segments)?;

    info!(
        vehicles = vehicles.len(),
        locations = locations.len(),
        relations = relations.len(),
        routes = routes.len(),
        segments = segments.len(),
        "dataset loaded"
    );

    Ok(Dataset {
        vehicles,
        locations,
        relations,
        routes,
        segments,
    })
}

fn read_required<T>(
    dir: &Path,
    candidates: &[&str],
    parse: fn(&str, File) -> Result<Vec<T>, IngestError>,
) -> Result<Vec<T>, IngestError> {
    let path = find_file(dir, candidates).ok_or_else(|| IngestError::MissingFile {
        dir: dir.to_path_buf(),
        candidates: candidates.iter().map(|c| c.to_string()).collect(),
    })?;
    parse(&file_label(&path), File::open(&path)?)
}

fn find_file(dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates.iter().map(|name| dir.join(name)).find(|path| path.is_file())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}

pub fn parse_vehicles(file: &str, reader: impl Read) -> Result<Vec<Vehicle>, IngestError> {
    read_rows(file, reader)?
        .iter()
        .map(|row| {
            Ok(Vehicle {
                id: row.id(&["id"])?,
                registration_number: row.text(&["registration_number", "reg"]).to_string(),
                brand: row.text(&["brand"]).to_string(),
                service_interval_km: row.number(&["service_interval_km"])?,
                leasing_start_km: row.number(&["leasing_start_km"])?,
                leasing_limit_km: row.number(&["leasing_limit_km"])?,
                leasing_start_date: row.text(&["leasing_start_date", "start_date"]).to_string(),
                leasing_end_date: row.text(&["leasing_end_date", "end_date"]).to_string(),
                current_odometer_km: row.number(&["current_odometer_km"])?,
                current_location_id: row.optional_id(&["current_location_id"]),
            })
        })
        .collect()
}

pub fn parse_locations(file: &str, reader: impl Read) -> Result<Vec<Location>, IngestError> {
    read_rows(file, reader)?
        .iter()
        .map(|row| {
            Ok(Location {
                id: row.id(&["id"])?,
                name: row.text(&["name"]).to_string(),
                lat: row.optional_number(&["lat"]),
                lng: row.optional_number(&["long", "lng", "lon"]),
                is_hub: row.flag(&["is_hub"]),
            })
        })
        .collect()
}

pub fn parse_relations(file: &str, reader: impl Read) -> Result<Vec<LocationRelation>, IngestError> {
    read_rows(file, reader)?
        .iter()
        .map(|row| {
            Ok(LocationRelation {
                id: row.optional_id(&["id"]).unwrap_or_default(),
                id_loc_1: row.id(&["id_loc_1"])?,
                id_loc_2: row.id(&["id_loc_2"])?,
                dist: row.lenient_number(&["dist"]),
                time: row.lenient_number(&["time"]),
            })
        })
        .collect()
}

pub fn parse_routes(file: &str, reader: impl Read) -> Result<Vec<Route>, IngestError> {
    read_rows(file, reader)?
        .iter()
        .map(|row| {
            Ok(Route {
                id: row.id(&["id"])?,
                start_datetime: row.optional_text(&["start_datetime", "start"]),
                end_datetime: row.optional_text(&["end_datetime", "end"]),
            })
        })
        .collect()
}

pub fn parse_segments(file: &str, reader: impl Read) -> Result<Vec<Segment>, IngestError> {
    read_rows(file, reader)?
        .iter()
        .map(|row| {
            Ok(Segment {
                id: row.optional_id(&["id"]).unwrap_or_default(),
                route_id: row.id(&["route_id"])?,
                seq: row.number(&["seq"])? as i64,
                start_loc_id: row.optional_id(&["start_loc_id"]),
                end_loc_id: row.optional_id(&["end_loc_id"]),
                start_datetime: row.optional_text(&["start_datetime"]),
                end_datetime: row.optional_text(&["end_datetime"]),
                distance_travelled_km: row.number(&["distance_travelled_km", "dist"])?,
                relation_id: row.optional_id(&["relation_id"]),
            })
        })
        .collect()
}

/// One CSV record keyed by lower-cased header.
#[derive(Debug)]
struct Row<'a> {
    file: &'a str,
    line: u64,
    fields: HashMap<String, String>,
}

fn read_rows<'a>(file: &'a str, reader: impl Read) -> Result<Vec<Row<'a>>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let fields = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(Row { file, line, fields });
    }
    Ok(rows)
}

impl Row<'_> {
    /// First non-empty value among the aliases.
    fn lookup(&self, aliases: &[&'static str]) -> Option<(&'static str, &str)> {
        aliases.iter().find_map(|alias| {
            self.fields
                .get(*alias)
                .map(String::as_str)
                .filter(|value| !value.is_empty())
                .map(|value| (*alias, value))
        })
    }

    fn has_column(&self, aliases: &[&'static str]) -> bool {
        aliases.iter().any(|alias| self.fields.contains_key(*alias))
    }

    fn invalid(&self, field: &str, value: &str) -> IngestError {
        IngestError::InvalidField {
            file: self.file.to_string(),
            line: self.line,
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    fn text(&self, aliases: &[&'static str]) -> &str {
        self.lookup(aliases).map(|(_, value)| value).unwrap_or_default()
    }

    fn optional_text(&self, aliases: &[&'static str]) -> Option<String> {
        self.lookup(aliases).map(|(_, value)| value.to_string())
    }

    fn id(&self, aliases: &[&'static str]) -> Result<u32, IngestError> {
        if !self.has_column(aliases) {
            return Err(IngestError::MissingColumn {
                file: self.file.to_string(),
                column: aliases[0].to_string(),
            });
        }
        let (field, value) = self.lookup(aliases).ok_or_else(|| self.invalid(aliases[0], ""))?;
        parse_id(value).ok_or_else(|| self.invalid(field, value))
    }

    fn optional_id(&self, aliases: &[&'static str]) -> Option<u32> {
        self.lookup(aliases).and_then(|(_, value)| parse_id(value))
    }

    /// Blank or missing is zero; anything else must be a number.
    fn number(&self, aliases: &[&'static str]) -> Result<f64, IngestError> {
        match self.lookup(aliases) {
            None => Ok(0.0),
            Some((field, value)) => value.parse::<f64>().map_err(|_| self.invalid(field, value)),
        }
    }

    /// Unparseable values become NaN and are left to the relation normalizer.
    fn lenient_number(&self, aliases: &[&'static str]) -> f64 {
        match self.lookup(aliases) {
            None => 0.0,
            Some((_, value)) => value.parse().unwrap_or(f64::NAN),
        }
    }

    fn optional_number(&self, aliases: &[&'static str]) -> Option<f64> {
        self.lookup(aliases)
            .and_then(|(_, value)| value.parse::<f64>().ok())
            .filter(|number| number.is_finite())
    }

    fn flag(&self, aliases: &[&'static str]) -> bool {
        matches!(self.lookup(aliases), Some((_, value)) if value == "1" || value.eq_ignore_ascii_case("true"))
    }
}

/// Integer ids, also accepting float renderings such as `12.0`.
fn parse_id(value: &str) -> Option<u32> {
    if let Ok(id) = value.parse::<u32>() {
        return Some(id);
    }
    let number = value.parse::<f64>().ok()?;
    (number.fract() == 0.0 && number >= 0.0 && number <= f64::from(u32::MAX)).then_some(number as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicles_with_mixed_case_headers() {
        let csv = "Id,Registration_Number,BRAND,service_interval_km,leasing_start_km,leasing_limit_km,current_odometer_km,Current_location_id\n\
                   1,WGM 1234A,DAF,120000,0,450000,1500.5,\n\
                   2.0,WGM 9999B,Scania,,10,750000,20,7\n";
        let vehicles = parse_vehicles("Vehicles.csv", csv.as_bytes()).unwrap();

        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[0].registration_number, "WGM 1234A");
        assert_eq!(vehicles[0].current_odometer_km, 1500.5);
        assert_eq!(vehicles[0].current_location_id, None);
        assert_eq!(vehicles[1].id, 2);
        assert_eq!(vehicles[1].service_interval_km, 0.0);
        assert_eq!(vehicles[1].current_location_id, Some(7));
    }

    #[test]
    fn invalid_vehicle_number_is_reported_with_line() {
        let csv = "id,service_interval_km,leasing_limit_km,current_odometer_km\n1,abc,100,0\n";
        let err = parse_vehicles("Vehicles.csv", csv.as_bytes()).unwrap_err();
        match err {
            IngestError::InvalidField { file, line, field, value } => {
                assert_eq!(file, "Vehicles.csv");
                assert_eq!(line, 2);
                assert_eq!(field, "service_interval_km");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_value_names_the_alias_it_came_from() {
        let csv = "route_id,seq,dist\n5,1,twelve\n";
        let err = parse_segments("Segments.csv", csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::InvalidField { ref field, ref value, .. } if field == "dist" && value == "twelve"
        ));
    }

    #[test]
    fn missing_id_column_is_an_error() {
        let csv = "name,lat,long\nWarszawa,52.2,21.0\n";
        assert!(matches!(
            parse_locations("Locations.csv", csv.as_bytes()),
            Err(IngestError::MissingColumn { .. })
        ));
    }

    #[test]
    fn location_aliases_and_flags() {
        let csv = "id,name,lat,lng,is_hub\n1,Warszawa,52.23,21.01,TRUE\n2,Poznań,,16.92,0\n";
        let locations = parse_locations("Locations.csv", csv.as_bytes()).unwrap();

        assert_eq!(locations[0].lng, Some(21.01));
        assert!(locations[0].is_hub);
        assert_eq!(locations[1].lat, None);
        assert!(!locations[1].is_hub);
    }

    #[test]
    fn relations_are_lenient() {
        let csv = "id,id_loc_1,id_loc_2,dist,time\n1,1,2,310.5,n/a\n2,2,3,,4\n";
        let relations = parse_relations("Locations_relations.csv", csv.as_bytes()).unwrap();

        assert_eq!(relations[0].dist, 310.5);
        assert!(relations[0].time.is_nan());
        assert_eq!(relations[1].dist, 0.0);
    }

    #[test]
    fn routes_and_segments() {
        let routes = "id,start,end\n5,2024-01-01 08:00:00,\n";
        let routes = parse_routes("Routes.csv", routes.as_bytes()).unwrap();
        assert_eq!(routes[0].start_datetime.as_deref(), Some("2024-01-01 08:00:00"));
        assert_eq!(routes[0].end_datetime, None);

        let segments = "id,route_id,seq,start_loc_id,end_loc_id,start_datetime,end_datetime,dist\n\
                        1,5,2,3,4,,,12.5\n\n";
        let segments = parse_segments("Segments.csv", segments.as_bytes()).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].seq, 2);
        assert_eq!(segments[0].distance_travelled_km, 12.5);
        assert_eq!(segments[0].start_datetime, None);
    }
}
