use crate::utils::error::BoardError;
use crate::utils::validation::validate_range;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One automobile as returned by the vehicle service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: u64,
    pub name: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
}

pub const LATITUDE_BOUNDS: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_BOUNDS: (f64, f64) = (-180.0, 180.0);

/// Keys accepted in an edit command.
pub const EDITABLE_FIELDS: [&str; 7] = [
    "name",
    "model",
    "year",
    "color",
    "price",
    "latitude",
    "longitude",
];

/// Partial edit of a vehicle. `None` fields are left untouched; the id is never editable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl VehiclePatch {
    pub fn is_empty(&self) -> bool {
        *self == VehiclePatch::default()
    }

    /// Merge this patch into `vehicle`.
    pub fn apply_to(&self, vehicle: &mut Vehicle) {
        if let Some(name) = &self.name {
            vehicle.name = name.clone();
        }
        if let Some(model) = &self.model {
            vehicle.model = model.clone();
        }
        if let Some(year) = self.year {
            vehicle.year = year;
        }
        if let Some(color) = &self.color {
            vehicle.color = color.clone();
        }
        if let Some(price) = self.price {
            vehicle.price = price;
        }
        if let Some(latitude) = self.latitude {
            vehicle.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            vehicle.longitude = longitude;
        }
    }

    /// Set one field from its textual form, e.g. `("price", "12500")`.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), String> {
        fn number<T: FromStr>(key: &str, value: &str) -> Result<T, String> {
            value
                .trim()
                .parse()
                .map_err(|_| format!("'{}' expects a number, got '{}'", key, value))
        }

        // NaN 與無窮大無法寫成 JSON
        fn bounded(key: &str, value: &str, (min, max): (f64, f64)) -> Result<f64, String> {
            let n: f64 = number(key, value)?;
            validate_range(key, n, min, max).map_err(|e| e.to_string())?;
            Ok(n)
        }

        let key = key.trim();
        match key {
            "name" => self.name = Some(value.to_string()),
            "model" => self.model = Some(value.to_string()),
            "color" => self.color = Some(value.to_string()),
            "year" => self.year = Some(number(key, value)?),
            "price" => self.price = Some(bounded(key, value, (f64::MIN, f64::MAX))?),
            "latitude" => self.latitude = Some(bounded(key, value, LATITUDE_BOUNDS)?),
            "longitude" => self.longitude = Some(bounded(key, value, LONGITUDE_BOUNDS)?),
            "id" => return Err("the vehicle id cannot be edited".to_string()),
            other => return Err(format!("unknown vehicle field '{}'", other)),
        }
        Ok(())
    }
}

/// Fields the board can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Year,
    Price,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Year => "year",
            SortField::Price => "price",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(SortField::Year),
            "price" => Ok(SortField::Price),
            other => Err(BoardError::InvalidCommandError {
                input: s.to_string(),
                reason: format!("cannot sort by '{}', expected year or price", other),
            }),
        }
    }
}

/// Map viewport the overlay is meant to be shown in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// `[latitude, longitude]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub tile_url: String,
}

pub const DEFAULT_MAP_CENTER: [f64; 2] = [55.753215, 37.620393];
pub const DEFAULT_MAP_ZOOM: u8 = 10;
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_MAP_CENTER,
            zoom: DEFAULT_MAP_ZOOM,
            tile_url: DEFAULT_TILE_URL.to_string(),
        }
    }
}

/// Renderings the board can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Cards,
    Csv,
    Json,
    Geojson,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Cards,
        OutputFormat::Csv,
        OutputFormat::Json,
        OutputFormat::Geojson,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Cards => "cards",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Geojson => "geojson",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            OutputFormat::Cards => "vehicles.txt",
            OutputFormat::Csv => "vehicles.csv",
            OutputFormat::Json => "vehicles.json",
            OutputFormat::Geojson => "map.geojson",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BoardError::InvalidConfigValueError {
                field: "output_formats".to_string(),
                value: s.to_string(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    OutputFormat::ALL.map(|f| f.as_str()).join(", ")
                ),
            })
    }
}

/// One user action against the board.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardCommand {
    Sort(SortField),
    Edit { id: u64, patch: VehiclePatch },
    Delete { id: u64 },
}

/// True when `rest` begins with `<field>=`, i.e. a comma before it starts a new assignment.
fn starts_assignment(rest: &str) -> bool {
    rest.split_once('=').is_some_and(|(key, _)| {
        let key = key.trim();
        key == "id" || EDITABLE_FIELDS.contains(&key)
    })
}

/// Splits `k=v,k=v` on commas that are unescaped and followed by another `<field>=`,
/// so values such as `Lada, Niva` stay whole.
fn split_assignments(raw: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in raw.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            ',' if starts_assignment(&raw[i + 1..]) => {
                segments.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&raw[start..]);
    segments
}

fn unescape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(chars.next().unwrap_or('\\'));
        } else {
            out.push(c);
        }
    }
    out
}

fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace(',', "\\,")
}

fn parse_id(input: &str, raw: &str) -> Result<u64, BoardError> {
    raw.trim()
        .parse()
        .map_err(|_| BoardError::InvalidCommandError {
            input: input.to_string(),
            reason: format!("'{}' is not a vehicle id", raw),
        })
}

impl FromStr for BoardCommand {
    type Err = BoardError;

    /// Parses `sort:<field>`, `edit:<id>:<key>=<value>[,...]` and `delete:<id>`.
    /// In edit values `\,` is a literal comma and `\\` a literal backslash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| BoardError::InvalidCommandError {
            input: s.to_string(),
            reason,
        };

        let mut parts = s.trim().splitn(3, ':');
        let action = parts.next().unwrap_or_default().trim().to_ascii_lowercase();

        match action.as_str() {
            "sort" => {
                let field = parts
                    .next()
                    .ok_or_else(|| invalid("missing sort field".to_string()))?;
                if parts.next().is_some() {
                    return Err(invalid("sort takes a single field".to_string()));
                }
                field.parse::<SortField>().map(BoardCommand::Sort).map_err(|e| match e {
                    BoardError::InvalidCommandError { reason, .. } => invalid(reason),
                    other => other,
                })
            }
            "delete" => {
                let raw_id = parts
                    .next()
                    .ok_or_else(|| invalid("missing vehicle id".to_string()))?;
                if parts.next().is_some() {
                    return Err(invalid("delete takes a single id".to_string()));
                }
                Ok(BoardCommand::Delete {
                    id: parse_id(s, raw_id)?,
                })
            }
            "edit" => {
                let raw_id = parts
                    .next()
                    .ok_or_else(|| invalid("missing vehicle id".to_string()))?;
                let id = parse_id(s, raw_id)?;
                let assignments = parts
                    .next()
                    .ok_or_else(|| invalid("missing field assignments".to_string()))?;

                let mut patch = VehiclePatch::default();
                for assignment in split_assignments(assignments)
                    .into_iter()
                    .filter(|a| !a.trim().is_empty())
                {
                    let (key, value) = assignment
                        .split_once('=')
                        .ok_or_else(|| invalid(format!("'{}' is not key=value", assignment)))?;
                    patch
                        .set_field(key, &unescape_value(value))
                        .map_err(invalid)?;
                }

                if patch.is_empty() {
                    return Err(invalid("no fields to change".to_string()));
                }
                Ok(BoardCommand::Edit { id, patch })
            }
            "" => Err(invalid("empty command".to_string())),
            other => Err(invalid(format!("unknown action '{}'", other))),
        }
    }
}

impl fmt::Display for BoardCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardCommand::Sort(field) => write!(f, "sort:{}", field),
            BoardCommand::Delete { id } => write!(f, "delete:{}", id),
            BoardCommand::Edit { id, patch } => {
                let mut fields = Vec::new();
                if let Some(v) = &patch.name {
                    fields.push(format!("name={}", escape_value(v)));
                }
                if let Some(v) = &patch.model {
                    fields.push(format!("model={}", escape_value(v)));
                }
                if let Some(v) = patch.year {
                    fields.push(format!("year={}", v));
                }
                if let Some(v) = &patch.color {
                    fields.push(format!("color={}", escape_value(v)));
                }
                if let Some(v) = patch.price {
                    fields.push(format!("price={}", v));
                }
                if let Some(v) = patch.latitude {
                    fields.push(format!("latitude={}", v));
                }
                if let Some(v) = patch.longitude {
                    fields.push(format!("longitude={}", v));
                }
                write!(f, "edit:{}:{}", id, fields.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vehicle {
        Vehicle {
            id: 7,
            name: "Toyota".to_string(),
            model: "Camry".to_string(),
            year: 2021,
            color: "red".to_string(),
            price: 21000.0,
            latitude: 55.75,
            longitude: 37.62,
        }
    }

    #[test]
    fn test_vehicle_deserializes_integer_price() {
        let json = r#"{"id":1,"name":"Toyota","model":"Camry","year":2021,"color":"red","price":21000,"latitude":55.753215,"longitude":37.620393}"#;
        let vehicle: Vehicle = serde_json::from_str(json).unwrap();
        assert_eq!(vehicle.price, 21000.0);
        assert_eq!(vehicle.year, 2021);
    }

    #[test]
    fn test_patch_only_touches_set_fields() {
        let mut vehicle = sample();
        let patch = VehiclePatch {
            name: Some("Lexus".to_string()),
            price: Some(35000.0),
            ..Default::default()
        };
        patch.apply_to(&mut vehicle);

        assert_eq!(vehicle.name, "Lexus");
        assert_eq!(vehicle.price, 35000.0);
        assert_eq!(vehicle.model, "Camry");
        assert_eq!(vehicle.id, 7);
    }

    #[test]
    fn test_parse_sort_command() {
        assert_eq!(
            "sort:year".parse::<BoardCommand>().unwrap(),
            BoardCommand::Sort(SortField::Year)
        );
        assert_eq!(
            "SORT:Price".parse::<BoardCommand>().unwrap(),
            BoardCommand::Sort(SortField::Price)
        );
        assert!("sort:color".parse::<BoardCommand>().is_err());
        assert!("sort".parse::<BoardCommand>().is_err());
    }

    #[test]
    fn test_parse_edit_command() {
        let command: BoardCommand = "edit:3:name=Lada,price=9999.5".parse().unwrap();
        match command {
            BoardCommand::Edit { id, patch } => {
                assert_eq!(id, 3);
                assert_eq!(patch.name.as_deref(), Some("Lada"));
                assert_eq!(patch.price, Some(9999.5));
                assert!(patch.model.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_edit_rejects_bad_input() {
        assert!("edit:3:price=cheap".parse::<BoardCommand>().is_err());
        assert!("edit:3:id=4".parse::<BoardCommand>().is_err());
        assert!("edit:3:wheels=4".parse::<BoardCommand>().is_err());
        assert!("edit:3:".parse::<BoardCommand>().is_err());
        assert!("edit:x:name=A".parse::<BoardCommand>().is_err());
    }

    #[test]
    fn test_parse_delete_command() {
        assert_eq!(
            "delete:12".parse::<BoardCommand>().unwrap(),
            BoardCommand::Delete { id: 12 }
        );
        assert!("delete:".parse::<BoardCommand>().is_err());
        assert!("remove:12".parse::<BoardCommand>().is_err());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("GeoJSON".parse::<OutputFormat>().unwrap(), OutputFormat::Geojson);
        assert_eq!(OutputFormat::Cards.file_name(), "vehicles.txt");
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_parse_edit_rejects_non_finite_and_out_of_range_numbers() {
        for input in [
            "edit:1:price=NaN",
            "edit:1:price=inf",
            "edit:1:price=-inf",
            "edit:1:latitude=inf",
            "edit:1:latitude=1000",
            "edit:1:latitude=-90.5",
            "edit:1:longitude=NaN",
            "edit:1:longitude=180.01",
        ] {
            let result = input.parse::<BoardCommand>();
            assert!(
                matches!(result, Err(BoardError::InvalidCommandError { .. })),
                "{} should be rejected",
                input
            );
        }

        assert!("edit:1:latitude=-33.8,longitude=-70.6".parse::<BoardCommand>().is_ok());
        assert!("edit:1:latitude=90,longitude=-180".parse::<BoardCommand>().is_ok());
    }

    #[test]
    fn test_edited_vehicle_still_serializes_to_valid_json() {
        let command: BoardCommand = "edit:7:price=1e308,latitude=-89.9".parse().unwrap();
        let mut vehicle = sample();
        if let BoardCommand::Edit { patch, .. } = &command {
            patch.apply_to(&mut vehicle);
        }

        let json = serde_json::to_string(&vehicle).unwrap();
        let decoded: Vehicle = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, vehicle);
    }

    #[test]
    fn test_parse_edit_keeps_commas_inside_values() {
        let command: BoardCommand = "edit:1:name=Lada, Niva".parse().unwrap();
        match &command {
            BoardCommand::Edit { patch, .. } => {
                assert_eq!(patch.name.as_deref(), Some("Lada, Niva"));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let command: BoardCommand = "edit:1:name=Lada, Niva,color=sand, matte,price=4500"
            .parse()
            .unwrap();
        match &command {
            BoardCommand::Edit { patch, .. } => {
                assert_eq!(patch.name.as_deref(), Some("Lada, Niva"));
                assert_eq!(patch.color.as_deref(), Some("sand, matte"));
                assert_eq!(patch.price, Some(4500.0));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_edit_escaped_comma() {
        let command: BoardCommand = r"edit:2:name=Ford\, price=3 edition".parse().unwrap();
        match &command {
            BoardCommand::Edit { patch, .. } => {
                assert_eq!(patch.name.as_deref(), Some("Ford, price=3 edition"));
                assert!(patch.price.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }

        // 跳脫的反斜線後面的逗號仍然分隔欄位
        let command: BoardCommand = r"edit:2:model=A\\,price=3".parse().unwrap();
        match &command {
            BoardCommand::Edit { patch, .. } => {
                assert_eq!(patch.model.as_deref(), Some(r"A\"));
                assert_eq!(patch.price, Some(3.0));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_edit_display_round_trips_text_with_commas() {
        let patch = VehiclePatch {
            name: Some("Lada, Niva".to_string()),
            model: Some(r"4x4\ Urban".to_string()),
            color: Some("sand, price=1".to_string()),
            price: Some(9999.5),
            ..Default::default()
        };
        let command = BoardCommand::Edit { id: 1, patch };

        let reparsed: BoardCommand = command.to_string().parse().unwrap();
        assert_eq!(reparsed, command);

        let command: BoardCommand = "edit:1:name=Lada, Niva".parse().unwrap();
        assert_eq!(command.to_string(), r"edit:1:name=Lada\, Niva");
        assert_eq!(command.to_string().parse::<BoardCommand>().unwrap(), command);
    }

    #[test]
    fn test_command_display_parses_back() {
        let command: BoardCommand = "edit:5:model=X5,year=2019".parse().unwrap();
        assert_eq!(command.to_string(), "edit:5:model=X5,year=2019");
        assert_eq!(command.to_string().parse::<BoardCommand>().unwrap(), command);
    }
}
