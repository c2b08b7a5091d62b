use crate::core::{MapView, OutputFormat, RenderedFile, Vehicle};
use crate::utils::error::{BoardError, Result};
use serde_json::{json, Value};

pub const CSV_HEADER: [&str; 8] = [
    "id",
    "name",
    "model",
    "year",
    "color",
    "price",
    "latitude",
    "longitude",
];

/// One text card per vehicle, separated by blank lines.
pub fn render_cards(vehicles: &[Vehicle]) -> String {
    let cards: Vec<String> = vehicles.iter().map(render_card).collect();
    let mut out = cards.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

pub fn render_card(vehicle: &Vehicle) -> String {
    format!(
        "{}\n  Model: {}\n  Year: {}\n  Color: {}\n  Price: {}\n",
        vehicle.name, vehicle.model, vehicle.year, vehicle.color, vehicle.price
    )
}

pub fn render_csv(vehicles: &[Vehicle]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for v in vehicles {
        writer.write_record([
            v.id.to_string(),
            v.name.clone(),
            v.model.clone(),
            v.year.to_string(),
            v.color.clone(),
            v.price.to_string(),
            v.latitude.to_string(),
            v.longitude.to_string(),
        ])?;
    }

    let data = writer.into_inner().map_err(|e| BoardError::IoError(e.into_error()))?;
    String::from_utf8(data).map_err(|e| BoardError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

pub fn render_json(vehicles: &[Vehicle]) -> Result<String> {
    Ok(serde_json::to_string_pretty(vehicles)?)
}

/// GeoJSON overlay: one point per vehicle, popup fields as properties, viewport under `view`.
pub fn map_overlay(vehicles: &[Vehicle], view: &MapView) -> Value {
    let features: Vec<Value> = vehicles
        .iter()
        .map(|v| {
            json!({
                "type": "Feature",
                "id": v.id,
                "geometry": {
                    "type": "Point",
                    // GeoJSON 座標順序為 [經度, 緯度]
                    "coordinates": [v.longitude, v.latitude],
                },
                "properties": {
                    "id": v.id,
                    "name": v.name,
                    "model": v.model,
                    "year": v.year,
                    "color": v.color,
                    "price": v.price,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "view": {
            "center": view.center,
            "zoom": view.zoom,
            "tile_url": view.tile_url,
        },
        "features": features,
    })
}

pub fn render(vehicles: &[Vehicle], format: OutputFormat, view: &MapView) -> Result<RenderedFile> {
    let contents = match format {
        OutputFormat::Cards => render_cards(vehicles),
        OutputFormat::Csv => render_csv(vehicles)?,
        OutputFormat::Json => render_json(vehicles)?,
        OutputFormat::Geojson => serde_json::to_string_pretty(&map_overlay(vehicles, view))?,
    };

    Ok(RenderedFile {
        name: format.file_name().to_string(),
        contents: contents.into_bytes(),
    })
}

pub fn render_all(
    vehicles: &[Vehicle],
    formats: &[OutputFormat],
    view: &MapView,
) -> Result<Vec<RenderedFile>> {
    formats
        .iter()
        .map(|format| render(vehicles, *format, view))
        .collect()
}
