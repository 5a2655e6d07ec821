use geo::LonLat;
use serde::Deserialize;
use serde_json::Value;

use crate::{AtlasError, Country, WorldGeometry};

/// TopoJSON quantization transform.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

/// Decode a TopoJSON topology into named country polygons.
///
/// Expects the world-atlas layout: a `Topology` with delta-encoded arcs
/// (quantized when a `transform` is present) and a `countries` geometry
/// collection whose features carry a `properties.name`.
pub fn decode_topology(payload: &str) -> Result<WorldGeometry, AtlasError> {
    let value: Value = serde_json::from_str(payload).map_err(|e| AtlasError::Json(e.to_string()))?;
    decode_topology_value(&value)
}

pub fn decode_topology_value(value: &Value) -> Result<WorldGeometry, AtlasError> {
    let obj = value.as_object().ok_or(AtlasError::NotATopology)?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(AtlasError::NotATopology)?;
    if ty != "Topology" {
        return Err(AtlasError::NotATopology);
    }

    let transform = match obj.get("transform") {
        Some(t) => Some(
            serde_json::from_value::<Transform>(t.clone())
                .map_err(|e| AtlasError::Json(e.to_string()))?,
        ),
        None => None,
    };

    let arcs_val = obj
        .get("arcs")
        .and_then(|v| v.as_array())
        .ok_or(AtlasError::NotATopology)?;
    let mut arcs = Vec::with_capacity(arcs_val.len());
    for (index, arc_val) in arcs_val.iter().enumerate() {
        arcs.push(decode_arc(arc_val, transform).map_err(|reason| AtlasError::InvalidArc {
            index,
            reason,
        })?);
    }

    let objects = obj
        .get("objects")
        .and_then(|v| v.as_object())
        .ok_or(AtlasError::NotATopology)?;
    // world-atlas keys the collection "countries"; tolerate a topology
    // with a single differently-named collection.
    let countries_obj = objects
        .get("countries")
        .or_else(|| objects.values().next())
        .and_then(|v| v.as_object())
        .ok_or(AtlasError::MissingCountries)?;
    let geometries = countries_obj
        .get("geometries")
        .and_then(|v| v.as_array())
        .ok_or(AtlasError::MissingCountries)?;

    let mut countries = Vec::with_capacity(geometries.len());
    for (index, geom_val) in geometries.iter().enumerate() {
        let geom = geom_val
            .as_object()
            .ok_or_else(|| AtlasError::InvalidGeometry {
                index,
                reason: "geometry must be an object".to_string(),
            })?;
        let gty = geom.get("type").and_then(|v| v.as_str()).ok_or_else(|| {
            AtlasError::InvalidGeometry {
                index,
                reason: "geometry missing type".to_string(),
            }
        })?;

        let name = geom
            .get("properties")
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or_default()
            .to_string();

        let arc_lists = geom.get("arcs").ok_or_else(|| AtlasError::InvalidGeometry {
            index,
            reason: "geometry missing arcs".to_string(),
        })?;

        let rings = match gty {
            "Polygon" => polygon_rings(arc_lists, &arcs)
                .map_err(|reason| AtlasError::InvalidGeometry { index, reason })?,
            "MultiPolygon" => {
                let polys = arc_lists
                    .as_array()
                    .ok_or_else(|| AtlasError::InvalidGeometry {
                        index,
                        reason: "MultiPolygon arcs must be an array".to_string(),
                    })?;
                let mut rings = Vec::new();
                for poly in polys {
                    rings.extend(
                        polygon_rings(poly, &arcs)
                            .map_err(|reason| AtlasError::InvalidGeometry { index, reason })?,
                    );
                }
                rings
            }
            other => {
                return Err(AtlasError::InvalidGeometry {
                    index,
                    reason: format!("unsupported geometry type: {other}"),
                });
            }
        };

        countries.push(Country::new(name, rings));
    }

    Ok(WorldGeometry { countries })
}

/// One arc: delta-decode, then de-quantize when a transform is present.
fn decode_arc(arc_val: &Value, transform: Option<Transform>) -> Result<Vec<LonLat>, String> {
    let points = arc_val.as_array().ok_or("arc must be an array")?;
    let mut out = Vec::with_capacity(points.len());
    let mut x = 0.0;
    let mut y = 0.0;
    for point in points {
        let pair = point.as_array().ok_or("arc position must be an array")?;
        if pair.len() < 2 {
            return Err("arc position needs two components".to_string());
        }
        let px = pair[0].as_f64().ok_or("arc position must be numeric")?;
        let py = pair[1].as_f64().ok_or("arc position must be numeric")?;
        match transform {
            Some(t) => {
                x += px;
                y += py;
                out.push(LonLat::new(
                    x * t.scale[0] + t.translate[0],
                    y * t.scale[1] + t.translate[1],
                ));
            }
            None => out.push(LonLat::new(px, py)),
        }
    }
    Ok(out)
}

fn polygon_rings(arc_lists: &Value, arcs: &[Vec<LonLat>]) -> Result<Vec<Vec<LonLat>>, String> {
    let lists = arc_lists.as_array().ok_or("Polygon arcs must be an array")?;
    let mut rings = Vec::with_capacity(lists.len());
    for list in lists {
        let ids = list.as_array().ok_or("ring must be an array of arc ids")?;
        rings.push(stitch_ring(ids, arcs)?);
    }
    Ok(rings)
}

/// Join arc segments into one closed ring. A negative id `~k` selects
/// arc `k` reversed; consecutive arcs share their junction point, which
/// is emitted only once.
fn stitch_ring(ids: &[Value], arcs: &[Vec<LonLat>]) -> Result<Vec<LonLat>, String> {
    let mut ring: Vec<LonLat> = Vec::new();
    for id_val in ids {
        let id = id_val.as_i64().ok_or("arc id must be an integer")?;
        let (index, reversed) = if id < 0 {
            ((-1 - id) as usize, true)
        } else {
            (id as usize, false)
        };
        let arc = arcs
            .get(index)
            .ok_or_else(|| format!("arc id {index} out of range"))?;

        let append = |ring: &mut Vec<LonLat>, p: LonLat| {
            if ring.last() != Some(&p) {
                ring.push(p);
            }
        };
        if reversed {
            for p in arc.iter().rev() {
                append(&mut ring, *p);
            }
        } else {
            for p in arc {
                append(&mut ring, *p);
            }
        }
    }
    if ring.len() < 4 {
        return Err(format!("ring has too few points ({})", ring.len()));
    }
    Ok(ring)
}
