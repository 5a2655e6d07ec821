use crate::coords::LonLat;

/// Degrees between graticule lines.
const STEP_DEG: f64 = 10.0;
/// Degrees between sample points along a line.
const SAMPLE_DEG: f64 = 2.5;
/// Meridians stop short of the poles, matching the usual 10-degree
/// graticule convention.
const LAT_LIMIT_DEG: f64 = 80.0;

/// Latitude/longitude grid as polylines ready for projection.
pub fn graticule() -> Vec<Vec<LonLat>> {
    let mut lines = Vec::new();

    // Meridians every 10 degrees, sampled pole-ward to +/-80.
    let mut lon = -180.0;
    while lon < 180.0 - 1e-9 {
        let mut line = Vec::new();
        let mut lat = -LAT_LIMIT_DEG;
        while lat <= LAT_LIMIT_DEG + 1e-9 {
            line.push(LonLat::new(lon, lat));
            lat += SAMPLE_DEG;
        }
        lines.push(line);
        lon += STEP_DEG;
    }

    // Parallels every 10 degrees between +/-80.
    let mut lat = -LAT_LIMIT_DEG;
    while lat <= LAT_LIMIT_DEG + 1e-9 {
        let mut line = Vec::new();
        let mut lon = -180.0;
        while lon <= 180.0 + 1e-9 {
            line.push(LonLat::new(lon, lat));
            lon += SAMPLE_DEG;
        }
        lines.push(line);
        lat += STEP_DEG;
    }

    lines
}
