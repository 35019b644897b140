//! Point sampler command-line tool.
//!
//! Loads a raster and its georeference (world file or explicit origin),
//! waits for both, then prints one JSON line per queried point:
//!
//! ```text
//! $ sampler landcover.png --world-file landcover.pgw 49.5,10.5 47.9,10.5
//! {"lat":49.5,"lng":10.5,"pixel":[34,139,34,255]}
//! {"error":"out_of_bounds","lat":47.9,"lng":10.5,"pixel":null}
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use georaster::{
    source_from_uri, GeoRaster, GeorefSource, Georeference, LatLng, SampleError, SamplerConfig,
};
use serde_json::{json, Value};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "sampler")]
#[command(about = "Sample georeferenced rasters at lat/lng points")]
struct Args {
    /// Raster path or http(s) URL
    raster: String,

    /// Points to sample, as `lat,lng`
    #[arg(required = true, allow_hyphen_values = true)]
    points: Vec<String>,

    /// World file path or http(s) URL
    #[arg(long, conflicts_with = "origin", required_unless_present = "origin")]
    world_file: Option<String>,

    /// Explicit georeference: origin longitude, origin latitude, pixel size (degrees)
    #[arg(long, num_args = 3, value_names = ["LNG", "LAT", "SIZE"], allow_hyphen_values = true)]
    origin: Option<Vec<f64>>,

    /// YAML sampler configuration
    #[arg(long, env = "SAMPLER_CONFIG")]
    config: Option<PathBuf>,

    /// Load timeout in milliseconds (overrides the configuration file)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let mut config = match &args.config {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            SamplerConfig::from_yaml_str(&text)?
        }
        None => SamplerConfig::default(),
    };
    if let Some(ms) = args.timeout_ms {
        config = config.with_load_timeout(Duration::from_millis(ms));
    }

    let georef = georef_source(args.world_file.as_deref(), args.origin.as_deref())?;
    let points = args
        .points
        .iter()
        .map(|point| parse_point(point))
        .collect::<Result<Vec<_>>>()?;

    let raster = GeoRaster::builder(source_from_uri(&args.raster))
        .georeference(georef)
        .config(config)
        .open()?;

    raster.wait_ready().await?;
    if let Some(bbox) = raster.bounding_box() {
        info!(raster = %args.raster, bbox = %bbox, "Raster ready");
    }

    for point in points {
        println!("{}", sample_line(&raster, point));
    }

    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn georef_source(world_file: Option<&str>, origin: Option<&[f64]>) -> Result<GeorefSource> {
    match (world_file, origin) {
        (Some(uri), _) => Ok(GeorefSource::WorldFile(source_from_uri(uri))),
        (None, Some(&[lng, lat, size])) => Ok(GeorefSource::inline(Georeference::new(lng, lat, size)?)),
        (None, Some(values)) => bail!("--origin takes 3 values, got {}", values.len()),
        (None, None) => bail!("either --world-file or --origin is required"),
    }
}

/// Parse `lat,lng`.
fn parse_point(text: &str) -> Result<LatLng> {
    let Some((lat, lng)) = text.split_once(',') else {
        bail!("expected `lat,lng`, got `{}`", text);
    };

    let lat: f64 = lat.trim().parse().with_context(|| format!("bad latitude in `{}`", text))?;
    let lng: f64 = lng.trim().parse().with_context(|| format!("bad longitude in `{}`", text))?;
    Ok(LatLng::new(lat, lng))
}

fn sample_line(raster: &GeoRaster, point: LatLng) -> Value {
    match raster.sample(point) {
        Ok(pixel) => json!({ "lat": point.lat, "lng": point.lng, "pixel": pixel.as_slice() }),
        Err(SampleError::OutOfBounds { .. }) => {
            json!({ "lat": point.lat, "lng": point.lng, "pixel": null, "error": "out_of_bounds" })
        }
        Err(e) => json!({ "lat": point.lat, "lng": point.lng, "pixel": null, "error": e.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use georaster::MemorySource;
    use test_utils::{fixtures::TWO_BY_TWO, pixel_pattern};

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("49.5,10.5").unwrap(), LatLng::new(49.5, 10.5));
        assert_eq!(parse_point(" -3.25 , -60 ").unwrap(), LatLng::new(-3.25, -60.0));
        assert!(parse_point("49.5").is_err());
        assert!(parse_point("north,10.5").is_err());
    }

    #[test]
    fn test_args_require_georeference() {
        assert!(Args::try_parse_from(["sampler", "a.png", "1,2"]).is_err());
        assert!(Args::try_parse_from(["sampler", "a.png", "1,2", "--world-file", "a.pgw"]).is_ok());

        let args =
            Args::try_parse_from(["sampler", "a.png", "-1,2", "--origin", "-10", "50", "0.5"])
                .unwrap();
        assert_eq!(args.origin, Some(vec![-10.0, 50.0, 0.5]));
        assert_eq!(args.points, vec!["-1,2".to_string()]);
    }

    #[test]
    fn test_georef_source() {
        assert!(matches!(
            georef_source(None, Some(&[10.0, 50.0, 1.0][..])).unwrap(),
            GeorefSource::Inline(_)
        ));
        assert!(georef_source(None, Some(&[10.0, 50.0, 0.0][..])).is_err());
        assert!(georef_source(None, None).is_err());
    }

    #[tokio::test]
    async fn test_sample_line() {
        let raster = GeoRaster::from_origin(MemorySource::new(TWO_BY_TWO.png()), 10.0, 50.0, 1.0)
            .unwrap();
        raster.wait_ready().await.unwrap();

        let inside = sample_line(&raster, LatLng::new(48.5, 11.5));
        assert_eq!(inside["pixel"], json!(pixel_pattern(1, 1)));

        let outside = sample_line(&raster, LatLng::new(47.0, 11.5));
        assert_eq!(outside["error"], "out_of_bounds");
        assert!(outside["pixel"].is_null());
    }
}
