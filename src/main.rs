use clap::{Parser, Subcommand};
use cropsend::config::{self, AppConfig};
use cropsend::imaging::{Bitmap, ImageBackend, RustBackend, Size};
use cropsend::network::{
    ApiClient, Endpoint, HttpTransport, Method, Parameters, RequestFailure, Resource,
};
use cropsend::output::{self, CropSummary};
use cropsend::picker::{FileSource, ImagePicker, PickerConfig, PickerHandlers, PickerMode};
use serde_json::Value;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "cropsend")]
#[command(about = "Crop images through a zoomable overlay and upload them")]
#[command(long_about = "\
Crop images through a zoomable overlay and upload them

The crop command runs a picker session headlessly: the image fills a square
viewport as wide as the host view, gestures are given as flags, and the
centered crop frame is cut out of the rendered view.

  cropsend crop photo.jpg --output avatar.png --zoom 1.5 --pan 40,0
  cropsend upload avatar.png --path photos --param name=Alice
  cropsend request users --param page=2

Failures are classified:
  status + JSON body      → message from the \"err\" field
  status + other body     → status only
  no response, timed out  → internet not reachable

Run 'cropsend gen-config' to generate a documented cropsend.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults are used when omitted or missing)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crop an image file and write the result as PNG
    Crop {
        /// Image to crop
        input: PathBuf,
        /// Where to write the cropped PNG
        #[arg(long, short)]
        output: PathBuf,
        /// Zoom factor (clamped to the configured range)
        #[arg(long)]
        zoom: Option<f64>,
        /// Pan the viewport by DX,DY points after zooming
        #[arg(long, value_parser = parse_pair, allow_hyphen_values = true)]
        pan: Option<(f64, f64)>,
        /// Double taps to apply before zooming
        #[arg(long, default_value_t = 0)]
        double_tap: u32,
        /// Host view size as WIDTHxHEIGHT points
        #[arg(long, value_parser = parse_size)]
        host: Option<Size>,
    },
    /// Upload a file as a multipart PNG part
    Upload {
        file: PathBuf,
        /// Endpoint path, relative to network.base_url
        #[arg(long)]
        path: String,
        #[arg(long, default_value = "POST")]
        method: Method,
        /// Extra form field as KEY=VALUE (repeatable)
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
    /// Send a request and print the classified outcome
    Request {
        /// Endpoint path, relative to network.base_url
        path: String,
        #[arg(long, default_value = "GET")]
        method: Method,
        /// Parameter as KEY=VALUE (repeatable)
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
        /// Put parameters in the query string for every method
        #[arg(long)]
        url_encoded: bool,
    },
    /// Print a stock cropsend.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing()?;

    match cli.command {
        Command::Crop {
            input,
            output,
            zoom,
            pan,
            double_tap,
            host,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            crop(&config, &input, &output, zoom, pan, double_tap, host)?;
        }
        Command::Upload {
            file,
            path,
            method,
            params,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            let bytes = std::fs::read(&file)?;
            let endpoint = endpoint(&path, method, params);
            let client = ApiClient::from_config(HttpTransport::new()?, &config.network)?;
            let outcome = client.send_upload(&endpoint, &bytes);
            report(method, &path, outcome);
        }
        Command::Request {
            path,
            method,
            params,
            url_encoded,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            let endpoint = endpoint(&path, method, params);
            let client = ApiClient::from_config(HttpTransport::new()?, &config.network)?;
            let outcome = client.send(&endpoint, url_encoded);
            report(method, &path, outcome);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn crop(
    config: &AppConfig,
    input: &Path,
    output_path: &Path,
    zoom: Option<f64>,
    pan: Option<(f64, f64)>,
    double_taps: u32,
    host: Option<Size>,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = host.unwrap_or(Size::new(
        config.overlay.host_width,
        config.overlay.host_height,
    ));

    let result: Rc<RefCell<Option<Bitmap>>> = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&result);
    let handlers = PickerHandlers::new(move |bitmap| *slot.borrow_mut() = Some(bitmap));

    let mut picker = ImagePicker::new(RustBackend::new(), PickerConfig::from(config), handlers);
    let mut source = FileSource::new(RustBackend::new(), [input.to_path_buf()]);
    if !picker.start_picking(&mut source, host, PickerMode::Gallery)? {
        return Err(format!("no image picked from {}", input.display()).into());
    }

    let source_dimensions = picker.picked().map(Bitmap::dimensions).unwrap_or_default();
    let session = picker
        .session_mut()
        .ok_or("crop session did not start")?;
    for _ in 0..double_taps {
        session.double_tap();
    }
    if let Some(factor) = zoom {
        session.set_zoom(factor);
    }
    if let Some((dx, dy)) = pan {
        session.pan(dx, dy);
    }
    let applied_zoom = session.zoom().factor();
    let offset = session.zoom().offset();
    let crop_frame = session.crop_frame();

    picker.confirm()?;
    let cropped = result
        .borrow_mut()
        .take()
        .ok_or("crop finished without a result")?;
    let png = RustBackend::new().encode_png(&cropped)?;
    std::fs::write(output_path, png)?;

    output::print_crop_summary(&CropSummary {
        input,
        source_dimensions,
        zoom: applied_zoom,
        offset,
        crop_frame,
        output: output_path,
        output_dimensions: cropped.dimensions(),
    });
    Ok(())
}

fn endpoint(path: &str, method: Method, params: Vec<(String, String)>) -> Endpoint {
    let mut resource = Resource::new(method);
    if !params.is_empty() {
        let parameters: Parameters = params
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        resource = resource.with_parameters(parameters);
    }
    Endpoint::new(path, resource)
}

fn report(method: Method, path: &str, outcome: Result<Value, RequestFailure>) {
    output::print_request_outcome(method, path, &outcome);
    if outcome.is_err() {
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("cropsend=info"))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
    Ok(())
}

fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got '{s}'"))?;
    let a = a.trim().parse().map_err(|e| format!("'{a}': {e}"))?;
    let b = b.trim().parse().map_err(|e| format!("'{b}': {e}"))?;
    Ok((a, b))
}

fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: f64 = w.trim().parse().map_err(|e| format!("'{w}': {e}"))?;
    let h: f64 = h.trim().parse().map_err(|e| format!("'{h}': {e}"))?;
    Ok(Size::new(w, h))
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    Ok((k.to_string(), v.to_string()))
}
