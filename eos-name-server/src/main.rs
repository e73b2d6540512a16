use std::path::PathBuf;
use std::sync::Mutex;

use actix_web::{App, HttpResponse, HttpServer, Responder, get, put, web};
use clap::Parser;
use log::{info, warn};
use serde::Deserialize;

use eos_name_core::model::config::{GeneratorConfig, check_num};
use eos_name_core::{Error, Generator, ValidationErrors};

/// Command-line configuration of the server.
#[derive(Debug, Parser)]
#[command(name = "eos-name-server")]
#[command(about = "HTTP interface to the EOS name generator")]
struct Config {
	/// Address to listen on
	#[arg(long, default_value = "127.0.0.1:5000")]
	bind: String,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info")]
	log_level: String,

	/// Word list used instead of the bundled one
	#[arg(long)]
	seed_data_path: Option<PathBuf>,

	/// Initial probability of a digit suffix
	#[arg(long)]
	numbers_probability: Option<f64>,
}

/// Query parameters of the `/v1/generate_many` endpoint
#[derive(Deserialize)]
struct GenerateManyParams {
	num: Option<i64>,
}

struct SharedData {
	generator: Generator,
}

/// Maps a generator error to an HTTP response.
///
/// Configuration and data errors are the caller's fault (400), a sampler
/// failure during generation is ours (500).
fn error_response(error: &Error) -> HttpResponse {
	match error {
		Error::ConfigValidation(errors) => HttpResponse::BadRequest().json(errors),
		Error::DataValidation { .. } | Error::SourceNotFound { .. } | Error::Capability { .. } => {
			HttpResponse::BadRequest().body(error.to_string())
		}
		Error::Sampler(_) => HttpResponse::InternalServerError().body(error.to_string()),
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Returns one generated name as the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Generator lock failed"),
	};

	match shared_data.generator.generate() {
		Ok(name) => HttpResponse::Ok().body(name),
		Err(e) => error_response(&e),
	}
}

/// HTTP GET endpoint `/v1/generate_many?num=N`
///
/// Returns `num` names (default 1), one per line.
#[get("/v1/generate_many")]
async fn get_generated_many(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateManyParams>) -> impl Responder {
	let num = query.num.unwrap_or(1);

	let mut errors = ValidationErrors::new();
	check_num(num, &mut errors);
	if let Err(errors) = errors.into_result() {
		return HttpResponse::BadRequest().json(errors);
	}
	let Ok(num) = usize::try_from(num) else {
		return HttpResponse::BadRequest().body(format!("Num is too large: {num}"));
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Generator lock failed"),
	};

	match shared_data.generator.generate_many(num) {
		Ok(names) => HttpResponse::Ok().body(names.join("\n")),
		Err(e) => error_response(&e),
	}
}

#[get("/v1/config")]
async fn get_config(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Generator lock failed"),
	};
	HttpResponse::Ok().json(shared_data.generator.settings())
}

/// HTTP PUT endpoint `/v1/config`
///
/// Applies a JSON `GeneratorConfig`. Either every field is applied or
/// none is, and the resulting settings are returned.
#[put("/v1/config")]
async fn put_config(data: web::Data<Mutex<SharedData>>, config: web::Json<GeneratorConfig>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Generator lock failed"),
	};

	match shared_data.generator.reconfigure(&config) {
		Ok(()) => {
			info!("Configuration updated: {:?}", shared_data.generator);
			HttpResponse::Ok().json(shared_data.generator.settings())
		}
		Err(e) => {
			warn!("Configuration rejected: {e}");
			error_response(&e)
		}
	}
}

fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated)
		.service(get_generated_many)
		.service(get_config)
		.service(put_config);
}

/// Main entry point for the server.
///
/// Builds the generator, wraps it in a `Mutex` and starts an Actix-web
/// HTTP server on `--bind`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	let config = Config::parse();

	env_logger::Builder::from_default_env()
		.filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info))
		.init();

	let generator_config = GeneratorConfig {
		numbers_probability: config.numbers_probability,
		seed_data_path: config.seed_data_path.clone(),
		..Default::default()
	};
	let generator = Generator::with_config(&generator_config).map_err(std::io::Error::other)?;
	info!("Starting eos-name-server on {} with {:?}", config.bind, generator);

	let shared_data = web::Data::new(Mutex::new(SharedData { generator }));

	HttpServer::new(move || App::new().app_data(shared_data.clone()).configure(routes))
		.bind(config.bind.as_str())?
		.run()
		.await
}
