mod cli;
mod logger;
mod utils;
mod validation;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Args, Commands, IoArgs};
use std::io::{IsTerminal, Read, Write};
use std::path::Path;
use std::process::ExitCode;
use tinify::constants::{ERROR_PREFIX, SUCCESS_PREFIX, WARNING_PREFIX};
use tinify::{Client, Config, ImageType, ResizeOption, Source, TransformOptions};
use tracing::{debug, info, warn};
use utils::{create_progress_spinner, SizeSummary};
use validation::{is_remote_url, validate_output_path};

/// What to do with a source once it has been uploaded.
enum Operation {
    Compress,
    Resize(ResizeOption),
    Convert(Vec<String>),
    Transform(TransformOptions),
}

fn main() -> ExitCode {
    let args = Args::parse();

    let (level, warning) = logger::init(&args.debug);
    if let Some(warning) = warning {
        warn!("{}", warning);
    }
    debug!("logging level set to {}", level);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("run failed: {:?}", e);
            eprintln!("{} {:#}", ERROR_PREFIX, e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let (io, operation) = match args.command {
        Some(Commands::Version) => {
            print_version();
            return Ok(());
        }
        None => (args.io, Operation::Compress),
        Some(Commands::Compress { io }) => (io, Operation::Compress),
        Some(Commands::Resize {
            io,
            method,
            width,
            height,
        }) => {
            let option = ResizeOption::new(method, width, height);
            // checked before uploading so a bad request costs no compression
            option.validate()?;
            (io, Operation::Resize(option))
        }
        Some(Commands::Convert { io, types }) => {
            let types = convert_types(types.as_deref(), io.output());
            (io, Operation::Convert(types))
        }
        Some(Commands::Transform { io, background }) => {
            (io, Operation::Transform(TransformOptions::background(background)))
        }
    };

    let client = build_client(args.key, args.proxy, args.endpoint)?;
    let (mut source, original_size) = open_stream(&client, &io)?;

    match operation {
        Operation::Compress => {}
        Operation::Resize(option) => source.resize(option)?,
        Operation::Convert(types) => source.convert(types.as_slice())?,
        Operation::Transform(option) => source.transform(option)?,
    }

    export(&mut source, io.output(), original_size)
}

fn build_client(
    key: Option<String>,
    proxy: Option<String>,
    endpoint: Option<String>,
) -> Result<Client> {
    let mut config = Config::new(key.unwrap_or_default())?;
    if let Some(proxy) = proxy {
        config = config.with_proxy(proxy);
    }
    if let Some(endpoint) = endpoint {
        config = config.with_endpoint(endpoint)?;
    }
    debug!("a Tinify API key was found: [...{}]", config.key_hint());
    Ok(Client::new(config))
}

/// Explicit types, else the output extension, else webp.
fn convert_types(types: Option<&str>, output: Option<&str>) -> Vec<String> {
    let types = types.map(str::trim).filter(|t| !t.is_empty());
    if let Some(types) = types {
        return types
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
    }

    let guessed = output
        .and_then(|name| ImageType::from_path(Path::new(name)))
        .unwrap_or(ImageType::WebP);
    debug!("convert: no type requested, using {}", guessed.name());
    vec![guessed.name().to_string()]
}

/// Uploads the input (file, URL or standard input) and returns the source.
///
/// The size of the uploaded bytes is returned when known.
fn open_stream(client: &Client, io: &IoArgs) -> Result<(Source, Option<u64>)> {
    if let Some(output) = io.output() {
        validate_output_path(Path::new(output))?;
        debug!("output file is {:?}", output);
    }

    if let Some(input) = io.input() {
        if is_remote_url(input) {
            info!("asking Tinify to fetch {}", input);
            let spinner = create_progress_spinner("Uploading URL to Tinify...");
            let source = Source::from_url(client, input);
            spinner.finish_and_clear();
            return Ok((source?, None));
        }
    }

    let raw = read_input(io.input())?;
    let image_type = match ImageType::sniff(&raw) {
        Some(image_type) => image_type,
        None => bail!("invalid or not recognised media type, aborting"),
    };
    debug!(
        "input {:?} (empty means stdin), size {}, media type {}",
        io.input().unwrap_or(""),
        raw.len(),
        image_type.mime_type()
    );

    let original_size = raw.len() as u64;
    let spinner = create_progress_spinner("Uploading to Tinify...");
    let source = Source::from_buffer(client, raw);
    spinner.finish_and_clear();
    Ok((source?, Some(original_size)))
}

fn read_input(input: Option<&str>) -> Result<Vec<u8>> {
    match input {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("cannot read input file {:?}", path))
        }
        None => {
            let mut stdin = std::io::stdin();
            if stdin.is_terminal() {
                bail!("cannot read interactively from a TTY; use --input or pipe a file to STDIN");
            }
            info!("empty input filename; reading from stdin instead");
            let mut raw = Vec::new();
            stdin
                .read_to_end(&mut raw)
                .context("cannot read from stdin")?;
            Ok(raw)
        }
    }
}

fn export(source: &mut Source, output: Option<&str>, original_size: Option<u64>) -> Result<()> {
    let spinner = create_progress_spinner("Downloading result from Tinify...");

    let Some(output) = output else {
        let fetched = source.to_buffer_counted();
        spinner.finish_and_clear();
        let (raw, count) = fetched?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&raw).context("cannot write to stdout")?;
        stdout.flush().context("cannot write to stdout")?;
        debug!("wrote {} byte(s) to stdout; compression count: {}", raw.len(), count);
        return Ok(());
    };

    let fetched = source.to_file_counted(output);
    spinner.finish_and_clear();
    let count = match fetched {
        Ok(count) => count,
        Err(e) => {
            if let Some(count) = e.compression_count() {
                eprintln!(
                    "{} result was fetched but not saved; compression count: {}",
                    WARNING_PREFIX, count
                );
            }
            return Err(e.into());
        }
    };

    let written = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    if let Some(original) = original_size {
        info!("{}", SizeSummary::new(original, written));
    }
    info!(
        "{} successfully wrote to {:?}, compression count: {}",
        SUCCESS_PREFIX, output, count
    );
    Ok(())
}

fn print_version() {
    println!("VERSION:");
    println!("  {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("  OS: {}", std::env::consts::OS);
    println!("  Architecture: {}", std::env::consts::ARCH);
    println!(
        "  Profile: {}",
        if cfg!(debug_assertions) { "debug" } else { "release" }
    );
}
