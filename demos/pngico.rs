use clap::{App, Arg, ErrorKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

//===========================================================================//

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let matches = App::new("pngico")
        .version("0.1")
        .about("Converts a BMP, JPEG, PNG or GIF image into an ICO file")
        .arg(
            Arg::with_name("multi")
                .short("m")
                .long("multi")
                .help("Generates all standard icon sizes from 16x16 to 256x256"),
        )
        .arg(
            Arg::with_name("image")
                .required(true)
                .value_name("IMAGE-FILE")
                .help("Sets the input image"),
        )
        .arg(
            Arg::with_name("output")
                .value_name("OUTPUT-FILE")
                .help("Sets output path (defaults to the input with .ico)"),
        )
        .get_matches_safe()
        .unwrap_or_else(|error| match error.kind {
            ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => {
                error.exit()
            }
            _ => {
                eprintln!("{}", error.message);
                process::exit(2);
            }
        });
    let in_path = PathBuf::from(matches.value_of("image").unwrap_or_default());
    let out_path = match matches.value_of("output") {
        Some(path) => PathBuf::from(path),
        None => in_path.with_extension("ico"),
    };
    process::exit(run(&in_path, &out_path, matches.is_present("multi")));
}

fn run(in_path: &Path, out_path: &Path, multi: bool) -> i32 {
    let data = match fs::read(in_path) {
        Ok(data) => data,
        Err(error) => {
            eprintln!("Cannot open input file {:?}: {}", in_path, error);
            return 2;
        }
    };
    let encoder = pngico::IcoEncoder::default();
    let icon = if multi {
        encoder.encode_bytes_multi(&data)
    } else {
        encoder.encode_bytes(&data)
    };
    let icon = match icon {
        Ok(icon) => icon,
        Err(error) => {
            eprintln!("Cannot convert {:?}: {}", in_path, error);
            return 2;
        }
    };
    if let Err(error) = fs::write(out_path, icon) {
        eprintln!("Cannot write output file {:?}: {}", out_path, error);
        return 2;
    }
    0
}

//===========================================================================//
