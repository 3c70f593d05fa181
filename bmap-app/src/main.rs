use std::process::ExitCode;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{error, info, Level};

/// Transforms selected on the command line, applied in declaration order.
#[derive(Debug, Default, PartialEq)]
struct Options {
    input: String,
    output: String,
    grayscale: bool,
    invert: bool,
    rotations: u8,
    flip: bool,
    log_level: Option<Level>,
}

fn command() -> Command {
    Command::new("bmap-app")
        .about("Applies simple transforms to 24-bit BMP images")
        .arg(Arg::new("input").help("BMP file to read").required(true))
        .arg(Arg::new("output").help("Where to write the result").required(true))
        .arg(
            Arg::new("grayscale")
                .long("grayscale")
                .action(ArgAction::SetTrue)
                .help("Average the three channels of every pixel"),
        )
        .arg(
            Arg::new("invert")
                .long("invert")
                .action(ArgAction::SetTrue)
                .help("Invert every channel"),
        )
        .arg(
            Arg::new("rotate")
                .long("rotate")
                .value_name("TURNS")
                .value_parser(value_parser!(u8).range(0..4))
                .default_value("0")
                .help("Rotate clockwise by this many quarter turns"),
        )
        .arg(
            Arg::new("flip")
                .long("flip")
                .action(ArgAction::SetTrue)
                .help("Mirror the image left to right"),
        )
        .arg(
            Arg::new("info")
                .long("info")
                .action(ArgAction::SetTrue)
                .help("Show info logs"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Show debug logs"),
        )
        .arg(
            Arg::new("trace")
                .long("trace")
                .action(ArgAction::SetTrue)
                .help("Show trace logs, including parsed header fields"),
        )
}

fn parse_options(matches: &ArgMatches) -> Options {
    let flag = |name: &str| matches.get_flag(name);

    let log_level = if flag("trace") {
        Some(Level::Trace)
    } else if flag("debug") {
        Some(Level::Debug)
    } else if flag("info") {
        Some(Level::Info)
    } else {
        None
    };

    Options {
        input: matches
            .get_one::<String>("input")
            .cloned()
            .unwrap_or_default(),
        output: matches
            .get_one::<String>("output")
            .cloned()
            .unwrap_or_default(),
        grayscale: flag("grayscale"),
        invert: flag("invert"),
        rotations: matches.get_one::<u8>("rotate").copied().unwrap_or(0),
        flip: flag("flip"),
        log_level,
    }
}

fn run(options: &Options) -> rust_bmap::Result<()> {
    let mut image = rust_bmap::decode(&options.input)?;
    info!(
        "Loaded {} ({}x{})",
        options.input,
        image.width(),
        image.height()
    );

    if options.grayscale {
        image.grayscale();
        info!("Applied grayscale");
    }
    if options.invert {
        image.invert();
        info!("Applied invert");
    }
    for _ in 0..options.rotations {
        image.rotate_clockwise_90()?;
    }
    if options.rotations > 0 {
        info!(
            "Rotated {} quarter turns, now {}x{}",
            options.rotations,
            image.width(),
            image.height()
        );
    }
    if options.flip {
        image.flip_horizontal()?;
        info!("Flipped horizontally");
    }

    rust_bmap::encode(&image, &options.output)?;
    info!("Saved {}", options.output);
    Ok(())
}

fn main() -> ExitCode {
    let options = parse_options(&command().get_matches());

    let log_level = options.log_level.unwrap_or(Level::Warn);
    if let Err(err) = simple_logger::init_with_level(log_level) {
        eprintln!("Could not initialize logger: {err}");
    }
    info!("Log level :{}", log_level);

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

#[test]
fn parse_all_flags() {
    let matches = command()
        .try_get_matches_from([
            "bmap-app",
            "in.bmp",
            "out.bmp",
            "--grayscale",
            "--invert",
            "--rotate",
            "3",
            "--flip",
            "--debug",
        ])
        .unwrap();
    let options = parse_options(&matches);
    assert_eq!(
        options,
        Options {
            input: "in.bmp".into(),
            output: "out.bmp".into(),
            grayscale: true,
            invert: true,
            rotations: 3,
            flip: true,
            log_level: Some(Level::Debug),
        }
    );
}

#[test]
fn defaults_do_nothing() {
    let matches = command()
        .try_get_matches_from(["bmap-app", "in.bmp", "out.bmp"])
        .unwrap();
    let options = parse_options(&matches);
    assert!(!options.grayscale && !options.invert && !options.flip);
    assert_eq!(options.rotations, 0);
    assert_eq!(options.log_level, None);
}

#[test]
fn rejects_bad_rotation() {
    assert!(command()
        .try_get_matches_from(["bmap-app", "in.bmp", "out.bmp", "--rotate", "4"])
        .is_err());
    assert!(command().try_get_matches_from(["bmap-app"]).is_err());
}

#[test]
fn run_pipeline_on_file() {
    let dir = std::env::temp_dir();
    let input = dir.join(format!("bmap-app-in-{}.bmp", std::process::id()));
    let output = dir.join(format!("bmap-app-out-{}.bmp", std::process::id()));

    let mut image = rust_bmap::Image::new(3, 2).unwrap();
    image.set_pixel(0, 0, rust_bmap::Pixel::from_rgb(30, 60, 90));
    rust_bmap::encode(&image, &input).unwrap();

    let options = Options {
        input: input.display().to_string(),
        output: output.display().to_string(),
        grayscale: true,
        invert: true,
        rotations: 1,
        flip: true,
        ..Default::default()
    };
    run(&options).unwrap();

    let result = rust_bmap::decode(&output).unwrap();
    std::fs::remove_file(&input).unwrap();
    std::fs::remove_file(&output).unwrap();

    assert_eq!(result.dimensions(), (2, 3));
    // (0, 0) rotates to (1, 0) and flips back to (0, 0)
    assert_eq!(result.get_pixel(0, 0), rust_bmap::Pixel::new(195, 195, 195));
    assert_eq!(result.get_pixel(1, 0), rust_bmap::Pixel::new(255, 255, 255));
}
