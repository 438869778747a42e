use clap::{Arg, Command as ClapCommand, ArgAction};
use std::process;
use log::error;

// Import from your library
use plumekit::utils::logger::Logger;
use plumekit::commands::{CommandFactory, PlumekitCommandFactory};

fn main() {
    let matches = ClapCommand::new("PlumeKit")
        .version("0.1")
        .about("Composite and render PM2.5 model raster surfaces")
        .arg(
            Arg::new("store")
                .help("Directory of pm25_{model}_{date}.tif files")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("List models (or dates with --model) in the store")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("samples")
                .short('s')
                .long("samples")
                .help("Extract composite point samples as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("export")
                .short('e')
                .long("export")
                .help("Export the composite as a GeoTIFF file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .help("Model identifier to composite")
                .value_name("MODEL")
                .required(false),
        )
        .arg(
            Arg::new("date")
                .short('d')
                .long("date")
                .help("Date to composite, or 'All Dates' to average everything")
                .value_name("DATE")
                .default_value("All Dates")
                .required(false),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file (or directory when rendering all models)")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("palette")
                .short('p')
                .long("palette")
                .help("Palette name for rendering (aqi, heat)")
                .value_name("NAME")
                .required(false),
        )
        .arg(
            Arg::new("palette-file")
                .long("palette-file")
                .help("TOML palette file to load the palette from")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("compression")
                .long("compression")
                .help("Compression for GeoTIFF export (none, deflate, zstd)")
                .value_name("NAME")
                .required(false),
        )
        .get_matches();

    let log_file = "plumekit.log";
    let logger = match Logger::new(log_file) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error initializing logger: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = Logger::init_global_logger("plumekit-global.log") {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(1);
    }

    let factory = PlumekitCommandFactory::new();

    let command_result = factory.create_command(&matches, &logger);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
