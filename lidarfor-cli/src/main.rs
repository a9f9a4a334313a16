use clap::Parser;
use cli::{AppOptions, Command};
use human_panic::setup_panic;
use log::{debug, error};
use std::process::ExitCode;

mod cli;
mod commands;

fn main() -> ExitCode {
    setup_panic!();

    // arg parsing
    let args = AppOptions::parse();

    // logger
    simple_logger::init_with_level(args.log_level).unwrap();

    // run
    let result = commands::load_settings(args.config.as_deref()).and_then(|settings| {
        match args.command {
            Command::Info(options) => commands::info::info(options),
            Command::Plot(options) => commands::plot::plot(options, &settings),
            Command::Plot3d(options) => commands::plot::plot3d(options, &settings),
            Command::Iplot3d(options) => commands::plot::iplot3d(options, &settings),
            Command::Normalize(options) => commands::normalize::normalize(options, &settings),
            Command::Clip(options) => commands::clip::clip(options),
            Command::FilterZ(options) => commands::filter::filter_z(options),
            Command::Filter(options) => commands::filter::filter(options),
            Command::Raster(options) => commands::raster::raster(options, &settings),
        }
    });
    if let Err(e) = result {
        error!("{e}");
        debug!("{e:?}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
