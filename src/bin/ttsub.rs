// Copyright (c) 2016-2020 Fabian Schuiki

//! The command line interface of the subtype constraint engine.

extern crate clap;
#[macro_use]
extern crate log;

use clap::{App, Arg};
use ttsub::*;

fn main() {
    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Checks the subtypes of TTCN-3 type declarations.")
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .help("Silence all output"),
        )
        .arg(
            Arg::with_name("verbosity-opts")
                .short("V")
                .help("Sets verbosity settings")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .possible_values(&["subtypes", "clauses", "schema"]),
        )
        .arg(
            Arg::with_name("schema")
                .long("schema")
                .help("Print the JSON schema of every type"),
        )
        .arg(
            Arg::with_name("werror")
                .long("Werror")
                .help("Treat warnings as errors"),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("The module descriptions to check")
                .multiple(true)
                .required(true),
        )
        .get_matches();

    // Configure the logger. RUST_LOG takes precedence over the flags.
    let level = if matches.is_present("quiet") {
        log::LevelFilter::Off
    } else {
        match matches.occurrences_of("verbosity") {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();

    // Configure the session.
    let mut session = Session::new();
    session.opts.warnings_as_errors = matches.is_present("werror");
    for v in matches
        .values_of("verbosity-opts")
        .into_iter()
        .flat_map(|v| v)
    {
        session.opts.verbosity |= match v {
            "subtypes" => Verbosity::SUBTYPES,
            "clauses" => Verbosity::CLAUSES,
            "schema" => Verbosity::SCHEMA,
            _ => unreachable!(),
        };
    }

    let inputs: Vec<&str> = matches.values_of("INPUT").into_iter().flatten().collect();
    let schemas = match run(&session, &inputs) {
        Ok(schemas) => schemas,
        Err(()) => std::process::exit(1),
    };
    if matches.is_present("schema") {
        match serde_json::to_string_pretty(&schemas) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                error!("cannot serialize schema: {}", e);
                std::process::exit(1);
            }
        }
    }
}
