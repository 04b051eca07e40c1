use anyhow::{Context, Result};
use clap::{crate_version, App, Arg};
use kiln::build::build_site;
use kiln::config::Config;
use kiln::markdown::Markdown;
use kiln::serve::serve;
use kiln::site::Engine;
use kiln::template::TeraTemplater;
use log::error;
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let matches = App::new("kiln")
        .version(crate_version!())
        .about("Builds a static site from posts, pages, and layouts")
        .arg(
            Arg::with_name("source")
                .long("source")
                .value_name("DIR")
                .takes_value(true)
                .help("The site's source directory (defaults to the current directory)"),
        )
        .arg(
            Arg::with_name("serve")
                .long("serve")
                .help("Serve the site from the destination directory after building"),
        )
        .arg(
            Arg::with_name("port")
                .long("port")
                .value_name("PORT")
                .takes_value(true)
                .help("The port to serve on (defaults to 8080)"),
        )
        .get_matches();

    let source = match matches.value_of("source") {
        Some(source) => PathBuf::from(source),
        None => std::env::current_dir().context("Getting the current directory")?,
    };
    let mut config = Config::from_directory(&source)?;
    if let Some(port) = matches.value_of("port") {
        config.port = port
            .parse()
            .with_context(|| format!("Invalid port `{}`", port))?;
    }

    let templater = TeraTemplater::new();
    let markdown = Markdown::new();
    build_site(
        &config,
        &Engine {
            templater: &templater,
            markdown: &markdown,
        },
    )?;

    if matches.is_present("serve") {
        serve(&config.dest_directory, config.port)?;
    }
    Ok(())
}
