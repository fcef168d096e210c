use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use folio::build::{build_manifest, build_site};
use folio::config::Config;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::Path;

fn main() -> Result<()> {
    let directory_arg = Arg::with_name("DIRECTORY")
        .help("The project directory (or any directory below it)")
        .default_value(".")
        .index(1);
    let verbose_arg = Arg::with_name("verbose")
        .short("v")
        .long("verbose")
        .help("Logs every content node as it's processed");

    let matches = App::new("folio")
        .about("Builds a static portfolio and blog site")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Renders the site into the output directory")
                .arg(directory_arg.clone())
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .help("The output directory (defaults to `_site` in the project)"),
                )
                .arg(verbose_arg.clone()),
        )
        .subcommand(
            SubCommand::with_name("manifest")
                .about("Prints the page manifest as YAML without rendering anything")
                .arg(directory_arg)
                .arg(verbose_arg),
        )
        .get_matches();

    match matches.subcommand() {
        ("build", Some(matches)) => {
            init_logging(matches)?;
            let config = load_config(matches)?;
            build_site(&config)?;
            Ok(())
        }
        ("manifest", Some(matches)) => {
            init_logging(matches)?;
            let config = load_config(matches)?;
            let manifest = build_manifest(&config)?;
            print!("{}", serde_yaml::to_string(&manifest)?);
            Ok(())
        }
        (name, _) => Err(anyhow!("unknown subcommand `{}`", name)),
    }
}

fn init_logging(matches: &ArgMatches) -> Result<()> {
    let level = if matches.is_present("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(level)
        .init()
        .map_err(|e| anyhow!("Initializing the logger: {}", e))
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let directory = Path::new(matches.value_of("DIRECTORY").unwrap_or("."));
    let output = matches.value_of("output").map(Path::new);
    Config::from_directory(directory, output)
}
