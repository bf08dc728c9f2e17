// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod commands;
pub mod parser;

use anyhow::Error;
use clap::{App, AppSettings, Arg, ArgMatches};
use config::Config;
use controller::Controller;
use engine::Selector;
use log::LevelFilter;
use parser::Statement;
use simplelog::{Config as LogConfig, TermLogger, TerminalMode, WriteLogger};
use sqlite_tracker::SqliteController;
use std::path::PathBuf;

macro_rules! prompt {
    ($ed:ident, $db:expr) => {{
        use rustyline::error::ReadlineError;

        match $ed.readline(&format!("({}) {}", $db, PROMPT)) {
            Ok(line) => {
                $ed.add_history_entry(line.as_str());
                Ok(line)
            }

            Err(ReadlineError::Interrupted) => {
                continue;
            }

            Err(ReadlineError::Eof) => {
                println!("Disconnecting from {}", $db);
                break;
            }

            Err(e) => Err(e),
        }
    }};
}

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROMPT: &str = ">> ";
const DB_ENV: &str = "RESTAURANT_TRACKER_DB";

const USAGE: &str = r#"restaurant-tracker [--config FILE] [-v|-q] [--db FILE | dbpath] [command]
Commands:
    Add-User username
    Rename-User username newusername
    Delete-User username

    Add-Restaurant "name"
    Rename-Restaurant "name" "newname"
    Delete-Restaurant "name"

    Add-Group groupname
    Rename-Group groupname newgroupname
    Delete-Group groupname

    Add-User-Group username groupname
    Delete-User-Group username groupname

    Add-Restaurant-Group "restaurantname" groupname
    Delete-Restaurant-Group "restaurantname" groupname

    Add-Restaurant-Visit username "restaurantname" waittime staffrating foodrating [M/d/yy]

    Pick-Restaurant groupname

    List-Users
    List-Restaurants
    List-Groups
    List-Visits [restaurant "name" | user username]
    List-Members groupname"#;

fn usage() {
    println!("{}", USAGE);
}

fn app() -> App<'static, 'static> {
    App::new("restaurant-tracker")
        .version(VERSION)
        .about("Keeps track of restaurant visits and picks where a group eats next")
        .setting(AppSettings::TrailingVarArg)
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .takes_value(true)
                .help("TOML configuration file"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("More logging, repeat for trace output"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .conflicts_with("verbose")
                .help("Only log errors"),
        )
        .arg(
            Arg::with_name("db")
                .long("db")
                .value_name("FILE")
                .takes_value(true)
                .help("Path to the SQLite database"),
        )
        .arg(
            Arg::with_name("words")
                .index(1)
                .multiple(true)
                .allow_hyphen_values(true)
                .help("[dbpath] [command [args...]], omit the command for a prompt"),
        )
}

/// Database and command picked out of the positional words.
#[derive(Debug, PartialEq)]
struct Invocation {
    database: Option<PathBuf>,
    command: Option<String>,
    args: Vec<String>,
}

impl Invocation {
    /// The first word is the database path unless `--db` was given or it
    /// names a command. Without a path the environment and then the config
    /// file provide one.
    fn resolve(
        words: Vec<String>,
        db_flag: Option<&str>,
        env_db: Option<PathBuf>,
        config: &Config,
    ) -> Self {
        let mut words = words.into_iter().peekable();
        let mut database = db_flag.map(PathBuf::from);

        let first_is_path = words
            .peek()
            .map_or(false, |first| !parser::is_command(first));
        if database.is_none() && first_is_path {
            database = words.next().map(PathBuf::from);
        }

        let database = database
            .or(env_db)
            .or_else(|| config.database.path.clone());

        Self {
            database,
            command: words.next(),
            args: words.collect(),
        }
    }

    fn from_matches(matches: &ArgMatches, config: &Config) -> Self {
        let words = matches
            .values_of("words")
            .map(|values| values.map(String::from).collect())
            .unwrap_or_default();

        Self::resolve(
            words,
            matches.value_of("db"),
            std::env::var_os(DB_ENV).map(PathBuf::from),
            config,
        )
    }
}

fn load_config(matches: &ArgMatches) -> Result<Config, Error> {
    match matches.value_of("config") {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}

fn log_level(matches: &ArgMatches, config: &Config) -> LevelFilter {
    if matches.is_present("quiet") {
        return LevelFilter::Error;
    }

    match matches.occurrences_of("verbose") {
        0 => config.log.level.parse().unwrap_or(LevelFilter::Info),
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(level: LevelFilter) {
    if TermLogger::init(level, LogConfig::default(), TerminalMode::Stderr).is_err() {
        // No terminal, e.g. output piped to a file
        let _ = WriteLogger::init(level, LogConfig::default(), std::io::stderr());
    }
}

/// Run one statement inside its own transaction.
fn run_statement<C: Controller>(
    controller: &C,
    selector: &Selector<C>,
    statement: &Statement,
) -> Result<String, Error> {
    controller.begin_transaction()?;

    match commands::execute(controller, selector, statement) {
        Ok(message) => {
            controller.commit_transaction()?;
            Ok(message)
        }

        Err(e) => {
            if let Err(rollback) = controller.rollback_transaction() {
                log::error!("Rollback failed: {}", rollback);
            }
            Err(e)
        }
    }
}

fn run_command<C: Controller>(
    controller: &C,
    selector: &Selector<C>,
    command: &str,
    args: &[String],
) {
    let statement = match Statement::parse(command, args) {
        Ok(statement) => statement,
        Err(e) => {
            println!("{}", e);
            if e.shows_usage() {
                usage();
            }
            return;
        }
    };

    match run_statement(controller, selector, &statement) {
        Ok(message) => println!("{}", message),
        Err(e) => println!("Error processing request: {}", e),
    }
}

fn interactive<C: Controller>(controller: &C, selector: &Selector<C>, name: &str) {
    println!("Welcome to restaurant-tracker {}", VERSION);
    let mut rl = rustyline::Editor::<()>::new();

    loop {
        let line: String = match prompt!(rl, name) {
            Ok(line) => line,
            Err(e) => {
                println!("Error processing request: {}", e);
                break;
            }
        };

        match line.trim() {
            "?" | "h" | "help" => usage(),

            "q" | "quit" => {
                println!("Bye!");
                break;
            }

            "v" | "version" => {
                println!("version: {}", VERSION);
            }

            empty if empty.is_empty() => {}

            line => match parser::tokenize(line) {
                Some(tokens) => {
                    if let Some((command, args)) = tokens.split_first() {
                        run_command(controller, selector, command, args);
                    }
                }
                None => println!("Invalid syntax!"),
            },
        }
    }
}

fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    let matches = app().get_matches();

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            println!("Error processing request: {}", e);
            println!("Done");
            return Ok(());
        }
    };
    init_logging(log_level(&matches, &config));

    let invocation = Invocation::from_matches(&matches, &config);
    let path = match invocation.database {
        Some(path) => path,
        None => {
            usage();
            return Ok(());
        }
    };
    let name = path.to_string_lossy().into_owned();

    let controller = match SqliteController::with_path(&name) {
        Ok(controller) => controller,
        Err(e) => {
            println!("Error processing request: {}", e);
            println!("Done");
            return Ok(());
        }
    };
    log::info!("Using database {}", name);
    let selector = Selector::with_config(&controller, &config.selector);

    match &invocation.command {
        Some(command) => {
            run_command(&controller, &selector, command, &invocation.args);
            println!("Done");
        }

        None => interactive(&controller, &selector, &name),
    }

    Ok(())
}
