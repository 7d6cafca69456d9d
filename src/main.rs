//! mathreader command line
//!
//! Reads a MathML file and prints its speech and braille. With `--navigate`
//! navigation commands are then read from stdin, one per line, until `Exit`
//! or end of input.

use log::{debug, error, info};
use mathreader::navigate::NavOutput;
use mathreader::{MathError, NavigationLocation, Result, Session};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

const USAGE: &str = "Usage: mathreader [--debug] [--rules DIR] [--pref NAME=VALUE]... [--json] [--navigate] FILE";

/// Parsed command line
#[derive(Debug, Default)]
struct Options {
    debug: bool,
    rules: Option<PathBuf>,
    prefs: Vec<(String, String)>,
    json: bool,
    navigate: bool,
    file: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    mathml: &'a str,
    speech: &'a str,
    braille: &'a str,
    braille_code: &'a str,
}

#[derive(Serialize)]
struct Step<'a> {
    command: &'a str,
    speech: &'a str,
    location: &'a NavigationLocation,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> std::result::Result<Options, String> {
    let mut options = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--debug" | "-d" => options.debug = true,
            "--json" => options.json = true,
            "--navigate" => options.navigate = true,
            "--rules" => {
                let dir = args.next().ok_or("--rules needs a directory")?;
                options.rules = Some(PathBuf::from(dir));
            }
            "--pref" => {
                let pref = args.next().ok_or("--pref needs NAME=VALUE")?;
                let (name, value) = pref
                    .split_once('=')
                    .ok_or_else(|| format!("Bad preference '{}', expected NAME=VALUE", pref))?;
                options.prefs.push((name.to_string(), value.to_string()));
            }
            flag if flag.starts_with('-') => return Err(format!("Unknown option '{}'", flag)),
            file => {
                if options.file.replace(PathBuf::from(file)).is_some() {
                    return Err("Only one FILE may be given".to_string());
                }
            }
        }
    }
    if options.file.is_none() {
        return Err("No FILE given".to_string());
    }
    Ok(options)
}

fn init_logging(debug_mode: bool) {
    if debug_mode {
        // Debug mode: write to mathreader.log
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("mathreader.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open mathreader.log for debug logging: {}", e);
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }
        info!(
            "mathreader version {} starting (debug mode, logging to mathreader.log)",
            mathreader::VERSION
        );
    } else {
        // Normal mode: only errors, to stderr
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }
}

fn main() {
    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };
    init_logging(options.debug);

    if let Err(e) = run(&options) {
        error!("Fatal error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(options: &Options) -> Result<()> {
    let file = options.file.as_ref().ok_or(MathError::NoExpression)?;
    let markup = std::fs::read_to_string(file)?;
    debug!("Read {} bytes from {:?}", markup.len(), file);

    let mut session = Session::new();
    let rules = options.rules.clone().unwrap_or_else(|| PathBuf::from("."));
    session.set_rules_dir(&rules)?;
    for (name, value) in &options.prefs {
        session.set_preference(name, value)?;
    }

    let annotated = session.set_mathml(&markup)?;
    let speech = session.spoken_text()?;
    let braille = session.braille("")?;
    let code = session.preference("BrailleCode")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if options.json {
        let report = Report {
            mathml: &annotated,
            speech: &speech,
            braille: &braille,
            braille_code: &code,
        };
        writeln!(out, "{}", to_json(&report)?)?;
    } else {
        writeln!(out, "{}", speech)?;
        writeln!(out, "{}", braille)?;
    }

    if options.navigate {
        navigate(&mut session, options.json, &mut out)?;
    }
    Ok(())
}

/// Read commands from stdin until Exit
fn navigate(session: &mut Session, json: bool, out: &mut impl Write) -> Result<()> {
    for line in io::stdin().lock().lines() {
        let line = line?;
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        // A bad command is reported and the loop goes on
        let speech = match session.navigate_command(command) {
            Ok(NavOutput::Speech(text)) => text,
            Ok(NavOutput::Exit) => break,
            Err(e) => {
                writeln!(out, "Error: {}", e)?;
                continue;
            }
        };
        if json {
            let location = session.navigation_location()?;
            let step = Step {
                command,
                speech: &speech,
                location: &location,
            };
            writeln!(out, "{}", to_json(&step)?)?;
        } else {
            writeln!(out, "{}", speech)?;
        }
    }
    Ok(())
}

fn to_json(value: &impl Serialize) -> Result<String> {
    serde_json::to_string(value).map_err(|e| MathError::Io(io::Error::new(io::ErrorKind::Other, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(args(&[
            "--rules", "rules", "--pref", "TTS=SSML", "--json", "expr.xml",
        ]))
        .unwrap();
        assert_eq!(options.rules, Some(PathBuf::from("rules")));
        assert_eq!(options.prefs, vec![("TTS".to_string(), "SSML".to_string())]);
        assert!(options.json);
        assert!(!options.navigate);
        assert_eq!(options.file, Some(PathBuf::from("expr.xml")));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["--pref", "TTS", "a.xml"])).is_err());
        assert!(parse_args(args(&["--verbose", "a.xml"])).is_err());
        assert!(parse_args(args(&["a.xml", "b.xml"])).is_err());
    }
}
