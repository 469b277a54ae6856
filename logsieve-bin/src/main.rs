use crossterm::event;
use logsieve_engine::{LineSource, OperationKind};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    crossterm::{
        execute,
        style::{Color, ResetColor, SetBackgroundColor},
        terminal::{
            Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
            enable_raw_mode,
        },
    },
};
use simplelog::{Config, LevelFilter, WriteLogger};
use std::{
    env,
    fs::File,
    io::{self, Read},
    panic,
    path::PathBuf,
    time::Duration,
};

mod app;
mod panel_view;
mod status_bar;

use app::{AppDesc, start_with_desc};

fn print_usage() {
    eprintln!("Usage: logsieve [OPTIONS] <FILE|->");
    eprintln!();
    eprintln!("Reads FILE, or pasted text from stdin when FILE is '-'.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --filter, -f TEXT        Keep lines containing TEXT");
    eprintln!("  --shield, -s TEXT        Hide lines containing TEXT");
    eprintln!("  --highlight, -H TEXT     Color TEXT");
    eprintln!("  --regex-filter, -r RE    Keep lines matching RE");
    eprintln!("  --regex-shield, -R RE    Hide lines matching RE");
    eprintln!("  --search QUERY           Search once the file is loaded");
    eprintln!("  --log-file PATH          Write debug logs to PATH");
    eprintln!("  --help, -h               Print this help message");
    eprintln!();
    eprintln!("Operation options can be repeated.");
}

#[derive(Debug, PartialEq)]
enum UsageOptions {
    Run {
        input: Input,
        operations: Vec<(String, OperationKind)>,
        search: Option<String>,
        log_file: Option<PathBuf>,
    },
    Help,
}

#[derive(Debug, PartialEq)]
enum Input {
    File(PathBuf),
    Stdin,
}

fn invalid(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message.into())
}

impl UsageOptions {
    fn from_args(args: &[String]) -> Result<Self, io::Error> {
        let mut input = None;
        let mut operations = Vec::new();
        let mut search = None;
        let mut log_file = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let kind = match arg.as_str() {
                "--help" | "-h" => return Ok(Self::Help),
                "--filter" | "-f" => Some(OperationKind::Filter),
                "--shield" | "-s" => Some(OperationKind::Shield),
                "--highlight" | "-H" => Some(OperationKind::Highlight),
                "--regex-filter" | "-r" => Some(OperationKind::RegexFilter),
                "--regex-shield" | "-R" => Some(OperationKind::RegexShield),
                _ => None,
            };

            if let Some(kind) = kind {
                let value = iter
                    .next()
                    .ok_or_else(|| invalid(format!("{} needs a value", arg)))?;
                operations.push((value.clone(), kind));
                continue;
            }

            match arg.as_str() {
                "--search" => {
                    let value = iter.next().ok_or_else(|| invalid("--search needs a value"))?;
                    search = Some(value.clone());
                }
                "--log-file" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| invalid("--log-file needs a value"))?;
                    log_file = Some(PathBuf::from(value));
                }
                "-" if input.is_none() => input = Some(Input::Stdin),
                other if other.starts_with('-') && other != "-" => {
                    return Err(invalid(format!("Unknown option {}", other)));
                }
                other if input.is_none() => input = Some(Input::File(PathBuf::from(other))),
                _ => return Err(invalid("Only one input is allowed")),
            }
        }

        let input = input.ok_or_else(|| invalid("Missing input file"))?;
        Ok(Self::Run {
            input,
            operations,
            search,
            log_file,
        })
    }
}

fn setup_logging(log_file: Option<&PathBuf>) -> io::Result<()> {
    // the terminal belongs to the TUI, so logs only go to a file when asked
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    if WriteLogger::init(LevelFilter::Debug, Config::default(), file).is_err() {
        eprintln!("Logger was already initialized");
    }
    Ok(())
}

fn main() -> io::Result<()> {
    // Collect args excluding the binary name
    let args: Vec<String> = env::args().skip(1).collect();
    let usage_option = match UsageOptions::from_args(&args) {
        Ok(option) => option,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    let UsageOptions::Run {
        input,
        operations,
        search,
        log_file,
    } = usage_option
    else {
        print_usage();
        return Ok(());
    };

    setup_logging(log_file.as_ref())?;

    // stdin has to be read before the terminal switches to raw mode
    let source = match input {
        Input::File(path) => LineSource::File(path),
        Input::Stdin => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            LineSource::PastedText(text)
        }
    };

    let desc = AppDesc {
        initial_operations: operations,
        initial_search: search,
        ..AppDesc::new()
    };

    let mut terminal = setup_terminal()?;

    // Ensure we restore the terminal on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let app_result = start_with_desc(&mut terminal, source, desc);

    // Always restore terminal before printing or exiting
    restore_terminal()?;

    if let Err(err) = app_result {
        eprintln!("Application Error: {:?}", err);
    }

    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    // enter the alternate screen to not mess with the user's shell history
    execute!(stdout, EnterAlternateScreen)?;
    execute!(
        stdout,
        SetBackgroundColor(Color::Reset),
        Clear(ClearType::All)
    )?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();

    // best-effort cleanup
    let _ = execute!(stdout, ResetColor);
    let _ = execute!(stdout, LeaveAlternateScreen);

    // Drain pending events so they don't leak to the shell
    while event::poll(Duration::from_millis(0)).unwrap_or(false) {
        let _ = event::read();
    }

    let _ = disable_raw_mode();

    Ok(())
}
