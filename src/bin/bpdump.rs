#[path = "bpdump/output.rs"]
mod output;

use anyhow::{Context, Result, format_err};
use blockpar::{BlockPar, LoadSettings, OutputEncoding, PathResolver, SaveSettings};
use clap::{Arg, ArgAction, ArgMatches, Command};
use encoding::label::encoding_from_whatwg_label;
use indoc::indoc;
use log::{LevelFilter, debug};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use std::io::{self, Write};
use std::process::exit;

/// Where a modified or reformatted tree goes.
enum OutputTarget<'a> {
    Stdout,
    File { path: &'a str, prompt: bool },
}

fn load_settings(matches: &ArgMatches) -> Result<LoadSettings> {
    let label = matches
        .get_one::<String>("ansi-codec")
        .map(String::as_str)
        .unwrap_or("windows-1251");

    let codec = encoding_from_whatwg_label(label)
        .ok_or_else(|| format_err!("Unknown ANSI codec `{}`", label))?;

    let settings = LoadSettings::new().ansi_codec(codec);
    Ok(match matches.get_one::<usize>("max-depth") {
        Some(max_depth) => settings.max_depth(*max_depth),
        None => settings,
    })
}

fn save_settings(matches: &ArgMatches) -> SaveSettings {
    let indent = match matches.get_one::<usize>("indent") {
        Some(0) => "\t".to_owned(),
        Some(n) => " ".repeat(*n),
        None => "    ".to_owned(),
    };

    let encoding = if matches.get_flag("utf16") {
        OutputEncoding::Utf16Le
    } else {
        OutputEncoding::Utf8
    };

    SaveSettings::new()
        .ascii(matches.get_flag("ascii"))
        .indent(indent)
        .encoding(encoding)
}

/// Reads the tree from a path, or from stdin when the path is `-`.
fn load_input(input: &str, settings: &LoadSettings) -> Result<BlockPar> {
    if input == "-" {
        debug!("Reading document from stdin");
        return BlockPar::load_from_reader(io::stdin().lock(), settings)
            .context("Failed to load document from stdin");
    }

    BlockPar::load_from_file_with(input, settings)
        .with_context(|| format!("Failed to load {}", input))
}

fn write_output(tree: &BlockPar, target: OutputTarget<'_>, settings: &SaveSettings) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            tree.save_to_writer(&mut lock, settings)?;
            lock.flush()?;
        }
        OutputTarget::File { path, prompt } => {
            let file = output::create_output_file(path, prompt)?;
            tree.save_to_writer(file, settings)
                .with_context(|| format!("Failed to write {}", path))?;
        }
    }
    Ok(())
}

fn output_target<'a>(matches: &'a ArgMatches) -> OutputTarget<'a> {
    match matches.get_one::<String>("output-target") {
        Some(path) => OutputTarget::File {
            path,
            prompt: !matches.get_flag("no-confirm-overwrite"),
        },
        None => OutputTarget::Stdout,
    }
}

fn run_fmt(matches: &ArgMatches) -> Result<()> {
    let input = required(matches, "INPUT")?;
    let tree = load_input(input, &load_settings(matches)?)?;

    write_output(&tree, output_target(matches), &save_settings(matches))
}

fn run_get(matches: &ArgMatches) -> Result<()> {
    let input = required(matches, "INPUT")?;
    let path = required(matches, "PATH")?;
    let tree = load_input(input, &load_settings(matches)?)?;

    let resolver = PathResolver::new(path_delimiter(matches));
    let index = *matches.get_one::<usize>("index").unwrap_or(&0);

    let value = resolver.param_get_nth(&tree, path, index)?;

    let value = match matches.get_one::<usize>("field") {
        Some(field) => {
            let delimiters = required(matches, "delimiters")?;
            value.field(*field, delimiters)?
        }
        None => value.clone(),
    };

    println!("{}", value);
    Ok(())
}

fn run_set(matches: &ArgMatches) -> Result<()> {
    let input = required(matches, "INPUT")?;
    let path = required(matches, "PATH")?;
    let value = required(matches, "VALUE")?;
    let mut tree = load_input(input, &load_settings(matches)?)?;

    let resolver = PathResolver::new(path_delimiter(matches));
    if matches.get_flag("add") {
        resolver.param_add(&mut tree, path, value)?;
    } else {
        resolver.param_set_or_add(&mut tree, path, value)?;
    }

    let target = match (output_target(matches), input) {
        (OutputTarget::Stdout, "-") => OutputTarget::Stdout,
        // Editing in place was asked for explicitly.
        (OutputTarget::Stdout, input) => OutputTarget::File {
            path: input,
            prompt: false,
        },
        (target, _) => target,
    };

    write_output(&tree, target, &save_settings(matches))
}

fn run_json(matches: &ArgMatches) -> Result<()> {
    let input = required(matches, "INPUT")?;
    let tree = load_input(input, &load_settings(matches)?)?;

    let json = tree.to_json_string(!matches.get_flag("no-indent"))?;
    println!("{}", json);
    Ok(())
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| format_err!("missing argument `{}`", id))
}

fn path_delimiter(matches: &ArgMatches) -> char {
    *matches
        .get_one::<char>("delimiter")
        .unwrap_or(&PathResolver::DEFAULT_DELIMITER)
}

fn try_to_initialize_logging(matches: &ArgMatches) {
    let level = match matches.get_count("verbose") {
        0 => return,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        3 => LevelFilter::Trace,
        _ => {
            eprintln!("using more than -vvv does not affect verbosity level");
            LevelFilter::Trace
        }
    };

    if let Err(e) = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn input_arg() -> Arg {
    Arg::new("INPUT")
        .required(true)
        .help("Input document. Pass `-` to read from stdin.")
}

fn output_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("output-target")
            .long("output")
            .short('f')
            .value_name("PATH")
            .help("Writes output to the file specified instead of stdout. \
                   Will ask for confirmation before overwriting files, to allow overwriting, pass `--no-confirm-overwrite`. \
                   Will create parent directories if needed."),
    )
    .arg(
        Arg::new("no-confirm-overwrite")
            .long("no-confirm-overwrite")
            .action(ArgAction::SetTrue)
            .help("When set, will not ask for confirmation before overwriting files, useful for automation"),
    )
    .arg(
        Arg::new("ascii")
            .long("ascii")
            .action(ArgAction::SetTrue)
            .help("Escape every non-ASCII character as `\\u{..}`."),
    )
    .arg(
        Arg::new("utf16")
            .long("utf16")
            .action(ArgAction::SetTrue)
            .help("Write UTF-16LE with a byte order mark instead of UTF-8."),
    )
    .arg(
        Arg::new("indent")
            .long("indent")
            .value_name("N")
            .value_parser(clap::value_parser!(usize))
            .help("Indent nested blocks by N spaces (0 means one tab). Defaults to 4."),
    )
}

fn delimiter_arg() -> Arg {
    Arg::new("delimiter")
        .long("delimiter")
        .short('d')
        .value_name("CHAR")
        .value_parser(clap::value_parser!(char))
        .help("Path segment delimiter. Defaults to `/`.")
}

fn cli() -> Command {
    Command::new("bpdump")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Omer B. <omerbenamram@gmail.com>")
        .about("Utility to inspect and edit block/parameter text documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .global(true)
                .help("-v - info, -vv - debug, -vvv - trace."),
        )
        .arg(
            Arg::new("ansi-codec")
                .long("ansi-codec")
                .global(true)
                .value_name("LABEL")
                .default_value("windows-1251")
                .help("Codec for input files that have no BOM and are not valid UTF-8."),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .global(true)
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Deepest block nesting accepted when parsing. Unlimited by default."),
        )
        .subcommand(output_args(
            Command::new("fmt")
                .about("Parse a document and write it back in canonical layout")
                .arg(input_arg()),
        ))
        .subcommand(
            Command::new("get")
                .about("Print the value of a parameter")
                .long_about(indoc!(r#"
                    Print the value of a parameter addressed by a path.

                    Example:
                        bpdump get ship.txt ship/engine/speed
                        bpdump get ship.txt ship/cargo --index 1
                        bpdump get ship.txt ship/color --field 2 --delimiters ","
                "#))
                .arg(input_arg())
                .arg(Arg::new("PATH").required(true).help("Path of the parameter."))
                .arg(delimiter_arg())
                .arg(
                    Arg::new("index")
                        .long("index")
                        .short('i')
                        .value_name("N")
                        .value_parser(clap::value_parser!(usize))
                        .help("Which of several same-named parameters to print (0 is the first)."),
                )
                .arg(
                    Arg::new("field")
                        .long("field")
                        .value_name("N")
                        .value_parser(clap::value_parser!(usize))
                        .requires("delimiters")
                        .help("Print only the N-th field of the value."),
                )
                .arg(
                    Arg::new("delimiters")
                        .long("delimiters")
                        .value_name("CHARS")
                        .help("Characters separating fields, e.g. \"=,\"."),
                ),
        )
        .subcommand(output_args(
            Command::new("set")
                .about("Set (or add) a parameter and write the document back")
                .long_about(indoc!(r#"
                    Set a parameter addressed by a path. The parent blocks must exist
                    unless `--add` is passed, in which case missing blocks are created and
                    a new parameter is always appended.

                    Without `--output` the input file is rewritten in place.
                "#))
                .arg(input_arg())
                .arg(Arg::new("PATH").required(true).help("Path of the parameter."))
                .arg(Arg::new("VALUE").required(true).help("New value."))
                .arg(delimiter_arg())
                .arg(
                    Arg::new("add")
                        .long("add")
                        .action(ArgAction::SetTrue)
                        .help("Always append a new parameter, creating missing blocks."),
                ),
        ))
        .subcommand(
            Command::new("json")
                .about("Print the document as JSON")
                .arg(input_arg())
                .arg(
                    Arg::new("no-indent")
                        .long("no-indent")
                        .action(ArgAction::SetTrue)
                        .help("When set, output will not be indented."),
                ),
        )
}

fn run(matches: &ArgMatches) -> Result<()> {
    try_to_initialize_logging(matches);

    match matches.subcommand() {
        Some(("fmt", sub)) => run_fmt(sub),
        Some(("get", sub)) => run_get(sub),
        Some(("set", sub)) => run_set(sub),
        Some(("json", sub)) => run_json(sub),
        _ => Err(format_err!("unknown subcommand")),
    }
}

fn main() {
    let matches = cli().get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("{:#}", e);
        exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        cli().debug_assert();
    }

    #[test]
    fn test_save_settings_from_flags() {
        let matches = cli()
            .try_get_matches_from(["bpdump", "fmt", "in.txt", "--ascii", "--indent", "0"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let settings = save_settings(sub);

        assert!(settings.is_ascii());
        assert_eq!(settings.get_indent(), "\t");
        assert_eq!(settings.get_encoding(), OutputEncoding::Utf8);
    }
}
