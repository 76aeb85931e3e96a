use std::path::PathBuf;

use mint::DEFAULT_MAX_CALL_DEPTH;

pub const HELP: &str = "\
Mint interpreter. Usage:
  mint [options] [FILE]

Options:
  -f, --file FILE          Run a Mint script
  --json                   Print values as JSON, one per line
  --max-call-depth N       Maximum depth of nested calls (default: 200)
  -a, --about              About Mint
  -h, --help               Show this helper

Run Mint without a file to open the REPL.";

pub const ABOUT: &str = "\
Mint is a small interpreted scripting language with first-class functions
and lexically scoped closures.";

#[derive(Debug)]
pub struct Options {
    pub file: Option<PathBuf>,
    pub json: bool,
    pub max_call_depth: usize,
}

pub enum Command {
    Run(Options),
    Help,
    About,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            file: None,
            json: false,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

pub fn parse() -> Result<Command, pico_args::Error> {
    parse_from(pico_args::Arguments::from_env())
}

fn parse_from(mut args: pico_args::Arguments) -> Result<Command, pico_args::Error> {
    if args.contains(["-h", "--help"]) {
        return Ok(Command::Help);
    }
    if args.contains(["-a", "--about"]) {
        return Ok(Command::About);
    }

    let mut options = Options::default();
    options.json = args.contains("--json");
    if let Some(depth) = args.opt_value_from_str::<_, usize>("--max-call-depth")? {
        options.max_call_depth = depth;
    }

    options.file = match args.opt_value_from_str::<_, PathBuf>(["-f", "--file"])? {
        Some(file) => Some(file),
        None => args.opt_free_from_str::<PathBuf>()?,
    };

    let remaining = args.finish();
    if !remaining.is_empty() {
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: format!("unexpected arguments: {:?}", remaining),
        });
    }

    Ok(Command::Run(options))
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    fn parse_args(args: &[&str]) -> Result<Command, pico_args::Error> {
        parse_from(pico_args::Arguments::from_vec(args.iter().map(OsString::from).collect()))
    }

    #[test]
    fn defaults_open_the_repl() -> anyhow::Result<()> {
        let Command::Run(options) = parse_args(&[])? else { anyhow::bail!("expected run options") };
        assert_eq!(options.file, None);
        assert!(!options.json);
        assert_eq!(options.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
        Ok(())
    }

    #[test]
    fn file_flag_and_free_argument() -> anyhow::Result<()> {
        let Command::Run(options) = parse_args(&["-f", "closure.mint", "--json"])? else { anyhow::bail!("expected run options") };
        assert_eq!(options.file, Some(PathBuf::from("closure.mint")));
        assert!(options.json);

        let Command::Run(options) = parse_args(&["--max-call-depth", "10", "script.mint"])? else { anyhow::bail!("expected run options") };
        assert_eq!(options.file, Some(PathBuf::from("script.mint")));
        assert_eq!(options.max_call_depth, 10);
        Ok(())
    }

    #[test]
    fn help_about_and_junk() {
        assert!(matches!(parse_args(&["--help"]), Ok(Command::Help)));
        assert!(matches!(parse_args(&["-a"]), Ok(Command::About)));
        assert!(parse_args(&["a.mint", "b.mint"]).is_err());
        assert!(parse_args(&["--max-call-depth", "lots"]).is_err());
    }
}
