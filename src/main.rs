use std::{
    fs,
    io::{self, BufRead, Write},
    path::Path,
    process::ExitCode,
};

use anyhow::Context;
use log::debug;
use mint::{EvaluationContext, JsonChannel, MintError, OutputChannel, WriterChannel};

mod options;

use options::{Command, Options};

const EXIT_KEYWORDS: [&str; 7] = ["exit", "exit;", ".exit", "quit", "quit;", ".quit", ":q"];

fn exit_code(error: &MintError) -> ExitCode {
    if error.is_syntax() {
        ExitCode::from(65)
    } else {
        ExitCode::from(70)
    }
}

fn run_file<O: OutputChannel>(context: &mut EvaluationContext<O>, path: &Path) -> anyhow::Result<ExitCode> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Cannot open source file \"{}\".", path.display()))?;

    match context.evaluate_str(&source) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            eprintln!("{}", err);
            Ok(exit_code(&err))
        }
    }
}

fn run_prompt<O: OutputChannel>(context: &mut EvaluationContext<O>) -> anyhow::Result<ExitCode> {
    let mut lines = io::stdin().lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let line = line.trim();

        if EXIT_KEYWORDS.contains(&line) {
            println!("Exiting...");
            return Ok(ExitCode::SUCCESS);
        }

        // Let a bare expression be typed without its semicolon
        let source = match line.ends_with(';') || line.ends_with('}') || line.is_empty() {
            true => line.to_owned(),
            false => format!("{};", line),
        };

        match context.evaluate_str(&source) {
            Ok(Some(value)) => println!("{}", value),
            Ok(None) => {}
            Err(err) => eprintln!("{}", err),
        }
    }

    println!();
    println!("Exiting...");
    Ok(ExitCode::SUCCESS)
}

fn run<O: OutputChannel>(context: EvaluationContext<O>, options: &Options) -> anyhow::Result<ExitCode> {
    let mut context = context.with_max_call_depth(options.max_call_depth);

    match &options.file {
        Some(path) => run_file(&mut context, path),
        None => run_prompt(&mut context),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let options = match options::parse() {
        Ok(Command::Run(options)) => options,
        Ok(Command::Help) => {
            println!("{}", options::HELP);
            return Ok(ExitCode::SUCCESS);
        }
        Ok(Command::About) => {
            println!("{}", options::ABOUT);
            return Ok(ExitCode::SUCCESS);
        }
        Err(err) => {
            eprintln!("Error: {}. Please use \"mint --help\" to show the helper.", err);
            return Ok(ExitCode::FAILURE);
        }
    };
    debug!("{:?}", options);

    if options.json {
        run(EvaluationContext::new(JsonChannel::new(io::stdout())), &options)
    } else {
        run(EvaluationContext::new(WriterChannel::stdout()), &options)
    }
}
