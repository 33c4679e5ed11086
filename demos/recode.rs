//! Decodes G-code and writes it back with the selected workspace frame and comments
#![deny(warnings)]

use gcodebuilder::*;
use std::{
    env,
    fs::File,
    io::{Read, Write},
};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

type Error = Box<dyn std::error::Error>;

#[derive(Debug)]
struct Args {
    input_file: String,
    workspace: String,
    line_comments: bool,
    above_comments: bool,
    body_only: bool,
}

impl Args {
    fn parse() -> Result<Args, Error> {
        let mut result = Args {
            input_file: String::new(),
            workspace: DEFAULT_WORKSPACE.to_owned(),
            line_comments: false,
            above_comments: false,
            body_only: false,
        };
        let mut positional = 0;
        let mut args = env::args();
        let cmd = args.next().unwrap_or_else(|| "recode".to_owned());
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "-h" => {
                    positional = 0;
                    break;
                }
                "-w" => {
                    result.workspace = args.next().ok_or("-w requires argument")?;
                }
                "-l" => result.line_comments = true,
                "-a" => result.above_comments = true,
                "-b" => result.body_only = true,
                _ => {
                    positional += 1;
                    match positional {
                        1 => result.input_file = arg,
                        _ => return Err("unexpected positional argument".into()),
                    }
                }
            }
        }
        if positional < 1 {
            eprintln!("Decodes G-code and writes it back with the selected workspace frame");
            eprintln!("\nUSAGE:");
            eprintln!("    {} [-w <workspace>] [-l] [-a] [-b] <file.gcode>", cmd);
            eprintln!("\nARGS:");
            eprintln!(
                "    -w <workspace>     workspace preset (default: {})",
                DEFAULT_WORKSPACE
            );
            eprintln!("    -l                 emit trailing line comments");
            eprintln!("    -a                 emit comment-only lines");
            eprintln!("    -b                 body only, without preamble and postamble");
            eprintln!("    <file.gcode>       absolute positioning G-code ('-' means stdin)");
            eprintln!("\nWORKSPACES:");
            for workspace in Workspace::registry()? {
                eprintln!("    {:<18} {}", workspace.name, workspace.description);
            }
            std::process::exit(1);
        }
        Ok(result)
    }
}

fn load(path: &str) -> Result<String, Error> {
    let mut contents = String::new();
    if path != "-" {
        let mut file = File::open(path)?;
        file.read_to_string(&mut contents)?;
    } else {
        std::io::stdin().read_to_string(&mut contents)?;
    }
    Ok(contents)
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse()?;
    let workspace = Workspace::get(&args.workspace)?;
    let contents = load(&args.input_file)?;

    let mut builder = tracing::debug_span!("[decode]")
        .in_scope(|| GCodeBuilder::from_gcode(&contents, workspace))?;
    tracing::debug!("[decode:commands] {}", builder.commands().len());
    builder.set_comments(args.line_comments, args.above_comments);
    if args.body_only {
        builder.set_preamble("").set_postamble("");
    }

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    write!(stdout, "{}", builder)?;
    Ok(())
}
