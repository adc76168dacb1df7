//! CLI tool for driving an interactive program from the command line.
//!
//! ```text
//! pity --send "echo hello" --send "exit" -- bash --norc
//! ```
//!
//! The transcript is written to stdout as it is read. The exit status is
//! non-zero if any response did not end with the prompt (or match `--expect`).

use anyhow::{bail, Context, Result};
use clap::Parser;
use pity::{Logger, Pattern, Session, Severity, StreamLogger};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pity")]
#[command(author, version, about = "Drive an interactive program over a pseudo-terminal", long_about = None)]
struct Args {
    /// Prompt to wait for (default: the program's first line of output)
    #[arg(short, long)]
    prompt: Option<String>,

    /// Line to send; repeat for several lines
    #[arg(short = 's', long = "send", value_name = "LINE")]
    lines: Vec<String>,

    /// Regex each response must match instead of ending with the prompt
    #[arg(short, long)]
    expect: Option<String>,

    /// Seconds to wait for each response
    #[arg(short, long, default_value_t = 5.0)]
    timeout: f64,

    /// Signal sent to the program at the end (e.g. SIGHUP for interactive shells)
    #[cfg(unix)]
    #[arg(long, default_value = "SIGTERM")]
    signal: pity::Signal,

    /// Also log lifecycle details
    #[arg(short, long)]
    debug: bool,

    /// Program to run, with its arguments
    #[arg(required = true, trailing_var_arg = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let timeout = Duration::try_from_secs_f64(args.timeout)
        .with_context(|| format!("Invalid timeout: {}", args.timeout))?;
    let expect = args
        .expect
        .as_deref()
        .map(Pattern::regex)
        .transpose()
        .context("Invalid --expect pattern")?;

    let level = if args.debug {
        Severity::Debug
    } else {
        Severity::Info
    };
    let logger: Arc<dyn Logger> = Arc::new(StreamLogger::stdout().level(level));

    let mut builder = Session::builder().timeout(timeout).logger(logger);
    if let Some(prompt) = args.prompt {
        builder = builder.prompt(prompt);
    }
    #[cfg(unix)]
    {
        builder = builder.termination_signal(args.signal);
    }

    let command = args.command.join(" ");
    let unmatched = builder
        .run(&command, async |session| {
            let mut unmatched = 0usize;
            for line in &args.lines {
                session.send_line(line).await?;
                let output = match &expect {
                    Some(pattern) => session.expect(pattern.clone()).await?,
                    None => session.read_line().await?,
                };
                if !output.matched() {
                    unmatched += 1;
                }
            }
            Ok::<_, anyhow::Error>(unmatched)
        })
        .await
        .with_context(|| format!("Session with `{command}` failed"))?;

    println!();
    if unmatched > 0 {
        bail!("{unmatched} response(s) did not match");
    }
    Ok(())
}
