//! Drive a program whose prompt is known up front.
//!
//! Run with: cargo run --example explicit_prompt

use pity::{ExpectError, Session, StreamLogger};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), ExpectError> {
    let logger = Arc::new(StreamLogger::stdout().level(pity::Severity::Debug));

    let computed = Session::builder()
        .prompt("> ")
        .logger(logger)
        .run("sh", async |sh| {
            sh.send_line("PS1='> '").await?;
            sh.read_line().await?;

            sh.send_line("echo $((6 * 7))").await?;
            let answer = sh.read_line().await?;
            Ok::<_, ExpectError>(answer.lines().any(|line| line.trim() == "42"))
        })
        .await?;

    println!("\nshell computed 42: {computed}");
    Ok(())
}
