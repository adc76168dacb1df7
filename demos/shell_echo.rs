//! Spawn a shell, let pity capture its prompt, and echo a marker.
//!
//! Run with: cargo run --example shell_echo

use pity::{ExpectError, Pattern, Session};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), ExpectError> {
    let builder = Session::builder().timeout(Duration::from_secs(5));
    #[cfg(unix)]
    let builder = builder.termination_signal(pity::Signal::SIGHUP);

    builder
        .run("bash --norc --noprofile", async |bash| {
            println!("\n[captured prompt: {:?}]", bash.prompt());

            bash.send_line("echo marker123").await?;
            let output = bash.expect(Pattern::exact("marker123")).await?;
            println!("\n[matched: {}]", output.matched());

            bash.send_line("uname -s").await?;
            let output = bash.read_line().await?;
            println!("\n[stopped because: {:?}]", output.stop_reason());
            Ok(())
        })
        .await
}
