//! Integration tests for pity
//!
//! These drive real programs over a PTY, so they only run on unix.

#![cfg(unix)]

use pity::{
    ExpectError, LogFacade, Logger, Pattern, Session, SessionBuilder, SessionState, Signal, StopReason,
    StreamLogger, Termination,
};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

const SHELL_PROMPT: &str = "pity$ ";

fn quiet() -> Arc<dyn Logger> {
    Arc::new(StreamLogger::new(io::sink()))
}

/// A `sh` session with a predictable prompt, stopped with SIGHUP since
/// interactive shells ignore SIGTERM.
fn shell() -> SessionBuilder {
    Session::builder()
        .logger(quiet())
        .env("PS1", SHELL_PROMPT)
        .env("ENV", "/dev/null")
        .termination_signal(Signal::SIGHUP)
}

#[cfg(target_os = "linux")]
fn has_exited(pid: u32) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let gone = match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Err(_) => true,
            // Field 3 is the state; a zombie has exited but not been reaped
            Ok(stat) => stat
                .rsplit(')')
                .next()
                .and_then(|rest| rest.split_whitespace().next())
                .is_some_and(|state| state == "Z" || state == "X"),
        };
        if gone || Instant::now() >= deadline {
            return gone;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

#[tokio::test]
async fn test_echo_marker_in_shell() {
    let started = Instant::now();

    let output = shell()
        .run("sh", async |sh| {
            sh.send_line("echo marker123").await?;
            sh.expect(Pattern::exact("marker123")).await
        })
        .await
        .expect("session failed");

    assert!(output.matched());
    assert!(output.contains("marker123"));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_prompt_is_captured_from_first_output() {
    let mut session = shell().spawn("sh").await.expect("Failed to spawn sh");

    assert_eq!(session.prompt(), SHELL_PROMPT);
    assert_eq!(session.state(), SessionState::PromptCaptured);

    session.send_line("echo captured").await.unwrap();
    let output = session.read_line().await.unwrap();

    assert!(output.matched());
    assert!(output.ends_with(SHELL_PROMPT));
    assert!(output.contains("captured"));
    assert_eq!(session.state(), SessionState::Interactive);

    session.terminate().unwrap();
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_prompt_with_metacharacters_is_literal() {
    let prompt = "a.b*[x]$ ";
    let output = Session::builder()
        .logger(quiet())
        .env("PS1", prompt)
        .env("ENV", "/dev/null")
        .termination_signal(Signal::SIGHUP)
        .run("sh", async |sh| {
            assert_eq!(sh.prompt(), prompt);
            sh.send_line("echo literal").await?;
            sh.read_line().await
        })
        .await
        .unwrap();

    assert!(output.matched());
    assert!(output.ends_with(prompt));
}

#[tokio::test]
async fn test_nonexistent_executable_fails_before_interaction() {
    let started = Instant::now();
    let mut interaction_ran = false;

    let result = Session::builder()
        .logger(quiet())
        .run("/nonexistent/pity-test-binary", async |_session| {
            interaction_ran = true;
            Ok::<_, ExpectError>(())
        })
        .await;

    assert!(matches!(result, Err(ExpectError::Spawn(_))));
    assert!(!interaction_ran);
    // No prompt capture was attempted
    assert!(started.elapsed() < pity::PROMPT_CAPTURE_TIMEOUT);
}

#[tokio::test]
async fn test_explicit_prompt_skips_capture() {
    let started = Instant::now();
    let mut session = Session::builder()
        .logger(quiet())
        .prompt("> ")
        .env("ENV", "/dev/null")
        .termination_signal(Signal::SIGHUP)
        .spawn("sh")
        .await
        .expect("Failed to spawn sh");

    assert!(started.elapsed() < pity::PROMPT_CAPTURE_TIMEOUT);
    assert_eq!(session.prompt(), "> ");

    session.send_line("PS1='> '").await.unwrap();
    let output = session.read_line().await.unwrap();

    assert!(output.matched());
    assert!(output.ends_with("> "));
}

#[tokio::test]
async fn test_timeout_returns_what_was_read() {
    let mut session = shell().spawn("sh").await.unwrap();
    session.send_line("echo partial").await.unwrap();

    let timeout = Duration::from_millis(300);
    let started = Instant::now();
    let output = session
        .expect_within(Pattern::exact("NEVER_APPEARS"), timeout)
        .await
        .expect("a timeout is not an error");
    let elapsed = started.elapsed();

    assert_eq!(output.stop_reason(), StopReason::Timeout);
    assert!(output.contains("partial"));
    assert!(elapsed >= timeout);
    assert!(elapsed < timeout + pity::POLL_INTERVAL + Duration::from_millis(200));
}

#[tokio::test]
async fn test_exit_before_match_returns_early() {
    let mut session = Session::builder()
        .logger(quiet())
        .prompt("never> ")
        .spawn("echo quick")
        .await
        .unwrap();

    let started = Instant::now();
    let output = session.read_line_within(Duration::from_secs(5)).await.unwrap();

    assert_eq!(output.stop_reason(), StopReason::Eof);
    assert!(output.contains("quick"));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_regex_and_glob_patterns() {
    let mut session = shell().spawn("sh").await.unwrap();

    session.send_line("echo result=42").await.unwrap();
    let output = session
        .expect(Pattern::regex(r"result=\d+\r?\n").unwrap())
        .await
        .unwrap();
    assert!(output.matched());

    session.send_line("echo report_7.txt").await.unwrap();
    let output = session.expect(Pattern::glob("report_?.txt")).await.unwrap();
    assert!(output.matched());
}

#[tokio::test]
async fn test_empty_pattern_is_rejected() {
    let mut session = shell().spawn("sh").await.unwrap();

    let result = session.expect(Pattern::exact("")).await;
    assert!(matches!(result, Err(ExpectError::Pattern(_))));
}

#[tokio::test]
async fn test_send_control_character() {
    let mut session = shell().spawn("sh").await.unwrap();

    session.send_line("sleep 30").await.unwrap();
    session.send(&[0x03]).await.unwrap();
    let output = session.read_line().await.unwrap();

    assert!(output.matched());
}

#[tokio::test]
async fn test_terminate_twice_never_fails() {
    let mut session = Session::builder()
        .logger(quiet())
        .prompt("unused> ")
        .spawn("sleep 30")
        .await
        .unwrap();

    assert_eq!(session.terminate().unwrap(), Termination::Signalled);
    assert_eq!(session.terminate().unwrap(), Termination::AlreadyExited);
    assert_eq!(session.state(), SessionState::Terminated);
}

#[tokio::test]
async fn test_terminate_after_child_exited() {
    let mut session = Session::builder()
        .logger(quiet())
        .prompt("unused> ")
        .spawn("echo done")
        .await
        .unwrap();

    let output = session.read_line().await.unwrap();
    assert_eq!(output.stop_reason(), StopReason::Eof);

    let deadline = Instant::now() + Duration::from_secs(2);
    while session.is_alive().unwrap() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(session.terminate().unwrap(), Termination::AlreadyExited);
}

#[allow(dead_code)]
#[derive(Debug)]
enum ScriptError {
    Expect(ExpectError),
    Unexpected(String),
}

impl From<ExpectError> for ScriptError {
    fn from(e: ExpectError) -> Self {
        ScriptError::Expect(e)
    }
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_run_terminates_when_interaction_fails() {
    let mut pid = None;

    let result: Result<(), ScriptError> = Session::builder()
        .logger(quiet())
        .prompt("unused> ")
        .run("sleep 30", async |session| {
            pid = session.process_id();
            Err(ScriptError::Unexpected("assertion failed".to_string()))
        })
        .await;

    assert!(matches!(result, Err(ScriptError::Unexpected(_))));
    assert!(has_exited(pid.expect("no pid reported")));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_drop_terminates_child() {
    let session = Session::builder()
        .logger(quiet())
        .prompt("unused> ")
        .spawn("sleep 30")
        .await
        .unwrap();
    let pid = session.process_id().unwrap();

    drop(session);

    assert!(has_exited(pid));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_independent_sessions_share_a_logger() {
    let logger: Arc<dyn Logger> = Arc::new(StreamLogger::new(io::sink()));

    let tasks: Vec<_> = (0..2)
        .map(|n| {
            let builder = shell().logger(Arc::clone(&logger));
            tokio::spawn(async move {
                let mut session = builder.spawn("sh").await?;
                session.send_line(&format!("echo session{n}")).await?;
                let output = session.read_line().await?;
                session.terminate()?;
                Ok::<_, ExpectError>(output.into_string())
            })
        })
        .collect();

    for (n, task) in tasks.into_iter().enumerate() {
        let text = task.await.unwrap().unwrap();
        assert!(text.contains(&format!("session{n}")));
    }
}

#[tokio::test]
async fn test_log_facade_session_under_env_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_module("pity", log::LevelFilter::Debug)
        .try_init();

    let output = shell()
        .logger(Arc::new(LogFacade))
        .run("sh", async |sh| {
            sh.send_line("echo via_facade").await?;
            sh.read_line().await
        })
        .await
        .expect("session failed");

    assert!(output.contains("via_facade"));
}
