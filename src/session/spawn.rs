//! Process launching and termination

use super::stream::{InputStream, OutputStream};
use crate::logger::Logger;
use crate::result::ExpectError;
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use std::sync::Arc;

#[cfg(unix)]
use nix::sys::signal::Signal;

/// Outcome of a termination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The termination signal was delivered.
    Signalled,
    /// The process had already exited; nothing was sent.
    AlreadyExited,
}

/// How the child is asked to stop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StopWith {
    #[cfg(unix)]
    pub(crate) signal: Signal,
}

impl Default for StopWith {
    fn default() -> Self {
        Self {
            #[cfg(unix)]
            signal: Signal::SIGTERM,
        }
    }
}

/// A child process attached to a PTY, plus both ends of the terminal.
///
/// Dropping a `Terminal` that was never terminated sends the termination
/// signal, so the child is cleaned up on every exit path.
pub(crate) struct Terminal {
    output: OutputStream,
    pub(crate) input: InputStream,
    child: Box<dyn Child + Send>,
    pid: Option<u32>,
    stop_with: StopWith,
    logger: Arc<dyn Logger>,
    terminated: bool,
    // Keeps the master side open for the lifetime of the session
    _master: Box<dyn MasterPty + Send>,
}

impl Terminal {
    /// Allocate a PTY and start `command` on it.
    pub(crate) fn launch(
        command: &str,
        env: &[(String, String)],
        pty_size: PtySize,
        read_chunk_size: usize,
        stop_with: StopWith,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, ExpectError> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        let Some((program, args)) = parts.split_first() else {
            return Err(ExpectError::Spawn("Empty command".to_string()));
        };

        let mut cmd = CommandBuilder::new(program);
        cmd.args(args);
        for (key, value) in env {
            cmd.env(key, value);
        }

        let pty_pair = native_pty_system()
            .openpty(pty_size)
            .map_err(|e| ExpectError::Pty(e.to_string()))?;

        let mut child = pty_pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| ExpectError::Spawn(e.to_string()))?;

        // Only the child may hold the slave, otherwise the output never reaches EOF
        drop(pty_pair.slave);
        let master = pty_pair.master;

        let streams = master
            .try_clone_reader()
            .and_then(|reader| Ok((reader, master.take_writer()?)))
            .map_err(|e| ExpectError::Pty(e.to_string()))
            .and_then(|(reader, writer)| {
                let output = OutputStream::pump(reader, read_chunk_size)?;
                Ok((output, InputStream::new(writer)))
            });

        let (output, input) = match streams {
            Ok(streams) => streams,
            Err(e) => {
                let _ = child.kill();
                return Err(e);
            }
        };

        let pid = child.process_id();
        logger.debug(&format!(
            "Spawned process with PID {} using command: {command}",
            describe_pid(pid)
        ));

        Ok(Self {
            output,
            input,
            child,
            pid,
            stop_with,
            logger,
            terminated: false,
            _master: master,
        })
    }

    pub(crate) fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub(crate) fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    /// The output stream together with the logger, borrowed at once
    pub(crate) fn reader(&mut self) -> (&mut OutputStream, &dyn Logger) {
        (&mut self.output, self.logger.as_ref())
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Check if the child process is still running
    pub(crate) fn is_alive(&mut self) -> Result<bool, ExpectError> {
        match self.child.try_wait() {
            Ok(Some(_)) => Ok(false),
            Ok(None) => Ok(true),
            Err(e) => Err(ExpectError::Io(e)),
        }
    }

    /// Ask the child to stop. Only the first call does anything.
    ///
    /// Does not wait for the process to actually exit.
    pub(crate) fn terminate(&mut self) -> Result<Termination, ExpectError> {
        if self.terminated {
            self.logger.debug(&format!(
                "Process {} was already terminated.",
                describe_pid(self.pid)
            ));
            return Ok(Termination::AlreadyExited);
        }
        self.terminated = true;

        let outcome = match self.child.try_wait() {
            Ok(Some(_)) => Ok(Termination::AlreadyExited),
            _ => self.send_stop(),
        }?;

        let message = match outcome {
            Termination::Signalled => {
                format!("Terminated process with PID {}", describe_pid(self.pid))
            }
            Termination::AlreadyExited => format!(
                "Process {} was already terminated.",
                describe_pid(self.pid)
            ),
        };
        self.logger.debug(&message);

        Ok(outcome)
    }

    #[cfg(unix)]
    fn send_stop(&mut self) -> Result<Termination, ExpectError> {
        match self.pid {
            Some(pid) => signal_process(pid, self.stop_with.signal),
            None => self.kill_child(),
        }
    }

    #[cfg(not(unix))]
    fn send_stop(&mut self) -> Result<Termination, ExpectError> {
        self.kill_child()
    }

    fn kill_child(&mut self) -> Result<Termination, ExpectError> {
        match self.child.kill() {
            Ok(()) => Ok(Termination::Signalled),
            Err(e) => match self.child.try_wait() {
                Ok(Some(_)) => Ok(Termination::AlreadyExited),
                _ => Err(ExpectError::Io(e)),
            },
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if !self.terminated {
            if let Err(e) = self.terminate() {
                self.logger.debug(&format!("Cleanup failed: {e}"));
            }
        }
    }
}

/// Send `signal` to `pid`, treating "no such process" as already exited.
#[cfg(unix)]
pub(crate) fn signal_process(pid: u32, signal: Signal) -> Result<Termination, ExpectError> {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|_| ExpectError::Signal {
        pid,
        reason: "PID out of range".to_string(),
    })?;

    match kill(Pid::from_raw(raw), signal) {
        Ok(()) => Ok(Termination::Signalled),
        Err(Errno::ESRCH) => Ok(Termination::AlreadyExited),
        Err(errno) => Err(ExpectError::Signal {
            pid,
            reason: errno.desc().to_string(),
        }),
    }
}

fn describe_pid(pid: Option<u32>) -> String {
    pid.map_or_else(|| "<unknown>".to_string(), |pid| pid.to_string())
}
