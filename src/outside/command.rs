use std::process::{Command, Output, Stdio};

use bitflags::bitflags;
use tracing::{debug, trace, Level};

use crate::result::{Error, Result};

pub const YT_DL: &str = "youtube-dl";
pub const YT_DLP: &str = "yt-dlp";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capture: u8 {
        const STDIN = 0b0000001;
        const STDOUT = 0b0000010;
        const STDERR = 0b0000100;
    }
}

impl Capture {
    /// Pipe the stream when it is wanted, silence it otherwise
    fn stdio(self, stream: Capture, verbose: bool) -> Stdio {
        if verbose || self.contains(stream) {
            Stdio::piped()
        } else {
            Stdio::null()
        }
    }
}

/// Spawn `program`, configured by `f`, and wait for it to exit.
///
/// Only the streams named in `capture` are piped back to the caller, the others go to
/// the null device. With debug logging on, stdout and stderr are always piped so that
/// they can be logged.
///
/// A non-zero exit status is not an error here: `Err` means the program could not be run.
pub fn run_command<F: FnOnce(&mut Command) -> &mut Command>(
    program: &str,
    f: F,
    capture: Capture,
) -> std::io::Result<Output> {
    let verbose = tracing::enabled!(Level::DEBUG);

    let mut cmd = Command::new(program);
    f(&mut cmd)
        .stdin(capture.stdio(Capture::STDIN, false))
        .stdout(capture.stdio(Capture::STDOUT, verbose))
        .stderr(capture.stdio(Capture::STDERR, verbose));

    debug!("Running {cmd:?}");
    let output = cmd.output()?;
    if verbose {
        log_output(program, &output);
    }

    Ok(output)
}

fn log_output(program: &str, output: &Output) {
    debug!(
        "{program} exited with {} ({} bytes on stdout, {} on stderr)",
        output.status,
        output.stdout.len(),
        output.stderr.len()
    );
    for (name, stream) in [("stdout", &output.stdout), ("stderr", &output.stderr)] {
        if !stream.is_empty() {
            trace!("{program} {name}: {}", String::from_utf8_lossy(stream));
        }
    }
}

/// Run the command and verify that it has returned a success status code.
pub fn assert_success_command<F: FnOnce(&mut Command) -> &mut Command>(
    program: &'static str,
    f: F,
) -> Result<()> {
    let res = run_command(program, f, Capture::empty())?;
    if res.status.success() {
        Ok(())
    } else {
        Err(Error::CommandFailed {
            program,
            status: res.status,
        })
    }
}
