//! Line-oriented command interpreter driving one queue handle.
//!
//! Each line is a command followed by whitespace-separated arguments; lines starting with `#`
//! are comments. After every command the interpreter walks the queue and checks the chain against
//! the handle's bookkeeping, so scripts double as consistency tests:
//!
//! ```text
//! new
//! it a
//! it b
//! ih c
//! size
//! rh c
//! reverse
//! rh b
//! rh a
//! ```
//!
//! A check that fails counts as an error. Once [`Config::error_limit`] errors have piled up, the
//! rest of the script is skipped.

use std::{
    fmt,
    io::{self, BufRead, Write},
};

use thiserror::Error;

use crate::{fault, handle, Queue};

/// How many values `show` prints before eliding the rest.
const SHOW_LIMIT: usize = 20;

const HELP: &str = "\
Commands:
  new                  create a new queue, releasing the current one
  free                 release the current queue
  ih STR [N]           insert STR at the head, N times
  it STR [N]           insert STR at the tail, N times
  rh [STR]             remove the head, optionally comparing it with STR
  rhq                  remove the head without looking at it
  reverse              reverse the queue
  size [N]             print the size, computing it N times
  show                 print the queue
  option NAME VALUE    set `length`, `fail` or `error_limit`
  help                 print this text
  quit                 stop reading commands";

#[derive(Debug, Clone)]
pub struct Config {
    /// Size of the buffer `rh` removes into, terminator included.
    pub buffer_len: usize,
    /// Stop interpreting after this many errors.
    pub error_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_len: 1024,
            error_limit: 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("unknown option `{0}`")]
    UnknownOption(String),

    #[error("`{command}` needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("`{0}` is not a valid number")]
    InvalidNumber(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Interpreter<W> {
    queue: Option<Box<Queue>>,
    config: Config,
    errors: usize,
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Self::with_config(out, Config::default())
    }

    pub fn with_config(out: W, config: Config) -> Self {
        Self {
            queue: None,
            config,
            errors: 0,
            out,
        }
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn queue(&self) -> Option<&Queue> {
        self.queue.as_deref()
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs every command in `input` and returns how many errors were counted. Malformed commands
    /// are reported and counted like failed checks; only I/O errors end the run early.
    pub fn run(&mut self, input: impl BufRead) -> Result<usize, ScriptError> {
        let outcome = self.run_lines(input);
        fault::disarm();
        outcome?;
        Ok(self.errors)
    }

    fn run_lines(&mut self, input: impl BufRead) -> Result<(), ScriptError> {
        for line in input.lines() {
            let line = line?;
            writeln!(self.out, "cmd> {line}")?;

            match self.execute(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(ScriptError::Io(err)) => return Err(err.into()),
                Err(err) => self.error(err)?,
            }
            self.audit()?;

            if self.errors >= self.config.error_limit {
                writeln!(self.out, "Error limit exceeded. Stopping command execution")?;
                break;
            }
        }
        Ok(())
    }

    pub fn execute(&mut self, line: &str) -> Result<Flow, ScriptError> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Flow::Continue);
        };
        if command.starts_with('#') {
            return Ok(Flow::Continue);
        }
        let args: Vec<&str> = words.collect();
        tracing::trace!(command, ?args, "executing");

        match command {
            "new" => self.new_queue()?,
            "free" => {
                handle::free(self.queue.take());
                self.show()?;
            }
            "ih" => self.insert("ih", &args, handle::insert_head)?,
            "it" => self.insert("it", &args, handle::insert_tail)?,
            "rh" => self.remove(args.first().copied())?,
            "rhq" => self.remove_quietly()?,
            "reverse" => {
                handle::reverse(self.queue.as_deref_mut());
                self.show()?;
            }
            "size" => {
                let repeat = parse_count(args.first().copied())?;
                let size = handle::size(self.queue.as_deref());
                for _ in 1..repeat {
                    if handle::size(self.queue.as_deref()) != size {
                        self.error("size changed between repeated queries")?;
                        break;
                    }
                }
                writeln!(self.out, "Queue size = {size}")?;
            }
            "show" => self.show()?,
            "option" => self.set_option(&args)?,
            "help" => writeln!(self.out, "{HELP}")?,
            "quit" => return Ok(Flow::Quit),
            other => return Err(ScriptError::UnknownCommand(other.to_owned())),
        }
        Ok(Flow::Continue)
    }

    fn new_queue(&mut self) -> Result<(), ScriptError> {
        handle::free(self.queue.take());
        let injected = fault::is_armed();
        self.queue = handle::new();
        match (self.queue.is_some(), injected) {
            (true, _) => {}
            (false, true) => {
                writeln!(self.out, "construction failed, allocation failure was injected")?
            }
            (false, false) => self.error("construction failed unexpectedly")?,
        }
        self.show()
    }

    fn insert(
        &mut self,
        command: &'static str,
        args: &[&str],
        op: fn(Option<&mut Queue>, &str) -> bool,
    ) -> Result<(), ScriptError> {
        let value = args.first().ok_or(ScriptError::MissingArgument {
            command,
            what: "a value",
        })?;
        let repeat = parse_count(args.get(1).copied())?;

        for _ in 0..repeat {
            let injected = fault::is_armed();
            if !op(self.queue.as_deref_mut(), value) {
                self.insertion_failed(injected)?;
                break;
            }
        }
        self.show()
    }

    fn remove(&mut self, expected: Option<&str>) -> Result<(), ScriptError> {
        let mut buf = vec![0; self.config.buffer_len];

        if handle::remove_head(self.queue.as_deref_mut(), Some(buf.as_mut_slice())) {
            let removed = String::from_utf8_lossy(terminated(&buf)).into_owned();
            writeln!(self.out, "Removed {removed} from queue")?;
            if let Some(expected) = expected.filter(|&expected| expected != removed) {
                self.error(format_args!(
                    "removed value {removed} does not match expected value {expected}"
                ))?;
            }
        } else {
            self.removal_failed(expected.is_some())?;
        }
        self.show()
    }

    fn remove_quietly(&mut self) -> Result<(), ScriptError> {
        if handle::remove_head(self.queue.as_deref_mut(), None) {
            writeln!(self.out, "Removed element from queue")?;
        } else {
            self.removal_failed(false)?;
        }
        self.show()
    }

    fn removal_failed(&mut self, expected_value: bool) -> io::Result<()> {
        let why = match self.queue.as_deref().map(Queue::is_empty) {
            None => "queue is NULL",
            Some(true) => "queue is empty",
            Some(false) => return self.error("removal from non-empty queue failed"),
        };
        if expected_value {
            self.error(format_args!("removal failed, {why}"))
        } else {
            writeln!(self.out, "Removal failed, {why}")
        }
    }

    /// Failing on a missing queue, or while an allocation failure was armed, is expected;
    /// anything else counts as an error.
    fn insertion_failed(&mut self, injected: bool) -> io::Result<()> {
        if injected {
            writeln!(self.out, "insertion failed, allocation failure was injected")
        } else if self.queue.is_none() {
            writeln!(self.out, "insertion failed, queue is NULL")
        } else {
            self.error("insertion failed unexpectedly")
        }
    }

    fn set_option(&mut self, args: &[&str]) -> Result<(), ScriptError> {
        let (Some(&name), Some(&value)) = (args.first(), args.get(1)) else {
            return Err(ScriptError::MissingArgument {
                command: "option",
                what: "a name and a value",
            });
        };
        let value = parse_number(value)?;

        match name {
            "length" => self.config.buffer_len = value,
            "fail" => fault::fail_after(value),
            "error_limit" => self.config.error_limit = value,
            other => return Err(ScriptError::UnknownOption(other.to_owned())),
        }
        writeln!(self.out, "{name} = {value}")?;
        Ok(())
    }

    fn show(&mut self) -> Result<(), ScriptError> {
        let Some(queue) = self.queue.as_deref() else {
            writeln!(self.out, "q = NULL")?;
            return Ok(());
        };

        write!(self.out, "q = [")?;
        for (i, value) in queue.iter().take(SHOW_LIMIT).enumerate() {
            if i > 0 {
                write!(self.out, " ")?;
            }
            write!(self.out, "{value}")?;
        }
        if queue.len() > SHOW_LIMIT {
            write!(self.out, " ...")?;
        }
        writeln!(self.out, "]")?;
        Ok(())
    }

    fn audit(&mut self) -> io::Result<()> {
        match self.queue.as_deref().map(Queue::audit) {
            Some(Err(violation)) => self.error(format_args!("inconsistent queue: {violation}")),
            _ => Ok(()),
        }
    }

    fn error(&mut self, message: impl fmt::Display) -> io::Result<()> {
        self.errors += 1;
        tracing::warn!(%message, errors = self.errors, "check failed");
        writeln!(self.out, "ERROR: {message}")
    }
}

fn parse_number(word: &str) -> Result<usize, ScriptError> {
    word.parse()
        .map_err(|_| ScriptError::InvalidNumber(word.to_owned()))
}

fn parse_count(word: Option<&str>) -> Result<usize, ScriptError> {
    word.map_or(Ok(1), parse_number)
}

/// The part of `buf` before its first NUL, or all of it if there is none.
fn terminated(buf: &[u8]) -> &[u8] {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    &buf[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Outcome {
        errors: usize,
        len: Option<usize>,
        output: String,
    }

    fn run(script: &str) -> Outcome {
        let mut interpreter = Interpreter::new(Vec::new());
        let errors = interpreter.run(script.as_bytes()).unwrap();
        let len = interpreter.queue().map(Queue::len);
        let output = String::from_utf8(interpreter.into_output()).unwrap();
        Outcome {
            errors,
            len,
            output,
        }
    }

    #[test]
    fn scripted_scenario() {
        let Outcome {
            errors,
            len,
            output,
        } = run("new\nit a\nit b\nih c\nsize\nrh c\nreverse\nrh b\nrh a\nsize\n");
        assert_eq!(errors, 0, "{output}");
        assert!(output.contains("q = [c a b]"));
        assert!(output.contains("q = [b a]"));
        assert!(output.contains("Queue size = 3"));
        assert!(output.contains("Queue size = 0"));
        assert_eq!(len, Some(0));
    }

    #[test]
    fn comments_and_blank_lines() {
        let Outcome { errors, output, .. } = run("# setup\n\n   \nnew\nih x 3\nshow\n");
        assert_eq!(errors, 0, "{output}");
        assert!(output.contains("q = [x x x]"));
    }

    #[test]
    fn mismatched_removal_is_an_error() {
        let Outcome { errors, output, .. } = run("new\nit a\nrh b\n");
        assert_eq!(errors, 1);
        assert!(output.contains("does not match expected value b"));
    }

    #[test]
    fn removal_from_empty_queue() {
        let Outcome { errors, output, .. } = run("new\nrh\nrhq\n");
        assert_eq!(errors, 0, "{output}");
        assert!(output.contains("Removal failed, queue is empty"));

        let Outcome { errors, .. } = run("new\nrh a\n");
        assert_eq!(errors, 1);
    }

    #[test]
    fn null_queue_operations_are_not_errors() {
        let Outcome {
            errors,
            len,
            output,
        } = run("free\nih x\nit y\nrhq\nreverse\nsize\nshow\n");
        assert_eq!(errors, 0, "{output}");
        assert!(output.contains("insertion failed, queue is NULL"));
        assert!(output.contains("Queue size = 0"));
        assert!(len.is_none());
    }

    #[test]
    fn injected_failures_are_expected() {
        let Outcome { errors, output, .. } =
            run("new\nit kept\noption fail 1\nit lost\nshow\nit again\n");
        assert_eq!(errors, 0, "{output}");
        assert!(output.contains("insertion failed, allocation failure was injected"));
        assert!(output.contains("q = [kept again]"));
    }

    #[test]
    fn injected_failure_during_construction() {
        let Outcome {
            errors,
            len,
            output,
        } = run("option fail 0\nnew\nih x\n");
        assert_eq!(errors, 0, "{output}");
        assert!(output.contains("construction failed, allocation failure was injected"));
        assert!(len.is_none());
    }

    #[test]
    fn short_buffer_truncates() {
        let Outcome { errors, output, .. } = run("new\nit hello\noption length 3\nrh\n");
        assert_eq!(errors, 0, "{output}");
        assert!(output.contains("Removed he from queue"));
    }

    #[test]
    fn bad_commands_are_counted() {
        let Outcome { errors, output, .. } =
            run("new\nfrobnicate\nih\nsize many\noption colour 3\nshow\n");
        assert_eq!(errors, 4);
        assert!(output.contains("unknown command `frobnicate`"));
        assert!(output.contains("`ih` needs a value"));
        assert!(output.contains("`many` is not a valid number"));
        assert!(output.contains("unknown option `colour`"));
        assert!(output.contains("cmd> show"));
    }

    #[test]
    fn error_limit_stops_execution() {
        let Outcome {
            errors,
            len,
            output,
        } = run("option error_limit 2\nbogus\nbogus\nnew\n");
        assert_eq!(errors, 2);
        assert!(output.contains("Error limit exceeded"));
        assert!(!output.contains("cmd> new"));
        assert!(len.is_none());
    }

    #[test]
    fn quit_stops_reading() {
        let Outcome { len, output, .. } = run("new\nquit\nih never\n");
        assert!(!output.contains("never"));
        assert_eq!(len, Some(0));
    }

    #[test]
    fn size_reports_the_count_for_any_repetition() {
        let Outcome { errors, output, .. } = run("new\nit a\nit b\nsize 0\nsize 3\n");
        assert_eq!(errors, 0, "{output}");
        assert_eq!(output.matches("Queue size = 2").count(), 2);
        assert!(!output.contains("Queue size = 0"));
    }

    #[test]
    fn long_queues_are_elided() {
        let Outcome { output, .. } = run("new\nit v 25\n");
        assert!(output.contains(" ...]"));
    }

    #[test]
    fn terminated_stops_at_nul() {
        assert_eq!(terminated(b"ab\0cd"), b"ab");
        assert_eq!(terminated(b"abc"), b"abc");
        assert_eq!(terminated(b""), b"");
    }
}
