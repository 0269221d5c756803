//! The dispatch loop.
//!
//! An [`Interpreter`] owns one run's worth of state: program counter, pointer,
//! tape and output buffer. [`Interpreter::run`] steps until the program ends,
//! a fatal error occurs, or its [`CancelToken`] is triggered, and always hands
//! back whatever output was produced.

use std::fmt;
use std::mem;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tracing::{debug, info, trace, warn};

use crate::config::ExecConfig;
use crate::error::ExecError;
use crate::io::{ByteInput, InputSource};
use crate::loop_index::LoopMap;
use crate::program::{Op, Program};
use crate::tape::Tape;

/// Shared flag for cooperative cancellation.
///
/// Clones observe the same flag, so a clone can be handed to a signal handler
/// or a watchdog thread while the interpreter runs elsewhere.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Mutable state of a single run.
#[derive(Debug, Clone)]
pub struct ExecState {
    pc: usize,
    pointer: isize,
    tape: Tape,
    output: Vec<u8>,
    steps: u64,
}

impl ExecState {
    fn new(tape: Tape) -> Self {
        Self {
            pc: 0,
            pointer: 0,
            tape,
            output: Vec::new(),
            steps: 0,
        }
    }

    /// Index of the next instruction.
    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn pointer(&self) -> isize {
        self.pointer
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Value of the cell under the pointer.
    pub fn cell(&self) -> u8 {
        self.tape.read(self.pointer)
    }

    /// Output produced so far in the current run.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Completed steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

/// State observed right after one step, for debug tracing.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    /// 1-based count of completed steps.
    pub step: u64,
    /// Index of the instruction that just ran.
    pub pc: usize,
    pub op: Op,
    pub pointer: isize,
    pub cell: u8,
    pub output: &'a [u8],
}

/// How a run ended.
#[derive(Debug)]
pub enum ExecutionResult {
    Completed { output: Vec<u8> },
    Cancelled { output: Vec<u8> },
    Failed { error: ExecError, output: Vec<u8> },
}

impl ExecutionResult {
    /// Output produced before the run ended, whatever the outcome.
    pub fn output(&self) -> &[u8] {
        match self {
            ExecutionResult::Completed { output }
            | ExecutionResult::Cancelled { output }
            | ExecutionResult::Failed { output, .. } => output,
        }
    }

    /// The output rendered as text, one character per byte.
    pub fn output_text(&self) -> String {
        render_output(self.output())
    }

    pub fn error(&self) -> Option<&ExecError> {
        match self {
            ExecutionResult::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ExecutionResult::Completed { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecutionResult::Cancelled { .. })
    }
}

/// Render output bytes as characters with the same code.
pub fn render_output(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

type OutputSink = Box<dyn FnMut(u8) + Send>;
type TraceObserver = Box<dyn FnMut(&Snapshot<'_>) + Send>;

/// A Brainfuck interpreter for one program.
pub struct Interpreter {
    program: Program,
    loops: LoopMap,
    config: ExecConfig,
    state: ExecState,
    input: Box<dyn InputSource>,
    output_sink: Option<OutputSink>,
    observer: Option<TraceObserver>,
    cancel: CancelToken,
    step_warning_issued: bool,
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("program", &self.program.to_string())
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Interpreter {
    /// Prepare `program` for execution.
    ///
    /// Fails before anything runs if the configuration is invalid or the
    /// brackets do not balance. Input defaults to stdin, one byte per `,`.
    pub fn new(program: Program, config: ExecConfig) -> Result<Self, ExecError> {
        config.validate()?;
        let loops = LoopMap::build(&program)?;
        let tape = Tape::new(config.tape)?;
        Ok(Self {
            program,
            loops,
            config,
            state: ExecState::new(tape),
            input: Box::new(ByteInput::stdin()),
            output_sink: None,
            observer: None,
            cancel: CancelToken::new(),
            step_warning_issued: false,
        })
    }

    /// Filter `source` and prepare it for execution.
    pub fn from_source(source: &str, config: ExecConfig) -> Result<Self, ExecError> {
        Self::new(Program::from_source(source), config)
    }

    /// Replace the source that `,` reads from.
    pub fn set_input<I>(&mut self, input: I)
    where
        I: InputSource + 'static,
    {
        self.input = Box::new(input);
    }

    /// Stream each output byte to `sink` as it is produced, in addition to
    /// buffering it.
    pub fn set_output_sink<F>(&mut self, sink: F)
    where
        F: FnMut(u8) + Send + 'static,
    {
        self.output_sink = Some(Box::new(sink));
    }

    /// Receive a [`Snapshot`] after every step while `debug` is enabled.
    ///
    /// Without an observer, debug snapshots are emitted as `trace` events.
    pub fn set_trace_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&Snapshot<'_>) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    /// Use `token` to stop this interpreter.
    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = token;
    }

    /// A handle that cancels this interpreter when triggered.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn loops(&self) -> &LoopMap {
        &self.loops
    }

    pub fn state(&self) -> &ExecState {
        &self.state
    }

    /// Whether the long-run advisory has been emitted.
    pub fn step_warning_issued(&self) -> bool {
        self.step_warning_issued
    }

    /// Run until the program ends, fails, or is cancelled.
    ///
    /// Cancellation is checked before every step, so at most the step in
    /// flight completes after it is requested. The output buffer is moved into
    /// the result.
    pub fn run(&mut self) -> ExecutionResult {
        debug!(
            instructions = self.program.len(),
            loops = self.loops.loop_count(),
            tape_size = ?self.config.tape.size,
            wrap = self.config.tape.wrap,
            "run started"
        );

        let failure = loop {
            if self.cancel.is_cancelled() {
                let output = mem::take(&mut self.state.output);
                info!(steps = self.state.steps, output_len = output.len(), "run cancelled");
                return ExecutionResult::Cancelled { output };
            }
            if self.state.pc >= self.program.len() {
                break None;
            }
            if let Some(limit) = self.config.max_steps {
                if self.state.steps >= limit {
                    break Some(ExecError::StepLimitExceeded { limit });
                }
            }
            if let Err(error) = self.step() {
                break Some(error);
            }
        };

        let output = mem::take(&mut self.state.output);
        match failure {
            None => {
                debug!(steps = self.state.steps, output_len = output.len(), "run completed");
                ExecutionResult::Completed { output }
            }
            Some(error) => {
                debug!(steps = self.state.steps, %error, "run failed");
                ExecutionResult::Failed { error, output }
            }
        }
    }

    /// Execute the instruction at the program counter.
    ///
    /// Returns the executed op, or `None` once the program has ended. On error
    /// the state is left as it was before the step.
    pub fn step(&mut self) -> Result<Option<Op>, ExecError> {
        let ip = self.state.pc;
        let Some(op) = self.program.get(ip) else {
            return Ok(None);
        };
        let ptr = self.state.pointer;

        match op {
            Op::Right => {
                self.state.pointer = self.state.tape.advance(ptr, 1).map_err(|e| e.at(ip))?;
            }
            Op::Left => {
                self.state.pointer = self.state.tape.advance(ptr, -1).map_err(|e| e.at(ip))?;
            }
            Op::Inc => {
                self.state.tape.increment(ptr);
            }
            Op::Dec => {
                self.state.tape.decrement(ptr);
            }
            Op::Output => {
                let byte = self.state.tape.read(ptr);
                self.state.output.push(byte);
                if let Some(sink) = self.output_sink.as_mut() {
                    sink(byte);
                }
            }
            Op::Input => {
                let read = self
                    .input
                    .read_char()
                    .map_err(|source| ExecError::Io { ip, source })?;
                // EOF stores 0
                self.state.tape.write(ptr, read.unwrap_or(0));
            }
            Op::LoopStart => {
                if self.state.tape.read(ptr) == 0 {
                    if let Some(close) = self.loops.partner(ip) {
                        self.state.pc = close;
                    }
                }
            }
            Op::LoopEnd => {
                if self.state.tape.read(ptr) != 0 {
                    if let Some(open) = self.loops.partner(ip) {
                        self.state.pc = open;
                    }
                }
            }
        }

        // A taken branch lands on the partner bracket; this moves past it.
        self.state.pc += 1;
        self.state.steps += 1;

        if let Some(threshold) = self.config.step_warning_threshold {
            if !self.step_warning_issued && self.state.steps >= threshold {
                self.step_warning_issued = true;
                warn!(
                    steps = self.state.steps,
                    "program has not halted after {} steps; it may run forever", self.state.steps
                );
            }
        }

        if self.config.debug {
            let snapshot = Snapshot {
                step: self.state.steps,
                pc: ip,
                op,
                pointer: self.state.pointer,
                cell: self.state.tape.read(self.state.pointer),
                output: &self.state.output,
            };
            match self.observer.as_mut() {
                Some(observer) => observer(&snapshot),
                None => trace!(
                    step = snapshot.step,
                    pc = snapshot.pc,
                    op = %snapshot.op,
                    ptr = snapshot.pointer,
                    cell = snapshot.cell,
                    output = %render_output(snapshot.output),
                    "step"
                ),
            }
        }

        Ok(Some(op))
    }
}

/// Filter, prepare and run `source` in one call.
///
/// Construction errors come back as `Failed` with empty output.
pub fn execute<I>(source: &str, config: ExecConfig, input: I) -> ExecutionResult
where
    I: InputSource + 'static,
{
    match Interpreter::from_source(source, config) {
        Ok(mut interpreter) => {
            interpreter.set_input(input);
            interpreter.run()
        }
        Err(error) => ExecutionResult::Failed {
            error,
            output: Vec::new(),
        },
    }
}
