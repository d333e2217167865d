// SPDX-License-Identifier: GPL-3.0-only

//! Scripted command runner for exercising the facade and driver without
//! real provisioning tools

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::exec::CommandRunner;
use crate::{Result, SysError};

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Default)]
struct Inner {
    calls: Mutex<Vec<RecordedCall>>,
    scripts: Mutex<HashMap<String, VecDeque<std::result::Result<Vec<u8>, String>>>>,
    defaults: Mutex<HashMap<String, Vec<u8>>>,
}

/// A [`CommandRunner`] that replays canned outputs.
///
/// Outputs are queued per program name and consumed in order; once a
/// queue is exhausted the program's default output applies (empty when
/// none was set). Every invocation is recorded for later assertions.
/// Clones share the same state, so tests can keep a handle after moving
/// a clone into the facade.
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    inner: Arc<Inner>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful output for the next invocation of `program`.
    pub fn push_output(&self, program: &str, output: &[u8]) {
        self.inner
            .scripts
            .lock()
            .expect("scripts lock")
            .entry(program.to_string())
            .or_default()
            .push_back(Ok(output.to_vec()));
    }

    /// Queue a failure for the next invocation of `program`.
    pub fn push_failure(&self, program: &str, message: &str) {
        self.inner
            .scripts
            .lock()
            .expect("scripts lock")
            .entry(program.to_string())
            .or_default()
            .push_back(Err(message.to_string()));
    }

    /// Set the output used whenever `program`'s queue is exhausted.
    /// Replaces any previous default.
    pub fn set_default_output(&self, program: &str, output: &[u8]) {
        self.inner
            .defaults
            .lock()
            .expect("defaults lock")
            .insert(program.to_string(), output.to_vec());
    }

    /// All invocations so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.calls.lock().expect("calls lock").clone()
    }

    /// How many times `program` was invoked.
    pub fn calls_to(&self, program: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.program == program)
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>> {
        self.inner
            .calls
            .lock()
            .expect("calls lock")
            .push(RecordedCall {
                program: program.to_string(),
                args: args.to_vec(),
            });

        let scripted = self
            .inner
            .scripts
            .lock()
            .expect("scripts lock")
            .get_mut(program)
            .and_then(VecDeque::pop_front);

        match scripted {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(SysError::CommandFailed {
                program: program.to_string(),
                args: args.to_vec(),
                output: message,
            }),
            None => Ok(self
                .inner
                .defaults
                .lock()
                .expect("defaults lock")
                .get(program)
                .cloned()
                .unwrap_or_default()),
        }
    }
}
