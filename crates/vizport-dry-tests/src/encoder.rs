// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fake external encoder.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use vizport_render::{EncoderCommand, EncoderOutput, ExternalEncoder};

struct Inner {
    versions: HashMap<String, String>,
    commands: Vec<EncoderCommand>,
    frames_seen: Vec<usize>,
    scratch_dirs: Vec<PathBuf>,
    status: Option<i32>,
    stderr: String,
    missing: bool,
    skip_output: bool,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            versions: HashMap::new(),
            commands: Vec::new(),
            frames_seen: Vec::new(),
            scratch_dirs: Vec::new(),
            status: Some(0),
            stderr: String::new(),
            missing: false,
            skip_output: false,
        }
    }
}

/// [`ExternalEncoder`] that records command lines instead of spawning.
///
/// A successful run writes `<program>:<frame count>` to the requested output
/// file. Clones share state, so a test can hand one clone to the renderer and
/// inspect another.
#[derive(Clone, Default)]
pub struct FakeEncoder {
    inner: Arc<Mutex<Inner>>,
}

impl FakeEncoder {
    /// Encoder that succeeds and reports no versions.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Report `version` for `program`.
    pub fn with_version(self, program: &str, version: &str) -> Self {
        self.lock()
            .versions
            .insert(program.to_owned(), version.to_owned());
        self
    }

    /// Exit with `status` and `stderr` on every run.
    pub fn set_exit(&self, status: Option<i32>, stderr: &str) {
        let mut inner = self.lock();
        inner.status = status;
        inner.stderr = stderr.to_owned();
    }

    /// Behave as if the program is not installed.
    pub fn set_missing(&self, missing: bool) {
        self.lock().missing = missing;
    }

    /// Succeed without writing the output file.
    pub fn set_skip_output(&self, skip: bool) {
        self.lock().skip_output = skip;
    }

    /// Every command run, in order.
    pub fn commands(&self) -> Vec<EncoderCommand> {
        self.lock().commands.clone()
    }

    /// Number of runs.
    pub fn run_count(&self) -> usize {
        self.lock().commands.len()
    }

    /// Frame files present in the scratch directory at each run.
    pub fn frames_seen(&self) -> Vec<usize> {
        self.lock().frames_seen.clone()
    }

    /// Scratch directory of each run.
    pub fn scratch_dirs(&self) -> Vec<PathBuf> {
        self.lock().scratch_dirs.clone()
    }
}

fn count_frames(dir: &std::path::Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| {
                    let name = e.file_name();
                    let name = name.to_string_lossy();
                    name.starts_with("frame_") && name.ends_with(".png")
                })
                .count()
        })
        .unwrap_or(0)
}

impl ExternalEncoder for FakeEncoder {
    fn version(&self, program: &str) -> Option<String> {
        self.lock().versions.get(program).cloned()
    }

    fn run(&mut self, command: &EncoderCommand) -> io::Result<EncoderOutput> {
        let mut inner = self.lock();
        inner.commands.push(command.clone());
        if inner.missing {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such program"));
        }
        let scratch = command.output.parent().map(PathBuf::from).unwrap_or_default();
        let frames = count_frames(&scratch);
        inner.frames_seen.push(frames);
        inner.scratch_dirs.push(scratch);
        let output = EncoderOutput {
            status: inner.status,
            stderr: inner.stderr.clone().into_bytes(),
        };
        if output.success() && !inner.skip_output {
            fs::write(&command.output, format!("{}:{frames}", command.program))?;
        }
        Ok(output)
    }
}
