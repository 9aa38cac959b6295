// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Line-level plumbing for a solver subprocess speaking SMT-LIB 2

use crate::errors::{Result, SolverError};
use itertools::Itertools;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

#[derive(Debug)]
pub struct SmtProcess {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    transcript: Option<BufWriter<File>>,
}

impl SmtProcess {
    /// Spawn `program` with stdin and stdout piped. When `transcript` is
    /// set, every command sent is also written there.
    pub fn spawn(program: &Path, args: &[&str], transcript: Option<&Path>) -> Result<SmtProcess> {
        debug!("command line: {} {}", program.display(), args.iter().join(" "));
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SolverError::Protocol("no stdin handle on the solver process".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SolverError::Protocol("no stdout handle on the solver process".to_string()))?;
        let transcript = match transcript {
            None => None,
            Some(path) => Some(BufWriter::new(File::create(path)?)),
        };
        Ok(SmtProcess {
            child,
            stdin: BufWriter::new(stdin),
            stdout: BufReader::new(stdout),
            transcript,
        })
    }

    /// Send one command line.
    pub fn send(&mut self, command: &str) -> Result<()> {
        debug!("smt> {}", command);
        if let Some(transcript) = &mut self.transcript {
            writeln!(transcript, "{}", command)?;
            transcript.flush()?;
        }
        writeln!(self.stdin, "{}", command)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Read one complete reply. Lines are accumulated until the
    /// parentheses balance; quotes toggle string context so parentheses
    /// inside error messages do not count.
    pub fn read_reply(&mut self) -> Result<String> {
        let mut reply = String::new();
        let mut depth = 0i32;
        let mut in_string = false;
        loop {
            let mut line = String::new();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(SolverError::Protocol(
                    "solver closed its output stream".to_string(),
                ));
            }
            let line = line.trim_end();
            if line.is_empty() && reply.is_empty() {
                continue;
            }
            for c in line.chars() {
                match c {
                    '"' => in_string = !in_string,
                    '(' if !in_string => depth += 1,
                    ')' if !in_string => depth -= 1,
                    _ => {}
                }
            }
            if !reply.is_empty() {
                reply.push(' ');
            }
            reply.push_str(line);
            if depth <= 0 && !in_string {
                break;
            }
        }
        debug!("smt< {}", reply);
        Ok(reply)
    }

    /// Send a command and map an `(error ...)` reply to a backend error.
    pub fn command(&mut self, command: &str) -> Result<String> {
        self.send(command)?;
        let reply = self.read_reply()?;
        match error_message(&reply) {
            Some(message) => Err(SolverError::Backend(message.to_string())),
            None => Ok(reply),
        }
    }

    /// Send a command whose only acceptable reply is `success`.
    pub fn expect_success(&mut self, command: &str) -> Result<()> {
        let reply = self.command(command)?;
        if reply == "success" {
            Ok(())
        } else {
            Err(SolverError::Protocol(format!(
                "expected success for `{}`, got `{}`",
                command, reply
            )))
        }
    }
}

fn error_message(reply: &str) -> Option<&str> {
    let body = reply.strip_prefix("(error")?;
    // `(error` must be a complete head atom, not a prefix of one
    if !body.starts_with(|c: char| c == ' ' || c == '"') {
        return None;
    }
    let body = body.strip_suffix(')')?;
    Some(body.trim().trim_matches('"'))
}

impl Drop for SmtProcess {
    fn drop(&mut self) {
        let _ = self.send("(exit)");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
