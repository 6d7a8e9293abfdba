//! Line-oriented dashboard session.
//!
//! Reads one command per line, renders results to the output, and keeps
//! going after bad input. Results are served from the [`Session`] memo when
//! inputs repeat.

use crate::config::{Design, Sweep};
use crate::io::export_table;
use crate::models::Preset;
use crate::report;
use crate::session::Session;
use anyhow::{anyhow, bail, Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;

const PROMPT: &str = "aerocascade> ";

const HELP: &str = "\
Commands:
  size <x>                 evaluate the cascade at windshield size x
  run [x]                  evaluate at x, or re-run the current size
  sweep <min> <max> <n>    parametric sweep with n points
  export <path>            write the last sweep as CSV
  preset <name>            switch coefficients (baseline, refined)
  help                     show this message
  quit | exit              leave the session";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Size(f64),
    Run(Option<f64>),
    Sweep { min: f64, max: f64, num_points: usize },
    Export(PathBuf),
    Preset(Preset),
    Help,
    Quit,
}

fn parse_f64(token: Option<&str>, what: &str) -> Result<f64> {
    let token = token.ok_or_else(|| anyhow!("missing {}", what))?;
    token
        .parse()
        .with_context(|| format!("invalid {}: '{}'", what, token))
}

/// Parses one input line. Blank lines give `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "size" => Command::Size(parse_f64(parts.next(), "windshield size")?),
        "run" => match parts.next() {
            Some(tok) => Command::Run(Some(parse_f64(Some(tok), "windshield size")?)),
            None => Command::Run(None),
        },
        "sweep" => {
            let min = parse_f64(parts.next(), "sweep min")?;
            let max = parse_f64(parts.next(), "sweep max")?;
            let n = parts.next().ok_or_else(|| anyhow!("missing number of points"))?;
            let num_points = n
                .parse()
                .with_context(|| format!("invalid number of points: '{}'", n))?;
            Command::Sweep { min, max, num_points }
        }
        "export" => {
            let path = parts.next().ok_or_else(|| anyhow!("missing export path"))?;
            Command::Export(PathBuf::from(path))
        }
        "preset" => {
            let name = parts.next().ok_or_else(|| anyhow!("missing preset name"))?;
            Command::Preset(name.parse()?)
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command '{}' (try 'help')", other),
    };

    if let Some(extra) = parts.next() {
        bail!("unexpected argument '{}'", extra);
    }
    Ok(Some(cmd))
}

pub struct Dashboard {
    session: Session,
    design: Design,
    current_size: f64,
}

impl Dashboard {
    pub fn new(session: Session, design: Design) -> Self {
        Self {
            session,
            current_size: design.windshield_size,
            design,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_size(&self) -> f64 {
        self.current_size
    }

    fn render_size<W: Write>(&mut self, size: f64, out: &mut W) -> Result<()> {
        self.design.check(size)?;
        let result = self.session.evaluate(size)?;
        self.current_size = size;
        let checks = self.session.compliance(result.fuel_burn);
        report::render_point(out, &result, &checks)?;
        Ok(())
    }

    /// Executes one command. Returns `false` when the session should end.
    pub fn handle<W: Write>(&mut self, cmd: Command, out: &mut W) -> Result<bool> {
        match cmd {
            Command::Size(size) | Command::Run(Some(size)) => self.render_size(size, out)?,
            Command::Run(None) => self.render_size(self.current_size, out)?,
            Command::Sweep { min, max, num_points } => {
                let sweep = Sweep { min, max, num_points };
                sweep.validate()?;
                let table = self.session.sweep(sweep.range()?)?;
                report::render_sweep_table(out, table)?;
            }
            Command::Export(path) => {
                let table = self
                    .session
                    .last_sweep()
                    .ok_or_else(|| anyhow!("no sweep to export; run 'sweep' first"))?;
                export_table(&path, table)?;
                writeln!(out, "exported {} rows to {}", table.len(), path.display())?;
            }
            Command::Preset(preset) => {
                self.session.set_coefficients(preset.coefficients());
                writeln!(out, "coefficients: {}", preset)?;
            }
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Runs until `quit` or end of input. Command errors are reported and
    /// the session continues; I/O errors end it.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            let outcome = parse_command(&line).and_then(|cmd| match cmd {
                Some(cmd) => self.handle(cmd, out),
                None => Ok(true),
            });

            match outcome {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => writeln!(out, "error: {:#}", e)?,
            }

            write!(out, "{}", PROMPT)?;
            out.flush()?;
        }

        let (hits, misses) = self.session.stats();
        info!(hits, misses, "interactive session ended");
        Ok(())
    }
}
