//! Memoizing front-end state for interactive use.
//!
//! The cascade itself is stateless. A `Session` keeps the last single-point
//! result and the last sweep so re-rendering with unchanged inputs does not
//! recompute. Changing coefficients drops both.

use crate::cascade::{Cascade, CascadeResult};
use crate::compliance::{self, ComplianceCheck, Standard};
use crate::error::CascadeError;
use crate::models::Coefficients;
use crate::sweep::{SweepRange, SweepTable};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Session {
    cascade: Cascade,
    standards: Vec<Standard>,
    // Keyed by the exact bit pattern of the input
    last_point: Option<(u64, CascadeResult)>,
    last_sweep: Option<(SweepRange, SweepTable)>,
    hits: usize,
    misses: usize,
}

impl Session {
    pub fn new(cascade: Cascade, standards: Vec<Standard>) -> Self {
        Self {
            cascade,
            standards,
            last_point: None,
            last_sweep: None,
            hits: 0,
            misses: 0,
        }
    }

    pub fn cascade(&self) -> &Cascade {
        &self.cascade
    }

    pub fn standards(&self) -> &[Standard] {
        &self.standards
    }

    /// Replaces the coefficients and invalidates every memo.
    pub fn set_coefficients(&mut self, coefficients: Coefficients) {
        if *self.cascade.coefficients() != coefficients {
            self.cascade = Cascade::new(coefficients);
            self.invalidate();
        }
    }

    pub fn invalidate(&mut self) {
        self.last_point = None;
        self.last_sweep = None;
    }

    pub fn evaluate(&mut self, windshield_size: f64) -> Result<CascadeResult, CascadeError> {
        let key = windshield_size.to_bits();
        if let Some((k, result)) = self.last_point {
            if k == key {
                self.hits += 1;
                debug!(windshield_size, "point memo hit");
                return Ok(result);
            }
        }

        self.misses += 1;
        debug!(windshield_size, "point memo miss");
        let result = self.cascade.evaluate(windshield_size)?;
        self.last_point = Some((key, result));
        Ok(result)
    }

    pub fn sweep(&mut self, range: SweepRange) -> Result<&SweepTable, CascadeError> {
        match self.last_sweep.take() {
            Some((r, table)) if r == range => {
                self.hits += 1;
                debug!(%range, "sweep memo hit");
                Ok(&self.last_sweep.insert((r, table)).1)
            }
            _ => {
                self.misses += 1;
                debug!(%range, "sweep memo miss");
                let table = self.cascade.sweep(&range)?;
                Ok(&self.last_sweep.insert((range, table)).1)
            }
        }
    }

    pub fn compliance(&self, fuel_burn: f64) -> Vec<ComplianceCheck> {
        compliance::check(&self.standards, fuel_burn)
    }

    pub fn last_point(&self) -> Option<&CascadeResult> {
        self.last_point.as_ref().map(|(_, r)| r)
    }

    pub fn last_sweep(&self) -> Option<&SweepTable> {
        self.last_sweep.as_ref().map(|(_, t)| t)
    }

    /// (hits, misses) across both memos.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}
