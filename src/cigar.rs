//! Run-length edit scripts (CIGAR strings) and their single-step expansion.

use crate::error::{RefmodError, Result};

/// One operation of the SAM CIGAR alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    Match,
    Ins,
    Del,
    RefSkip,
    SoftClip,
    HardClip,
    Pad,
    Equal,
    Diff,
}

impl CigarOp {
    pub fn from_code(code: char) -> Option<Self> {
        let op = match code {
            'M' => CigarOp::Match,
            'I' => CigarOp::Ins,
            'D' => CigarOp::Del,
            'N' => CigarOp::RefSkip,
            'S' => CigarOp::SoftClip,
            'H' => CigarOp::HardClip,
            'P' => CigarOp::Pad,
            '=' => CigarOp::Equal,
            'X' => CigarOp::Diff,
            _ => return None,
        };
        Some(op)
    }

    pub fn code(self) -> char {
        match self {
            CigarOp::Match => 'M',
            CigarOp::Ins => 'I',
            CigarOp::Del => 'D',
            CigarOp::RefSkip => 'N',
            CigarOp::SoftClip => 'S',
            CigarOp::HardClip => 'H',
            CigarOp::Pad => 'P',
            CigarOp::Equal => '=',
            CigarOp::Diff => 'X',
        }
    }
}

/// A single-length edit step as consumed by the reconciler.
///
/// Only `M`, `I` and `D` carry reconciliation semantics; the rest of the
/// alphabet is kept as `Other` so callers decide how strict to be about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Match,
    Insert,
    Delete,
    Other(CigarOp),
}

impl From<CigarOp> for EditOp {
    fn from(op: CigarOp) -> Self {
        match op {
            CigarOp::Match => EditOp::Match,
            CigarOp::Ins => EditOp::Insert,
            CigarOp::Del => EditOp::Delete,
            other => EditOp::Other(other),
        }
    }
}

/// Parse `<len><op>` groups, e.g. `"3M2I"` -> `[(3, M), (2, I)]`.
pub fn parse_edit_script(script: &str) -> Result<Vec<(u32, CigarOp)>> {
    let malformed = |reason: String| RefmodError::MalformedEditScript {
        script: script.to_string(),
        reason,
    };

    if script.is_empty() {
        return Err(malformed("empty edit script".to_string()));
    }

    let mut runs = Vec::new();
    let mut len: Option<u32> = None;
    for (offset, ch) in script.char_indices() {
        if let Some(digit) = ch.to_digit(10) {
            let next = len
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| malformed(format!("run length overflows at offset {offset}")))?;
            len = Some(next);
            continue;
        }

        let op = CigarOp::from_code(ch)
            .ok_or_else(|| malformed(format!("unexpected character '{ch}' at offset {offset}")))?;
        let run = len
            .take()
            .ok_or_else(|| malformed(format!("operation '{ch}' at offset {offset} has no length")))?;
        runs.push((run, op));
    }

    if len.is_some() {
        return Err(malformed("trailing run length without an operation".to_string()));
    }

    Ok(runs)
}

/// Expand an edit script into one [`EditOp`] per aligned position.
pub fn expand_edit_script(script: &str) -> Result<Vec<EditOp>> {
    let runs = parse_edit_script(script)?;
    Ok(expand_runs(&runs))
}

pub fn expand_runs(runs: &[(u32, CigarOp)]) -> Vec<EditOp> {
    edit_steps(runs).collect()
}

/// Lazy single-step view of parsed runs.
pub fn edit_steps(runs: &[(u32, CigarOp)]) -> impl Iterator<Item = EditOp> + '_ {
    runs.iter()
        .flat_map(|&(len, op)| std::iter::repeat_n(EditOp::from(op), len as usize))
}

/// Render runs back into their compact string form.
pub fn runs_to_string(runs: &[(u32, CigarOp)]) -> String {
    if runs.is_empty() {
        return "*".to_string();
    }
    let mut out = String::new();
    for (len, op) in runs {
        out.push_str(&len.to_string());
        out.push(op.code());
    }
    out
}
