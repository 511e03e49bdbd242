//! External interface types: `CharBudget` and `Options`. See `spec.md` §6.

use regex::Regex;

/// Total output budget. `width` additionally bounds per-line character
/// count (§6).
#[derive(Debug, Clone, Copy)]
pub struct CharBudget {
    pub width: u32,
    pub height: u32,
}

impl CharBudget {
    pub fn new(width: u32, height: u32) -> Self {
        CharBudget { width, height }
    }

    pub fn total(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Per-node-kind intrinsic weight overrides (`spec.md` §4.2 defaults:
/// class 3.0, function 2.0, heading 2.5 / level-depth, import 0.3, text 1.0).
#[derive(Debug, Clone, Copy)]
pub struct Weights {
    pub class: f64,
    pub function: f64,
    pub heading_base: f64,
    pub import: f64,
    pub text: f64,
    pub directory: f64,
    pub file: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            class: 3.0,
            function: 2.0,
            heading_base: 2.5,
            import: 0.3,
            text: 1.0,
            directory: 2.0,
            file: 1.0,
        }
    }
}

/// Floor below which softmax scoring would otherwise collapse (§4.2).
pub const SCORE_EPSILON: f64 = 1e-6;

/// All tunables accepted by [`crate::compress::compress`]. Every field has a
/// spec-mandated default; callers typically start from `Options::default()`
/// and override what they need.
#[derive(Debug, Clone)]
pub struct Options {
    /// Matches boost node scores (§4.2). `None` disables grep scoring
    /// entirely (all nodes get a neutral boost of 1.0).
    pub grep_pattern: Option<Regex>,
    /// Softmax temperature `T` (§4.3). Must be > 0.
    pub temperature: f64,
    /// Children whose allocated share falls below this many characters are
    /// folded instead of rendered (§4.3 step 4).
    pub min_line_chars: usize,
    pub weights: Weights,
    /// Prefix each output line with `n:`.
    pub line_numbers: bool,
    /// Wrap long lines with fractional continuation numbers instead of
    /// truncating with an ellipsis.
    pub wrap_width: Option<u32>,
    /// Enable the post-hard-cap 3-gram dedup pass (§4.6 step 4).
    pub deduplicate: bool,
    /// Absolute character ceiling. Per the Open Question in `spec.md` §9,
    /// this implementation treats `limit` as a hard ceiling applied on top
    /// of (never relaxing) the shape-derived budget — see `DESIGN.md`.
    pub limit: Option<usize>,
    /// Pre-prune the tree to this `[start, end]` source line span before
    /// scoring (§6 "Line range selection"). Fractional ends truncate the
    /// last line character-wise: `80.5` keeps the first half of line 80.
    pub range: Option<(f64, f64)>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            grep_pattern: None,
            temperature: 0.5,
            min_line_chars: 8,
            weights: Weights::default(),
            line_numbers: false,
            wrap_width: None,
            deduplicate: false,
            limit: None,
            range: None,
        }
    }
}

impl Options {
    pub fn validate(&self) -> Result<(), crate::error::EngineError> {
        if self.temperature <= 0.0 {
            return Err(crate::error::EngineError::InvalidOption(
                "temperature must be > 0".into(),
            ));
        }
        if let Some(limit) = self.limit {
            if limit == 0 {
                return Err(crate::error::EngineError::InvalidOption(
                    "limit must be > 0".into(),
                ));
            }
        }
        if let Some((start, end)) = self.range {
            if start < 0.0 || end < start {
                return Err(crate::error::EngineError::InvalidOption(
                    "range must satisfy 0 <= start <= end".into(),
                ));
            }
        }
        Ok(())
    }

    /// Effective hard cap in characters: the smaller of the shape budget and
    /// an explicit `--limit`, per `spec.md` §9's resolved Open Question.
    pub fn effective_cap(&self, budget: &CharBudget) -> usize {
        match self.limit {
            Some(limit) => limit.min(budget.total()),
            None => budget.total(),
        }
    }
}
