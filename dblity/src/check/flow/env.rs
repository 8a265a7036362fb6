//! Closedness environment for the flow checker.
//!
//! Tracks the level of every local, parameter and pattern binding while a
//! method body is walked. Lexical scopes are a stack of frames; branches work
//! on a snapshot and are merged back with `meet`.

use crate::check::lattice::{Closedness, ExprLevel};
use dblity_ast::{DeclId, Span};
use std::collections::HashMap;

/// What the checker knows about one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VarState {
    /// Current level of the variable's value.
    pub level: ExprLevel,
    /// Explicit annotation still honoured on the variable. Assignments to a
    /// pinned variable are checked against it and never change its level.
    pub pinned: Option<Closedness>,
    /// Where the pinned annotation is written.
    pub annotation: Option<Span>,
    /// Declared or inferred static type.
    pub ty: Option<String>,
}

impl VarState {
    pub fn plain(level: ExprLevel, ty: Option<String>) -> Self {
        Self {
            level,
            pinned: None,
            annotation: None,
            ty,
        }
    }

    pub fn pinned(level: Closedness, annotation: Option<Span>, ty: Option<String>) -> Self {
        Self {
            level: ExprLevel::Level(level),
            pinned: Some(level),
            annotation,
            ty,
        }
    }
}

/// Scoped variable environment.
///
/// # Example
/// ```
/// use dblity::check::flow::FlowEnv;
/// use dblity::check::flow::env::VarState;
/// use dblity::check::lattice::{Closedness, ExprLevel};
/// use dblity::ast::DeclId;
///
/// let mut env = FlowEnv::new();
/// env.declare(DeclId(1), VarState::plain(ExprLevel::Level(Closedness::Closed), None));
///
/// let mut branch = env.snapshot();
/// branch.assign(DeclId(1), ExprLevel::Level(Closedness::Bound));
/// env.merge(&branch);
///
/// assert_eq!(env.level(DeclId(1)), Some(ExprLevel::Level(Closedness::Bound)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FlowEnv {
    frames: Vec<HashMap<DeclId, VarState>>,
}

impl FlowEnv {
    /// Creates an environment with one (method-level) frame.
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Drops the innermost frame. The method-level frame is never dropped.
    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Introduces a variable in the innermost frame.
    pub fn declare(&mut self, id: DeclId, state: VarState) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(id, state);
        }
    }

    pub fn get(&self, id: DeclId) -> Option<&VarState> {
        self.frames.iter().rev().find_map(|frame| frame.get(&id))
    }

    pub fn level(&self, id: DeclId) -> Option<ExprLevel> {
        self.get(id).map(|state| state.level)
    }

    /// Replaces the level of a visible variable.
    ///
    /// Returns `false` when the variable is not in scope.
    pub fn assign(&mut self, id: DeclId, level: ExprLevel) -> bool {
        match self
            .frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(&id))
        {
            Some(state) => {
                state.level = level;
                true
            }
            None => false,
        }
    }

    /// Merges the outcome of another control-flow path into this one.
    ///
    /// Only variables visible in both environments are merged; their level
    /// becomes the `meet` of both. Variables introduced by the other path
    /// went out of scope with it and are ignored.
    pub fn merge(&mut self, other: &FlowEnv) {
        for frame in &mut self.frames {
            for (id, state) in frame.iter_mut() {
                if let Some(theirs) = other.get(*id) {
                    state.level = state.level.meet(theirs.level);
                }
            }
        }
    }

    pub fn snapshot(&self) -> FlowEnv {
        self.clone()
    }
}

impl Default for FlowEnv {
    fn default() -> Self {
        Self::new()
    }
}
