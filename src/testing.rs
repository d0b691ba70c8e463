//! Test doubles for the query and dispatcher seams.

use std::collections::VecDeque;

use crate::backends::Dispatcher;
use crate::orientation::{Orientation, TransformCode};
use crate::query::OrientationQuery;

#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    pub applied: Vec<u8>,
}

impl Dispatcher for RecordingDispatcher {
    fn apply(&mut self, transform: TransformCode) {
        self.applied.push(transform.value());
    }
}

/// Answers from a script, `Undefined` once it runs out.
#[derive(Debug, Default)]
pub struct ScriptedQuery {
    answers: VecDeque<Orientation>,
    pub calls: usize,
}

impl ScriptedQuery {
    pub fn answering(answers: &[Orientation]) -> Self {
        ScriptedQuery {
            answers: answers.iter().copied().collect(),
            calls: 0,
        }
    }
}

impl OrientationQuery for ScriptedQuery {
    fn query_current(&mut self) -> Orientation {
        self.calls += 1;
        self.answers.pop_front().unwrap_or(Orientation::Undefined)
    }
}
