#![allow(dead_code)]

use std::collections::VecDeque;

use hero_engine::Roller;

/// Hands out preset faces in order; picks index 0 unless told otherwise.
pub struct Scripted {
    faces: VecDeque<u32>,
    picks: VecDeque<usize>,
}

impl Scripted {
    pub fn faces(faces: &[u32]) -> Self {
        Self {
            faces: faces.iter().copied().collect(),
            picks: VecDeque::new(),
        }
    }

    pub fn with_picks(mut self, picks: &[usize]) -> Self {
        self.picks = picks.iter().copied().collect();
        self
    }
}

impl Roller for Scripted {
    fn roll_die(&mut self, faces: u32) -> u32 {
        self.faces.pop_front().unwrap_or(1).min(faces)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0) % len
    }
}
