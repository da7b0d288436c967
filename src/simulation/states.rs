//! Core state types for the many-body simulation.
//!
//! Per-body data is stored column-wise:
//! - `BodyState` holds masses, velocities and accelerations (single-buffered)
//! - `PositionBuffers` holds the two position arrays and which one is readable
//!
//! `Body` is only used to describe initial conditions before they are split into columns.

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

/// Initial state of a single body
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub m: f64, // mass
}

/// Masses, velocities and accelerations indexed by body id.
///
/// Velocities and accelerations are not double-buffered: a worker only ever touches the
/// indices of its own interval, so no other worker reads them during a step.
#[derive(Debug, Clone)]
pub struct BodyState {
    pub masses: Vec<f64>,
    pub velocities: Vec<NVec2>,
    pub accelerations: Vec<NVec2>,
}

impl BodyState {
    /// Split `bodies` into columns. Accelerations start at zero.
    pub fn from_bodies(bodies: &[Body]) -> Self {
        Self {
            masses: bodies.iter().map(|b| b.m).collect(),
            velocities: bodies.iter().map(|b| b.v).collect(),
            accelerations: vec![NVec2::zeros(); bodies.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }
}

/// Which position buffer currently holds the last completed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadBuffer {
    A,
    B,
}

impl ReadBuffer {
    pub fn flipped(self) -> Self {
        match self {
            ReadBuffer::A => ReadBuffer::B,
            ReadBuffer::B => ReadBuffer::A,
        }
    }
}

/// The two position arrays of the double buffer.
///
/// The read buffer is the last fully computed frame. The other one is only ever handed out
/// mutably together with the read buffer (`split`), and roles flip in `swap` once every
/// worker of a step has joined.
#[derive(Debug, Clone)]
pub struct PositionBuffers {
    a: Vec<NVec2>,
    b: Vec<NVec2>,
    read: ReadBuffer,
    generation: u64, // completed swaps
}

impl PositionBuffers {
    /// Both buffers start with the same positions, `A` is readable
    pub fn new(initial: Vec<NVec2>) -> Self {
        Self {
            b: initial.clone(),
            a: initial,
            read: ReadBuffer::A,
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    pub fn read_buffer(&self) -> ReadBuffer {
        self.read
    }

    /// Number of frames completed since construction
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Positions of the most recently completed frame
    pub fn latest(&self) -> &[NVec2] {
        match self.read {
            ReadBuffer::A => self.a.as_slice(),
            ReadBuffer::B => self.b.as_slice(),
        }
    }

    /// Borrow (read, write) for one step
    pub fn split(&mut self) -> (&[NVec2], &mut [NVec2]) {
        match self.read {
            ReadBuffer::A => (self.a.as_slice(), self.b.as_mut_slice()),
            ReadBuffer::B => (self.b.as_slice(), self.a.as_mut_slice()),
        }
    }

    /// Publish the write buffer as the new read buffer.
    pub(crate) fn swap(&mut self) {
        self.read = self.read.flipped();
        self.generation += 1;
    }
}
