//! Byte memory addressed by a signed pointer.
//!
//! Cell arithmetic always wraps modulo 256. The addressing policy only
//! matters when the pointer moves, see [`Tape::advance`].

use crate::config::ConfigError;
use crate::error::{Bound, ExecError};

/// Addressing policy for a [`Tape`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TapeConfig {
    /// `None` means unbounded in both directions.
    pub size: Option<usize>,
    /// Wrap around at the edges of a fixed-size tape instead of failing.
    pub wrap: bool,
}

impl TapeConfig {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn bounded(size: usize, wrap: bool) -> Self {
        Self {
            size: Some(size),
            wrap,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.size {
            None if self.wrap => Err(ConfigError::WrapWithoutSize),
            Some(0) => Err(ConfigError::ZeroTapeSize),
            Some(size) if isize::try_from(size).is_err() => {
                Err(ConfigError::TapeTooLarge { size })
            }
            _ => Ok(()),
        }
    }
}

/// A pointer move that left a fixed-size tape with wrapping disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds {
    pub address: isize,
    pub bound: Bound,
}

impl OutOfBounds {
    pub fn at(self, ip: usize) -> ExecError {
        ExecError::PointerOutOfBounds {
            ip,
            address: self.address,
            bound: self.bound,
        }
    }
}

/// The memory tape.
///
/// Storage grows lazily from two ends and unset cells read as 0. Unbounded
/// tapes grow outward from address 0 in both directions. Bounded tapes grow
/// inward from their two edges, so a pointer that wraps to the last cell
/// touches only the cells it visits.
#[derive(Debug, Clone)]
pub struct Tape {
    config: TapeConfig,
    // addresses 0, 1, 2, ...
    front: Vec<u8>,
    // unbounded: -1, -2, -3, ...  bounded: size-1, size-2, ...
    back: Vec<u8>,
}

impl Tape {
    pub fn new(config: TapeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            front: Vec::new(),
            back: Vec::new(),
        })
    }

    pub fn config(&self) -> TapeConfig {
        self.config
    }

    /// Addresses outside a bounded tape read as 0.
    pub fn read(&self, address: isize) -> u8 {
        match self.slot(address) {
            Some(Slot::Front(i)) => self.front.get(i).copied().unwrap_or(0),
            Some(Slot::Back(i)) => self.back.get(i).copied().unwrap_or(0),
            None => 0,
        }
    }

    /// Writes outside a bounded tape are dropped; `advance` never produces one.
    pub fn write(&mut self, address: isize, value: u8) {
        let (store, i) = match self.slot(address) {
            Some(Slot::Front(i)) => (&mut self.front, i),
            Some(Slot::Back(i)) => (&mut self.back, i),
            None => return,
        };
        if i >= store.len() {
            store.resize(i + 1, 0);
        }
        store[i] = value;
    }

    /// Add one to the cell at `address`, wrapping 255 to 0.
    pub fn increment(&mut self, address: isize) -> u8 {
        let after = self.read(address).wrapping_add(1);
        self.write(address, after);
        after
    }

    /// Subtract one from the cell at `address`, wrapping 0 to 255.
    pub fn decrement(&mut self, address: isize) -> u8 {
        let after = self.read(address).wrapping_sub(1);
        self.write(address, after);
        after
    }

    /// Compute the address `delta` cells away from `address`.
    ///
    /// Unbounded tapes always succeed. A fixed-size tape either wraps to the
    /// opposite edge or reports the attempted address and the violated bound.
    pub fn advance(&self, address: isize, delta: isize) -> Result<isize, OutOfBounds> {
        let target = address + delta;
        let Some(size) = self.config.size else {
            return Ok(target);
        };
        // validate() caps the size at isize::MAX
        let limit = isize::try_from(size).unwrap_or(isize::MAX);
        if (0..limit).contains(&target) {
            return Ok(target);
        }
        if self.config.wrap {
            return Ok(target.rem_euclid(limit));
        }
        let bound = if target < 0 {
            Bound::Low
        } else {
            Bound::High(size - 1)
        };
        Err(OutOfBounds {
            address: target,
            bound,
        })
    }

    fn slot(&self, address: isize) -> Option<Slot> {
        match self.config.size {
            None if address >= 0 => Some(Slot::Front(address as usize)),
            None => Some(Slot::Back((-(address + 1)) as usize)),
            Some(size) => {
                let i = usize::try_from(address).ok().filter(|&i| i < size)?;
                let last = size - 1;
                if i <= last / 2 {
                    Some(Slot::Front(i))
                } else {
                    Some(Slot::Back(last - i))
                }
            }
        }
    }
}

enum Slot {
    Front(usize),
    Back(usize),
}
