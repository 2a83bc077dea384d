#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use da728x::{Da728x, Register, Variant};
use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
use embedded_hal_async::i2c::I2c;
use embedded_hal_mock::eh1::delay::NoopDelay;

pub const ADDRESS: u8 = 0x4a;

struct Registers {
    regs: [u8; 256],
    writes: Vec<(u8, u8)>,
    pointer: u8,
}

/// Register level model of a DA7280 on the bus.
///
/// Clones share the same register file, so a test can keep a handle while the
/// driver owns another. Every byte written is appended to a log.
#[derive(Clone)]
pub struct FakeChip(Rc<RefCell<Registers>>);

impl FakeChip {
    pub fn new(chip_rev: u8) -> Self {
        let mut regs = [0u8; 256];
        regs[Register::ChipRev as usize] = chip_rev;
        // pattern data starts at SNP_MEM_0, memory unlocked
        regs[Register::MemCtl1 as usize] = 0x84;
        regs[Register::MemCtl2 as usize] = 0x80;
        Self(Rc::new(RefCell::new(Registers {
            regs,
            writes: Vec::new(),
            pointer: 0,
        })))
    }

    pub fn get(&self, register: Register) -> u8 {
        self.0.borrow().regs[register as usize]
    }

    pub fn get_raw(&self, address: u8) -> u8 {
        self.0.borrow().regs[address as usize]
    }

    /// Set a register without logging a write.
    pub fn set(&self, register: Register, value: u8) {
        self.0.borrow_mut().regs[register as usize] = value;
    }

    pub fn set_raw(&self, address: u8, value: u8) {
        self.0.borrow_mut().regs[address as usize] = value;
    }

    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.0.borrow().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.0.borrow().writes.len()
    }

    /// Index in the write log of the first write to `register` after `from`.
    pub fn first_write_to(&self, register: Register, from: usize) -> Option<usize> {
        self.0.borrow().writes[from..]
            .iter()
            .position(|&(addr, _)| addr == register as u8)
            .map(|i| i + from)
    }

    pub fn was_written(&self, register: Register) -> bool {
        self.first_write_to(register, 0).is_some()
    }
}

impl Registers {
    fn store(&mut self, address: u8, value: u8) {
        self.writes.push((address, value));
        let slot = &mut self.regs[address as usize];
        match address {
            // write-1-to-clear event registers
            0x03 => {
                let cleared = *slot & value;
                *slot &= !value;
                if cleared & 0x10 != 0 {
                    self.regs[0x05] = 0;
                }
                if cleared & 0x20 != 0 {
                    self.regs[0x04] = 0;
                }
            }
            0x81 => *slot &= !value,
            _ => *slot = value,
        }
    }
}

impl ErrorType for FakeChip {
    type Error = ErrorKind;
}

impl I2c for FakeChip {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != ADDRESS {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        let mut chip = self.0.borrow_mut();
        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    let Some((&start, data)) = bytes.split_first() else {
                        continue;
                    };
                    chip.pointer = start;
                    for &byte in data {
                        let at = chip.pointer;
                        chip.store(at, byte);
                        chip.pointer = at.wrapping_add(1);
                    }
                }
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        let at = chip.pointer;
                        *byte = chip.regs[at as usize];
                        chip.pointer = at.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}

pub type Haptic = Da728x<FakeChip, NoopDelay>;

/// A DA7280 driver on a fresh fake chip, plus a handle to the chip.
pub async fn haptic() -> (Haptic, FakeChip) {
    let chip = FakeChip::new(0xba);
    let haptic = Da728x::new(chip.clone(), NoopDelay, Variant::Da7280)
        .await
        .unwrap();
    (haptic, chip)
}
