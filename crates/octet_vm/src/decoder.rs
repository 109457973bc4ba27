use crate::error::{Result, VmError};
use crate::instruction::{Instruction, Operands, INSTRUCTION_SET};
use crate::opcode::OpcodeFormat;

/// Number of distinct two-byte opcodes.
const OPCODE_SPACE: usize = 0x10000;

struct Entry {
    text: &'static str,
    format: OpcodeFormat,
    proto: Instruction,
}

/// Turns raw opcodes into [`Instruction`]s.
///
/// Decoding depends on nothing but the two opcode bytes, so every result is
/// memoized in a table indexed by the opcode.
pub struct Decoder {
    table: Vec<Entry>,
    cache: Vec<Option<Instruction>>,
    cached: usize,
}

impl Decoder {
    pub fn new() -> Result<Self> {
        let prototypes: Vec<(&'static str, Instruction)> = INSTRUCTION_SET
            .iter()
            .map(|proto| (proto.opcode_format(), *proto))
            .collect();
        Self::from_table(&prototypes)
    }

    /// Build a decoder over `(format, prototype)` pairs.
    pub(crate) fn from_table(prototypes: &[(&'static str, Instruction)]) -> Result<Self> {
        let table = prototypes
            .iter()
            .map(|&(text, proto)| {
                Ok(Entry {
                    text,
                    format: OpcodeFormat::parse(text)?,
                    proto,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            table,
            cache: vec![None; OPCODE_SPACE],
            cached: 0,
        })
    }

    pub fn decode(&mut self, opcode: [u8; 2]) -> Result<Instruction> {
        let key = u16::from_be_bytes(opcode) as usize;
        if let Some(instruction) = self.cache[key] {
            return Ok(instruction);
        }

        let instruction = self.resolve(opcode)?;
        log::debug!("decoded {:04X} as {}", key, instruction);
        self.cache[key] = Some(instruction);
        self.cached += 1;
        Ok(instruction)
    }

    /// Scan the whole table; exactly one format may accept `opcode`.
    fn resolve(&self, opcode: [u8; 2]) -> Result<Instruction> {
        let candidates: Vec<&Entry> = self
            .table
            .iter()
            .filter(|entry| entry.format.matches(opcode))
            .collect();

        match candidates.as_slice() {
            [] => Err(VmError::UnknownOpcode { opcode }),
            [entry] => {
                let units = entry.format.operands(opcode)?;
                let operands = Operands::route(entry.text, &units);
                entry.proto.with_operands(&operands)
            }
            many => Err(VmError::AmbiguousOpcode {
                opcode,
                formats: many.iter().map(|entry| entry.text).collect(),
            }),
        }
    }

    /// How many distinct opcodes have been decoded so far.
    pub fn cached(&self) -> usize {
        self.cached
    }
}
