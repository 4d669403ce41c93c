//! The first pass. Walks source lines in order, applies header
//! directives, binds labels to the running program counter, checks every
//! mnemonic against the opcode table and assigns each instruction its
//! byte offset. The resulting [`Program`] is frozen; the second pass
//! only reads it.

use std::collections::hash_map::Entry;

use super::ast::{Instruction, Opcode, Program};
use super::error::Error;
use super::lexer::{self, Line};

pub fn pass1<S: AsRef<str>>(lines: &[S]) -> Result<Program, Error> {
    let mut program = Program::new();
    let mut pc: u16 = 0;

    for (idx, raw) in lines.iter().enumerate() {
        let line = idx + 1;
        match lexer::tokenize_line(raw.as_ref()) {
            Line::Heap(Some(size)) => {
                info!("custom heap size: {}", size);
                program.heap_size = size;
            }
            Line::Heap(None) => {
                warn!(
                    "invalid heap directive on line {}, keeping {}",
                    line, program.heap_size
                );
            }
            Line::Stmts(stmts) => {
                for stmt in stmts {
                    // The label binds to the PC *before* this statement's
                    // own instruction, if any.
                    if let Some(name) = stmt.label {
                        match program.labels.entry(name) {
                            Entry::Occupied(entry) => {
                                return Err(Error::DuplicateLabel {
                                    name: entry.key().clone(),
                                    line,
                                });
                            }
                            Entry::Vacant(entry) => {
                                entry.insert(pc);
                            }
                        }
                    }

                    if let Some(body) = stmt.body {
                        let op = Opcode::lookup(&body.mnemonic).ok_or_else(|| {
                            Error::UnknownOpcode {
                                mnemonic: body.mnemonic.clone(),
                                line,
                            }
                        })?;
                        program.instrs.push(Instruction {
                            op,
                            operand: body.operand,
                            pc,
                            line,
                        });
                        pc = pc.wrapping_add(op.size());
                    }
                }
            }
        }
    }

    Ok(program)
}
