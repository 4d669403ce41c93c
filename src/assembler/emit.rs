//! The second pass. Walks the frozen instruction list in order and
//! appends each opcode byte, resolving the 16-bit immediate for the
//! opcodes that take one. Either the complete image comes back or the
//! first fatal error does; there is no partial image.

use std::collections::HashMap;

use super::ast::{Operand, Program, MAGIC, VERSION};
use super::error::Error;
use super::lexer;

/// The fixed 4-byte image header: magic, version, heap size
/// little-endian.
pub fn header(heap_size: u16) -> [u8; 4] {
    let [lo, hi] = heap_size.to_le_bytes();
    [MAGIC, VERSION, lo, hi]
}

pub fn emit(program: &Program) -> Result<Vec<u8>, Error> {
    let mut image = Vec::with_capacity(4 + program.body_len());
    image.extend_from_slice(&header(program.heap_size));

    for inst in &program.instrs {
        image.push(inst.op.code());
        if inst.op.has_immediate() {
            let token = inst.operand.as_deref().ok_or(Error::MissingOperand {
                mnemonic: inst.op.mnemonic(),
                line: inst.line,
            })?;
            let operand = resolve(token, &program.labels, inst.line)?;
            image.extend_from_slice(&operand.encode());
        }
    }

    Ok(image)
}

/// Resolves an operand token. A known label wins over any literal
/// spelling of the same token. Literal values wider than 16 bits keep
/// only their low 16 bits.
fn resolve(token: &str, labels: &HashMap<String, u16>, line: usize) -> Result<Operand, Error> {
    if let Some(&pc) = labels.get(token) {
        return Ok(Operand::Label(pc));
    }
    match lexer::parse_literal(token) {
        Some(value) => Ok(Operand::Literal(value as u16)),
        None => Err(Error::NumberFormat { token: token.to_owned(), line }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble;

    #[test]
    fn test_header() {
        assert_eq!(header(128), [0xAD, 0x01, 0x80, 0x00]);
        assert_eq!(header(256), [0xAD, 0x01, 0x00, 0x01]);
        assert_eq!(header(0), [0xAD, 0x01, 0x00, 0x00]);
        assert_eq!(header(0xFFFF), [0xAD, 0x01, 0xFF, 0xFF]);
    }

    #[test]
    fn test_assemble_arithmetic_program() {
        let image = assemble(&["PUSH 5", "PUSH 3", "ADD", "PRINT", "EXIT"]).unwrap();
        assert_eq!(
            image,
            vec![
                0xAD, 0x01, 0x80, 0x00, // header, default heap 128
                0x10, 0x05, 0x00, // PUSH 5
                0x10, 0x03, 0x00, // PUSH 3
                0x11, // ADD
                0x01, // PRINT
                0x00, // EXIT
            ]
        );
    }

    #[test]
    fn test_assemble_heap_directive() {
        let image = assemble(&["# @heap 256", "EXIT"]).unwrap();
        assert_eq!(image, vec![0xAD, 0x01, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_assemble_forward_jump() {
        let image = assemble(&["JMP L1", "EXIT", "L1: PRINT", "EXIT"]).unwrap();
        assert_eq!(
            image,
            vec![
                0xAD, 0x01, 0x80, 0x00, // header
                0x20, 0x04, 0x00, // JMP L1 (= PC 4)
                0x00, // EXIT
                0x01, // L1: PRINT
                0x00, // EXIT
            ]
        );
    }

    #[test]
    fn test_heap_round_trip() {
        for &h in &[0u16, 1, 128, 256, 4096, 65535] {
            let source = format!("# @heap {}", h);
            let image = assemble(&[source.as_str(), "EXIT"]).unwrap();
            assert_eq!(u16::from_le_bytes([image[2], image[3]]), h);
        }
    }

    #[test]
    fn test_image_length() {
        let image = assemble(&["PUSH 1", "DUP", "ADD", "JIF 0", "EXIT"]).unwrap();
        // 4 header bytes plus the summed instruction sizes.
        assert_eq!(image.len(), 4 + (3 + 1 + 1 + 3 + 1));
    }

    #[test]
    fn test_character_operand() {
        let image = assemble(&["PUSH 'A'", "PRTC", "EXIT"]).unwrap();
        assert_eq!(&image[4..], &[0x10, 0x41, 0x00, 0x03, 0x00]);
    }

    #[test]
    fn test_hex_operand() {
        let image = assemble(&["PUSH 0x1234", "EXIT"]).unwrap();
        assert_eq!(&image[4..], &[0x10, 0x34, 0x12, 0x00]);
    }

    #[test]
    fn test_label_shadows_literal() {
        // The label table is consulted first, so a label spelled like a
        // number wins over the literal reading.
        let image = assemble(&["EXIT", "5: EXIT", "PUSH 5"]).unwrap();
        assert_eq!(&image[4..], &[0x00, 0x00, 0x10, 0x01, 0x00]);
    }

    #[test]
    fn test_backward_jump() {
        let image = assemble(&["top: PUSH 1", "JMP top"]).unwrap();
        assert_eq!(&image[4..], &[0x10, 0x01, 0x00, 0x20, 0x00, 0x00]);
    }

    #[test]
    fn test_wide_literal_truncates() {
        // Operands past 16 bits silently keep their low 16 bits.
        let image = assemble(&["PUSH 0x12345", "EXIT"]).unwrap();
        assert_eq!(&image[4..], &[0x10, 0x45, 0x23, 0x00]);
    }

    #[test]
    fn test_missing_operand() {
        let err = assemble(&["EXIT", "PUSH"]).unwrap_err();
        assert_eq!(err, Error::MissingOperand { mnemonic: "PUSH", line: 2 });
    }

    #[test]
    fn test_unresolvable_operand() {
        let err = assemble(&["JMP nowhere"]).unwrap_err();
        assert_eq!(
            err,
            Error::NumberFormat { token: "nowhere".to_owned(), line: 1 }
        );
        let err = assemble(&["PUSH 0xZZ"]).unwrap_err();
        assert_eq!(err, Error::NumberFormat { token: "0xZZ".to_owned(), line: 1 });
        let err = assemble(&["PUSH 12x"]).unwrap_err();
        assert_eq!(err, Error::NumberFormat { token: "12x".to_owned(), line: 1 });
    }

    #[test]
    fn test_no_image_on_error() {
        assert!(assemble(&["EXIT", "BOGUS"]).is_err());
        assert!(assemble(&["PUSH"]).is_err());
    }

    #[test]
    fn test_line_splitting_is_equivalent() {
        let split = assemble(&["PUSH 1", "PUSH 2", "ADD", "EXIT"]).unwrap();
        let joined = assemble(&["PUSH 1; PUSH 2; ADD; EXIT"]).unwrap();
        assert_eq!(split, joined);
    }
}
