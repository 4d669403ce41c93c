//! Fatal assembly errors. Any of these aborts the whole run with no
//! image produced. The malformed `# @heap` directive is deliberately not
//! represented here; it only warns and assembly continues.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown opcode `{mnemonic}` on line {line}")]
    UnknownOpcode { mnemonic: String, line: usize },

    #[error("opcode `{mnemonic}` on line {line} requires an operand")]
    MissingOperand { mnemonic: &'static str, line: usize },

    #[error("cannot resolve `{token}` on line {line} as a label or number")]
    NumberFormat { token: String, line: usize },

    #[error("label `{name}` on line {line} is already defined")]
    DuplicateLabel { name: String, line: usize },
}
