//! x86-64 disassembly of installed code using iced-x86.

use iced_x86::{Decoder, DecoderOptions, Formatter, Instruction, NasmFormatter};
use std::fmt::Write;

/// Disassemble `code` as if loaded at `ip`, one instruction per line.
///
/// Each line holds the address, the raw bytes and the NASM-syntax text.
/// Undecodable bytes show up as `(bad)` and decoding continues after them.
pub fn disassemble(code: &[u8], ip: u64) -> String {
    let mut decoder = Decoder::with_ip(64, code, ip, DecoderOptions::NONE);
    let mut formatter = NasmFormatter::new();
    let mut instruction = Instruction::default();
    let mut text = String::new();
    let mut output = String::new();

    while decoder.can_decode() {
        decoder.decode_out(&mut instruction);
        text.clear();
        formatter.format(&instruction, &mut text);

        let start = (instruction.ip() - ip) as usize;
        let bytes: String = code[start..start + instruction.len()]
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect();
        let _ = writeln!(output, "{:016X} {:<20} {}", instruction.ip(), bytes, text);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced_x86::code_asm::*;

    #[test]
    fn test_disassemble_assembled_stub() {
        let mut a = CodeAssembler::new(64).unwrap();
        a.mov(rax, rdi).unwrap();
        a.add(rax, rsi).unwrap();
        a.ret().unwrap();
        let code = a.assemble(0x1000).unwrap();

        let listing = disassemble(&code, 0x1000);
        let lines: Vec<_> = listing.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("0000000000001000"));
        assert!(lines[0].contains("mov rax,rdi"));
        assert!(lines[1].contains("add rax,rsi"));
        assert!(lines[2].ends_with("ret"));
    }

    #[test]
    fn test_empty_code() {
        assert_eq!(disassemble(&[], 0), "");
    }
}
