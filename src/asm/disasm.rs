//! Converting machine words back into assembly text.
//!
//! PC-relative operands are shown as absolute addresses (e.g., `BRz x3005`),
//! computed from the address the word sits at.

use crate::ast::sim::SimInstr;
use crate::ast::{cc_suffix, trap_vects, ImmOrReg, IOffset};

/// Disassembles one word located at `addr`.
///
/// ```
/// use lc3_tutor::asm::disasm::disassemble;
///
/// assert_eq!(disassemble(0x1261, 0x3000), "ADD R1, R1, #1");
/// assert_eq!(disassemble(0x0BFE, 0x3005), "BRnp x3004");
/// assert_eq!(disassemble(0xF025, 0x3000), "HALT");
/// ```
pub fn disassemble(word: u16, addr: u16) -> String {
    let target = |off: IOffset<9>| fmt_addr(addr.wrapping_add(1).wrapping_add_signed(off.get()));

    match SimInstr::decode(word) {
        SimInstr::BR(0, _) => "NOP".to_string(),
        SimInstr::BR(cc, off) => format!("BR{} {}", cc_suffix(cc), target(off)),
        SimInstr::ADD(dr, sr1, sr2) => format!("ADD {dr}, {sr1}, {sr2}"),
        SimInstr::AND(dr, sr1, sr2) => format!("AND {dr}, {sr1}, {sr2}"),
        SimInstr::NOT(dr, sr) => format!("NOT {dr}, {sr}"),
        SimInstr::LD(dr, off)  => format!("LD {dr}, {}", target(off)),
        SimInstr::LDI(dr, off) => format!("LDI {dr}, {}", target(off)),
        SimInstr::LEA(dr, off) => format!("LEA {dr}, {}", target(off)),
        SimInstr::ST(sr, off)  => format!("ST {sr}, {}", target(off)),
        SimInstr::STI(sr, off) => format!("STI {sr}, {}", target(off)),
        SimInstr::LDR(dr, br, off) => format!("LDR {dr}, {br}, {off}"),
        SimInstr::STR(sr, br, off) => format!("STR {sr}, {br}, {off}"),
        SimInstr::JMP(br) if br.reg_no() == 7 => "RET".to_string(),
        SimInstr::JMP(br) => format!("JMP {br}"),
        SimInstr::JSR(ImmOrReg::Imm(off)) => {
            let dest = addr.wrapping_add(1).wrapping_add_signed(off.get());
            format!("JSR {}", fmt_addr(dest))
        },
        SimInstr::JSR(ImmOrReg::Reg(br)) => format!("JSRR {br}"),
        SimInstr::TRAP(vect) => match trap_vects::alias(vect.get()) {
            Some(alias) => alias.to_string(),
            None => format!("TRAP {vect:X}"),
        },
        SimInstr::RTI => "RTI".to_string(),
        SimInstr::Reserved(word) => format!("DATA {}", fmt_addr(word)),
    }
}

fn fmt_addr(addr: u16) -> String {
    format!("x{addr:04X}")
}
