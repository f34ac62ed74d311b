//! The decoded form of an LC-3 instruction word.
//!
//! [`SimInstr`] is a closed enum covering all 16 opcode slots.
//! Every 16-bit word decodes to some [`SimInstr`] ([`SimInstr::decode`]),
//! and every [`SimInstr`] encodes back to a word ([`SimInstr::encode`]).

use super::{CondCode, IOffset, ImmOrReg, Reg, TrapVect8};

/// An instruction, as the simulator executes it.
///
/// The operands are already resolved and fit in their fields,
/// so encoding cannot fail.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[allow(clippy::upper_case_acronyms)]
pub enum SimInstr {
    /// `0000 nzp PCoffset9`
    BR(CondCode, IOffset<9>),
    /// `0001 DR SR1 0 00 SR2` or `0001 DR SR1 1 imm5`
    ADD(Reg, Reg, ImmOrReg<5>),
    /// `0010 DR PCoffset9`
    LD(Reg, IOffset<9>),
    /// `0011 SR PCoffset9`
    ST(Reg, IOffset<9>),
    /// `0100 1 PCoffset11` or `0100 0 00 BaseR 000000`
    JSR(ImmOrReg<11>),
    /// `0101 DR SR1 0 00 SR2` or `0101 DR SR1 1 imm5`
    AND(Reg, Reg, ImmOrReg<5>),
    /// `0110 DR BaseR offset6`
    LDR(Reg, Reg, IOffset<6>),
    /// `0111 SR BaseR offset6`
    STR(Reg, Reg, IOffset<6>),
    /// `1000 000000000000`
    RTI,
    /// `1001 DR SR 111111`
    NOT(Reg, Reg),
    /// `1010 DR PCoffset9`
    LDI(Reg, IOffset<9>),
    /// `1011 SR PCoffset9`
    STI(Reg, IOffset<9>),
    /// `1100 000 BaseR 000000`
    JMP(Reg),
    /// The reserved opcode `1101`, holding the raw word.
    Reserved(u16),
    /// `1110 DR PCoffset9`
    LEA(Reg, IOffset<9>),
    /// `1111 0000 trapvect8`
    TRAP(TrapVect8),
}

impl SimInstr {
    /// Gets the opcode (the top 4 bits) of this instruction.
    pub fn opcode(&self) -> u16 {
        match self {
            SimInstr::BR(_, _)     => 0b0000,
            SimInstr::ADD(_, _, _) => 0b0001,
            SimInstr::LD(_, _)     => 0b0010,
            SimInstr::ST(_, _)     => 0b0011,
            SimInstr::JSR(_)       => 0b0100,
            SimInstr::AND(_, _, _) => 0b0101,
            SimInstr::LDR(_, _, _) => 0b0110,
            SimInstr::STR(_, _, _) => 0b0111,
            SimInstr::RTI          => 0b1000,
            SimInstr::NOT(_, _)    => 0b1001,
            SimInstr::LDI(_, _)    => 0b1010,
            SimInstr::STI(_, _)    => 0b1011,
            SimInstr::JMP(_)       => 0b1100,
            SimInstr::Reserved(_)  => 0b1101,
            SimInstr::LEA(_, _)    => 0b1110,
            SimInstr::TRAP(_)      => 0b1111,
        }
    }

    /// Encodes this instruction as a 16-bit word.
    ///
    /// ```
    /// # use lc3_tutor::ast::{reg_consts::*, IOffset, ImmOrReg};
    /// # use lc3_tutor::ast::sim::SimInstr;
    /// let add = SimInstr::ADD(R1, R1, ImmOrReg::Imm(IOffset::new_trunc(1)));
    /// assert_eq!(add.encode(), 0x1261);
    /// ```
    pub fn encode(&self) -> u16 {
        let op = self.opcode() << 12;
        match *self {
            SimInstr::BR(cc, off) => op | (u16::from(cc & 0b111) << 9) | field(off.get(), 9),
            SimInstr::ADD(dr, sr1, sr2) | SimInstr::AND(dr, sr1, sr2) => {
                op | (u16::from(dr) << 9) | (u16::from(sr1) << 6) | match sr2 {
                    ImmOrReg::Imm(imm) => (1 << 5) | field(imm.get(), 5),
                    ImmOrReg::Reg(r)   => u16::from(r),
                }
            },
            SimInstr::LD(r, off)
            | SimInstr::ST(r, off)
            | SimInstr::LDI(r, off)
            | SimInstr::STI(r, off)
            | SimInstr::LEA(r, off) => op | (u16::from(r) << 9) | field(off.get(), 9),
            SimInstr::JSR(ImmOrReg::Imm(off)) => op | (1 << 11) | field(off.get(), 11),
            SimInstr::JSR(ImmOrReg::Reg(br))  => op | (u16::from(br) << 6),
            SimInstr::LDR(r, br, off) | SimInstr::STR(r, br, off) => {
                op | (u16::from(r) << 9) | (u16::from(br) << 6) | field(off.get(), 6)
            },
            SimInstr::RTI => op,
            SimInstr::NOT(dr, sr) => op | (u16::from(dr) << 9) | (u16::from(sr) << 6) | 0b111111,
            SimInstr::JMP(br) => op | (u16::from(br) << 6),
            SimInstr::Reserved(word) => word,
            SimInstr::TRAP(vect) => op | vect.get(),
        }
    }

    /// Decodes a 16-bit word into an instruction.
    ///
    /// Decoding never fails. Bits that the ISA requires to be zero are ignored.
    ///
    /// ```
    /// # use lc3_tutor::ast::sim::SimInstr;
    /// assert!(matches!(SimInstr::decode(0xF025), SimInstr::TRAP(v) if v.get() == 0x25));
    /// assert_eq!(SimInstr::decode(0xD123), SimInstr::Reserved(0xD123));
    /// ```
    pub fn decode(word: u16) -> Self {
        let r9 = Reg::from_field(word, 9);
        let r6 = Reg::from_field(word, 6);
        let r0 = Reg::from_field(word, 0);
        let off9 = IOffset::<9>::new_trunc(word as i16);
        let off6 = IOffset::<6>::new_trunc(word as i16);
        let imm_or_reg = || match word & (1 << 5) != 0 {
            true  => ImmOrReg::Imm(IOffset::new_trunc(word as i16)),
            false => ImmOrReg::Reg(r0),
        };

        match word >> 12 {
            0b0000 => SimInstr::BR(((word >> 9) & 0b111) as CondCode, off9),
            0b0001 => SimInstr::ADD(r9, r6, imm_or_reg()),
            0b0010 => SimInstr::LD(r9, off9),
            0b0011 => SimInstr::ST(r9, off9),
            0b0100 => match word & (1 << 11) != 0 {
                true  => SimInstr::JSR(ImmOrReg::Imm(IOffset::new_trunc(word as i16))),
                false => SimInstr::JSR(ImmOrReg::Reg(r6)),
            },
            0b0101 => SimInstr::AND(r9, r6, imm_or_reg()),
            0b0110 => SimInstr::LDR(r9, r6, off6),
            0b0111 => SimInstr::STR(r9, r6, off6),
            0b1000 => SimInstr::RTI,
            0b1001 => SimInstr::NOT(r9, r6),
            0b1010 => SimInstr::LDI(r9, off9),
            0b1011 => SimInstr::STI(r9, off9),
            0b1100 => SimInstr::JMP(r6),
            0b1101 => SimInstr::Reserved(word),
            0b1110 => SimInstr::LEA(r9, off9),
            _      => SimInstr::TRAP(TrapVect8::new_trunc(word)),
        }
    }
}

/// Masks a signed value into the low `bits` of a word.
fn field(value: i16, bits: u32) -> u16 {
    (value as u16) & ((1 << bits) - 1)
}

#[cfg(test)]
mod tests {
    use crate::ast::reg_consts::*;
    use crate::ast::{IOffset, ImmOrReg, TrapVect8};

    use super::SimInstr;

    #[test]
    fn test_encode() {
        assert_eq!(SimInstr::ADD(R0, R1, ImmOrReg::Reg(R2)).encode(), 0x1042);
        assert_eq!(SimInstr::ADD(R0, R0, ImmOrReg::Imm(IOffset::new_trunc(-3))).encode(), 0x103D);
        assert_eq!(SimInstr::AND(R2, R2, ImmOrReg::Imm(IOffset::new_trunc(0))).encode(), 0x54A0);
        assert_eq!(SimInstr::NOT(R1, R2).encode(), 0x927F);
        assert_eq!(SimInstr::BR(0b111, IOffset::new_trunc(-1)).encode(), 0x0FFF);
        assert_eq!(SimInstr::BR(0b000, IOffset::new_trunc(0)).encode(), 0x0000);
        assert_eq!(SimInstr::JMP(R7).encode(), 0xC1C0);
        assert_eq!(SimInstr::JSR(ImmOrReg::Imm(IOffset::new_trunc(-1024))).encode(), 0x4C00);
        assert_eq!(SimInstr::JSR(ImmOrReg::Reg(R3)).encode(), 0x40C0);
        assert_eq!(SimInstr::LDR(R0, R6, IOffset::new_trunc(-1)).encode(), 0x61BF);
        assert_eq!(SimInstr::STR(R7, R6, IOffset::new_trunc(1)).encode(), 0x7F81);
        assert_eq!(SimInstr::LEA(R0, IOffset::new_trunc(2)).encode(), 0xE002);
        assert_eq!(SimInstr::TRAP(TrapVect8::new_trunc(0x22)).encode(), 0xF022);
        assert_eq!(SimInstr::RTI.encode(), 0x8000);
    }

    #[test]
    fn test_decode() {
        assert_eq!(SimInstr::decode(0x1042), SimInstr::ADD(R0, R1, ImmOrReg::Reg(R2)));
        assert_eq!(SimInstr::decode(0x103D), SimInstr::ADD(R0, R0, ImmOrReg::Imm(IOffset::new_trunc(-3))));
        assert_eq!(SimInstr::decode(0x0FFF), SimInstr::BR(0b111, IOffset::new_trunc(-1)));
        assert_eq!(SimInstr::decode(0xC1C0), SimInstr::JMP(R7));
        assert_eq!(SimInstr::decode(0x4C00), SimInstr::JSR(ImmOrReg::Imm(IOffset::new_trunc(-1024))));
        assert_eq!(SimInstr::decode(0x61BF), SimInstr::LDR(R0, R6, IOffset::new_trunc(-1)));
        assert_eq!(SimInstr::decode(0x8000), SimInstr::RTI);
        assert_eq!(SimInstr::decode(0xD000), SimInstr::Reserved(0xD000));
    }

    #[test]
    fn test_every_word_decodes() {
        // Every word decodes, and words without "don't care" bits encode back to themselves.
        for word in 0..=u16::MAX {
            let instr = SimInstr::decode(word);
            assert_eq!(instr.opcode(), word >> 12);
            assert_eq!(SimInstr::decode(instr.encode()), instr);
        }
    }
}
