use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use lc3_tutor::asm::assemble;
use lc3_tutor::asm::disasm::disassemble;
use lc3_tutor::ast::reg_consts::*;
use lc3_tutor::ast::sim::SimInstr;
use lc3_tutor::ast::Reg;
use lc3_tutor::sim::{RunOutcome, Simulator};

/// Rewrites a disassembled absolute target (`xADDR`) as a literal PC offset.
fn relative(text: &str, addr: u16) -> String {
    match text.rsplit_once(" x") {
        Some((head, hex)) if !text.starts_with("TRAP") => {
            let target = u16::from_str_radix(hex, 16).unwrap();
            format!("{head} #{}", target.wrapping_sub(addr.wrapping_add(1)) as i16)
        },
        _ => text.to_string(),
    }
}

fn sim_with(src: &str) -> Simulator {
    let obj = assemble(src).into_object().unwrap();
    let mut sim = Simulator::default();
    sim.load_obj_file(&obj);
    sim
}

#[test]
fn test_hello() {
    let src = ".ORIG x3000\nLEA R0, HELLO\nPUTS\nHALT\nHELLO .STRINGZ \"Hi\"\n.END";
    let asm = assemble(src);
    assert!(asm.errors.is_empty());

    let mut sim = Simulator::default();
    sim.load(asm.origin, &asm.words);
    let result = sim.run(1000);

    assert!(result.completed());
    assert!(!result.waiting_for_input());
    assert_eq!(sim.output(), "Hi");
    assert!(sim.snapshot().halted);
}

#[test]
fn test_deterministic() {
    let src = std::fs::read_to_string("tests/files/countdown.asm").unwrap();
    assert_eq!(assemble(&src), assemble(&src));
}

#[test]
fn test_imm_range_error() {
    let asm = assemble(".ORIG x3000\nADD R0, R0, #20\nHALT\n.END");
    assert_eq!(asm.errors.len(), 1);
    assert_eq!(asm.errors[0].line, 2);
    assert!(asm.errors[0].to_string().contains("5 bits"), "{}", asm.errors[0]);
}

#[test]
fn test_getc_waits() {
    let mut sim = sim_with(".ORIG x3000\nGETC\nADD R1, R0, #1\nHALT\n.END");

    let result = sim.run(100);
    assert!(!result.completed());
    assert!(result.waiting_for_input());
    assert_eq!(result.steps, 0);
    assert_eq!(sim.stats().instructions_executed, 0);
    assert_eq!(sim.pc, 0x3000);

    sim.push_input(b'A');
    let result = sim.run(100);
    assert!(result.completed());
    assert_eq!(sim.reg_file[R0], 0x41);
    assert_eq!(sim.reg_file[R1], 0x42);
}

#[test]
fn test_infinite_loop() {
    let mut sim = sim_with(".ORIG x3000\nLOOP BRnzp LOOP\n.END");
    let result = sim.run(1000);

    assert!(!result.completed());
    assert!(!result.waiting_for_input());
    assert_eq!(result.steps, 1000);
    assert_eq!(result.outcome, RunOutcome::StepLimit);
}

#[test]
fn test_merge_images() {
    let main = assemble("
        .ORIG x3000
        LD R1, SUB_ADDR
        JSRR R1
        HALT
        SUB_ADDR .FILL x4000
        .END
    ").into_object().unwrap();
    let sub = assemble("
        .ORIG x4000
        ADD R0, R0, #9
        RET
        .END
    ").into_object().unwrap();

    let mut sim = Simulator::default();
    sim.load_obj_file(&main);
    sim.load_at(sub.origin(), sub.words());
    assert_eq!(sim.pc, 0x3000);

    for (addr, word) in main.iter().chain(sub.iter()) {
        assert_eq!(sim.read_mem_raw(addr), word);
    }
    assert!(sim.run(100).completed());
    assert_eq!(sim.reg_file[R0], 9);
}

#[test]
fn test_pc_relative_uses_next_address() {
    let src = "
        .ORIG x3000
        LD R0, DATA
        DATA .FILL #7
        .END
    ";
    let asm = assemble(src);
    // offset is 0, since DATA is the instruction right after LD
    assert_eq!(asm.words[0], 0x2000);
}

#[test]
fn test_reset_reproduces() {
    let src = std::fs::read_to_string("tests/files/countdown.asm").unwrap();
    let obj = assemble(&src).into_object().unwrap();

    let trace = |sim: &mut Simulator| {
        let mut pcs = vec![];
        while sim.step() {
            pcs.push((sim.pc, sim.reg_file.values()));
        }
        (pcs, sim.output().to_string(), sim.stats())
    };

    let mut sim = Simulator::default();
    sim.load_obj_file(&obj);
    let first = trace(&mut sim);

    sim.reset();
    sim.load_obj_file(&obj);
    let second = trace(&mut sim);

    assert_eq!(first, second);
    assert_eq!(first.1, "54321\n");
}

#[test]
fn test_disassemble_reassembles() {
    let src = std::fs::read_to_string("tests/files/countdown.asm").unwrap();
    let asm = assemble(&src);
    assert!(asm.errors.is_empty());

    for (addr, line) in asm.source_map.iter() {
        let word = asm.words[usize::from(addr - asm.origin)];
        let text = relative(&disassemble(word, addr), addr);
        // data lines do not disassemble to their directive
        if src.lines().nth(line - 1).is_some_and(|l| l.contains('.')) { continue; }

        let reasm = assemble(&format!(".ORIG x{addr:04X}\n{text}\n.END"));
        assert!(reasm.errors.is_empty(), "{text:?} failed to reassemble: {:?}", reasm.errors);
        assert_eq!(reasm.words, [word], "{text:?} reassembled differently");
    }
}

#[test]
fn test_nzp_invariant() {
    let mut rng = StdRng::seed_from_u64(0x4C43);
    let mut sim = Simulator::default();

    for _ in 0..2000 {
        let (a, b) = (rng.gen::<u16>(), rng.gen::<u16>());
        let dr = Reg::new(rng.gen_range(0..8)).unwrap();
        let instr = match rng.gen_range(0..5) {
            0 => format!("ADD {dr}, R1, R2"),
            1 => format!("AND {dr}, R1, R2"),
            2 => format!("NOT {dr}, R1"),
            3 => format!("ADD {dr}, R1, #{}", rng.gen_range(-16..16)),
            _ => format!("AND {dr}, R2, #{}", rng.gen_range(-16..16)),
        };
        let obj = assemble(&format!(".ORIG x3000\n{instr}\n.END")).into_object().unwrap();

        sim.reset();
        sim.load_obj_file(&obj);
        sim.reg_file[R1] = a;
        sim.reg_file[R2] = b;
        assert!(sim.step());

        let state = sim.snapshot();
        let value = state.regs[usize::from(dr.reg_no())] as i16;
        let flags = [state.n(), state.z(), state.p()];
        assert_eq!(flags.iter().filter(|&&f| f).count(), 1, "{instr} with R1={a:#06X}, R2={b:#06X}");
        assert_eq!(flags, [value < 0, value == 0, value > 0], "{instr} with R1={a:#06X}, R2={b:#06X}");
    }
}

#[test]
fn test_random_words_round_trip() {
    let mut rng = StdRng::seed_from_u64(2110);

    for _ in 0..5000 {
        let word: u16 = rng.gen();
        let instr = SimInstr::decode(word);
        let canonical = instr.encode();
        assert_eq!(SimInstr::decode(canonical), instr, "{word:#06X}");
        assert_eq!(SimInstr::decode(canonical).encode(), canonical, "{word:#06X}");
    }
}
