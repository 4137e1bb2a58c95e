use crate::compiler::instruction::{jump_target, CompiledProgram, Instruction, Routine};
use std::fmt::Write;

/// Listing of a compiled program: main first, then labels alphabetically
pub fn disassemble(program: &CompiledProgram) -> String {
    let mut out = String::new();
    write_code_object(&mut out, &Routine::Main, &program.main);
    for name in program.label_names() {
        if let Some(body) = program.labels.get(name) {
            write_code_object(&mut out, &Routine::Label(name.to_string()), body);
        }
    }
    out
}

fn write_code_object(out: &mut String, routine: &Routine, ops: &[Instruction]) {
    let _ = writeln!(out, "════════════════════════════════════════");
    let _ = writeln!(out, " {}", routine);
    let _ = writeln!(out, " {} instructions", ops.len());
    let _ = writeln!(out, "════════════════════════════════════════");
    for line in listing(ops) {
        let _ = writeln!(out, "{}", line);
    }
    let _ = writeln!(out);
}

/// One line per instruction; jump targets are marked with `►`
pub fn listing(ops: &[Instruction]) -> Vec<String> {
    let targets = collect_jump_targets(ops);

    ops.iter()
        .enumerate()
        .map(|(ip, op)| {
            let marker = if targets.contains(&ip) { "► " } else { "  " };
            match op.jump_offset().and_then(|offset| jump_target(ip, offset)) {
                Some(target) => format!("{:04} {}{:<20} ; -> {:04}", ip, marker, op.to_string(), target),
                None => format!("{:04} {}{}", ip, marker, op),
            }
        })
        .collect()
}

fn collect_jump_targets(ops: &[Instruction]) -> Vec<usize> {
    let mut targets = Vec::new();

    for (ip, op) in ops.iter().enumerate() {
        if let Some(target) = op.jump_offset().and_then(|offset| jump_target(ip, offset)) {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::Value;

    #[test]
    fn test_listing_marks_targets() {
        let ops = vec![
            Instruction::PushValue(Value::Boolean(true)),
            Instruction::ConditionalJump(1),
            Instruction::Halt,
            Instruction::Jump(-3),
        ];
        let lines = listing(&ops);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("0000 ► PUSH"));
        assert!(lines[1].contains("-> 0003"));
        assert!(lines[3].starts_with("0003 ► JUMP"));
        assert!(lines[2].starts_with("0002   HALT"));
    }

    #[test]
    fn test_disassemble_lists_labels() {
        let mut program = CompiledProgram {
            main: vec![Instruction::Call("b".to_string())].into(),
            ..Default::default()
        };
        program.labels.insert("b".to_string(), vec![Instruction::Halt].into());
        program.labels.insert("a".to_string(), Vec::new().into());

        let text = disassemble(&program);
        let main = text.find("\n main\n").unwrap();
        let a = text.find("\n a:\n").unwrap();
        let b = text.find("\n b:\n").unwrap();
        assert!(main < a && a < b);
        assert!(text.contains("CALL        b"));
    }
}
