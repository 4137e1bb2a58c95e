// Execution engine for the tape machine

use crate::compiler::instruction::{jump_target, CompiledProgram, Instruction, Routine};
use crate::interpreter::errors::MachineFault;
use crate::memory::cursor::Cursor;
use crate::memory::value::Value;
use crate::parser::ast::{Direction, ValueType};
use crate::snapshot::Snapshot;
use std::rc::Rc;

/// Single-step stack machine.
///
/// Every call to [`Interpreter::step`] has exactly one unit of effect: one
/// instruction, or one cell of a multi-cell move. A move of `n` cells takes
/// `n` steps so a driver can watch each of them; a move of zero cells takes
/// one step and goes nowhere.
///
/// An interpreter runs once. After a halt or the last instruction it keeps
/// nothing and further steps do nothing.
pub struct Interpreter {
    /// Main sequence and label bodies
    program: CompiledProgram,

    /// Sequence being executed, `None` once the run is over
    active: Option<Rc<[Instruction]>>,

    /// Which sequence is active
    routine: Routine,

    /// Index into `active` of the next instruction
    ip: usize,

    /// Evaluation stack
    stack: Vec<Value>,

    /// Cells still to travel for the move in progress
    pending_move: Option<(Direction, usize)>,

    steps: u64,

    /// Whether the run ended at a `Halt`
    halted: bool,
}

impl Interpreter {
    pub fn new(program: CompiledProgram) -> Self {
        let main = Rc::clone(&program.main);
        let mut interpreter = Interpreter {
            program,
            active: Some(main),
            routine: Routine::Main,
            ip: 0,
            stack: Vec::new(),
            pending_move: None,
            steps: 0,
            halted: false,
        };
        interpreter.finish_if_exhausted();
        interpreter
    }

    /// True while an instruction or part of a move is left
    pub fn has_more_work(&self) -> bool {
        self.pending_move.is_some() || self.active.is_some()
    }

    /// Perform one unit of effect against `cursor`.
    ///
    /// # Panics
    ///
    /// On a [`MachineFault`]: stack underflow, operand type confusion, a call
    /// to an unknown label, or a cursor that is dead or unregistered. None of
    /// these can come out of a program the parser accepted.
    pub fn step(&mut self, cursor: &mut Cursor) {
        if let Err(fault) = self.try_step(cursor) {
            panic!("{}", fault);
        }
    }

    fn try_step(&mut self, cursor: &mut Cursor) -> Result<(), MachineFault> {
        if let Some((direction, remaining)) = self.pending_move.take() {
            cursor.move_by(1, direction.is_right())?;
            if remaining > 1 {
                self.pending_move = Some((direction, remaining - 1));
            }
            self.steps += 1;
            self.finish_if_exhausted();
            return Ok(());
        }

        let Some(active) = self.active.clone() else {
            return Ok(());
        };
        let Some(instruction) = active.get(self.ip) else {
            self.finish();
            return Ok(());
        };
        self.steps += 1;

        match instruction {
            Instruction::PushValue(value) => {
                self.stack.push(*value);
                self.ip += 1;
            }

            Instruction::StackDuplicate => {
                let top = self.pop(instruction)?;
                self.stack.push(top);
                self.stack.push(top);
                self.ip += 1;
            }

            Instruction::Compare(op) => {
                let arity = op.arity();
                if self.stack.len() < arity {
                    return Err(MachineFault::StackUnderflow {
                        instruction: instruction.clone(),
                        ip: self.ip,
                    });
                }
                let operands = self.stack.split_off(self.stack.len() - arity);
                let result = op
                    .evaluate(&operands)
                    .map_err(|found| confusion(instruction, ValueType::Boolean, found))?;
                self.stack.push(Value::Boolean(result));
                self.ip += 1;
            }

            Instruction::Read => {
                let c = cursor.read()?;
                self.stack.push(Value::Character(c));
                self.ip += 1;
            }

            Instruction::Write => {
                let c = self.pop_char(instruction)?;
                cursor.write(c)?;
                self.ip += 1;
            }

            Instruction::Move(direction) => {
                let distance = self.pop_number(instruction)?;
                self.ip += 1;
                if distance != 0 {
                    // A negative distance walks the other way
                    let direction = match (distance < 0, direction) {
                        (false, d) => *d,
                        (true, Direction::Left) => Direction::Right,
                        (true, Direction::Right) => Direction::Left,
                    };
                    cursor.move_by(1, direction.is_right())?;
                    let remaining = distance.unsigned_abs() as usize - 1;
                    if remaining > 0 {
                        self.pending_move = Some((direction, remaining));
                    }
                }
            }

            Instruction::Jump(offset) => {
                self.ip = self.relocate(*offset)?;
            }

            Instruction::ConditionalJump(offset) => {
                if self.pop_bool(instruction)? {
                    self.ip = self.relocate(*offset)?;
                } else {
                    self.ip += 1;
                }
            }

            Instruction::Call(label) => {
                let body = self
                    .program
                    .label(label)
                    .ok_or_else(|| MachineFault::UnknownLabel(label.clone()))?;
                self.active = Some(body);
                self.routine = Routine::Label(label.clone());
                self.ip = 0;
            }

            Instruction::Halt => {
                self.halted = true;
                self.finish();
                return Ok(());
            }
        }

        self.finish_if_exhausted();
        Ok(())
    }

    fn relocate(&self, offset: i32) -> Result<usize, MachineFault> {
        jump_target(self.ip, offset).ok_or(MachineFault::JumpOutOfRange {
            ip: self.ip,
            offset,
        })
    }

    fn pop(&mut self, instruction: &Instruction) -> Result<Value, MachineFault> {
        self.stack.pop().ok_or_else(|| MachineFault::StackUnderflow {
            instruction: instruction.clone(),
            ip: self.ip,
        })
    }

    fn pop_number(&mut self, instruction: &Instruction) -> Result<i64, MachineFault> {
        let value = self.pop(instruction)?;
        value
            .as_number()
            .ok_or_else(|| confusion(instruction, ValueType::Number, value))
    }

    fn pop_char(&mut self, instruction: &Instruction) -> Result<char, MachineFault> {
        let value = self.pop(instruction)?;
        value
            .as_char()
            .ok_or_else(|| confusion(instruction, ValueType::Character, value))
    }

    fn pop_bool(&mut self, instruction: &Instruction) -> Result<bool, MachineFault> {
        let value = self.pop(instruction)?;
        value
            .as_bool()
            .ok_or_else(|| confusion(instruction, ValueType::Boolean, value))
    }

    fn finish_if_exhausted(&mut self) {
        if self.pending_move.is_some() {
            return;
        }
        let exhausted = self
            .active
            .as_ref()
            .map_or(true, |active| self.ip >= active.len());
        if exhausted {
            self.finish();
        }
    }

    /// Drop everything still pending
    fn finish(&mut self) {
        self.active = None;
        self.stack.clear();
        self.pending_move = None;
        self.ip = 0;
    }

    // ===== Inspection =====

    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    /// Index of the next instruction, `None` once the run is over
    pub fn instruction_pointer(&self) -> Option<usize> {
        self.active.as_ref().map(|_| self.ip)
    }

    /// The sequence being executed; empty once the run is over
    pub fn instructions(&self) -> &[Instruction] {
        self.active.as_deref().unwrap_or(&[])
    }

    pub fn current_instruction(&self) -> Option<&Instruction> {
        self.instructions().get(self.ip)
    }

    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Cells left on the move in progress
    pub fn pending_move(&self) -> usize {
        self.pending_move.map_or(0, |(_, remaining)| remaining)
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn program(&self) -> &CompiledProgram {
        &self.program
    }

    /// Capture the state a driver shows after a step
    pub fn capture(&self, cursor: &Cursor) -> Snapshot {
        Snapshot {
            view: cursor.snapshot(),
            routine: self.routine.clone(),
            instruction_pointer: self.instruction_pointer(),
            stack: self.stack.clone(),
            pending_move: self.pending_move(),
            steps: self.steps,
        }
    }
}

fn confusion(instruction: &Instruction, expected: ValueType, found: Value) -> MachineFault {
    MachineFault::TypeConfusion {
        instruction: instruction.clone(),
        expected,
        found: found.value_type(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::instruction::CompareOp;
    use crate::memory::shared_tape;
    use rustc_hash::FxHashMap;

    fn program(main: Vec<Instruction>) -> CompiledProgram {
        CompiledProgram {
            main: main.into(),
            labels: FxHashMap::default(),
            lines: FxHashMap::default(),
        }
    }

    fn run(interpreter: &mut Interpreter, cursor: &mut Cursor) -> u64 {
        while interpreter.has_more_work() {
            interpreter.step(cursor);
        }
        interpreter.steps_taken()
    }

    #[test]
    fn test_empty_program_has_no_work() {
        let interpreter = Interpreter::new(program(Vec::new()));
        assert!(!interpreter.has_more_work());
        assert_eq!(interpreter.instruction_pointer(), None);
    }

    #[test]
    fn test_move_is_one_step_per_cell() {
        let tape = shared_tape("", '_');
        let mut cursor = Cursor::new(Rc::clone(&tape), 0);
        let mut interpreter = Interpreter::new(program(vec![
            Instruction::PushValue(Value::Numeric(3)),
            Instruction::Move(Direction::Right),
        ]));

        interpreter.step(&mut cursor);
        assert_eq!(cursor.position(), Ok(0));
        interpreter.step(&mut cursor);
        assert_eq!(cursor.position(), Ok(1));
        assert_eq!(interpreter.pending_move(), 2);
        interpreter.step(&mut cursor);
        assert_eq!(cursor.position(), Ok(2));
        assert!(interpreter.has_more_work());
        interpreter.step(&mut cursor);
        assert_eq!(cursor.position(), Ok(3));
        assert!(!interpreter.has_more_work());
        assert_eq!(interpreter.steps_taken(), 4);
    }

    #[test]
    fn test_zero_move_is_one_step() {
        let tape = shared_tape("", '_');
        let mut cursor = Cursor::new(Rc::clone(&tape), 0);
        let mut interpreter = Interpreter::new(program(vec![
            Instruction::PushValue(Value::Numeric(0)),
            Instruction::Move(Direction::Left),
        ]));
        assert_eq!(run(&mut interpreter, &mut cursor), 2);
        assert_eq!(cursor.position(), Ok(0));
        assert_eq!(tape.borrow().len(), 1);
    }

    #[test]
    fn test_negative_move_reverses() {
        let tape = shared_tape("abc", '_');
        let mut cursor = Cursor::new(Rc::clone(&tape), 0);
        let mut interpreter = Interpreter::new(program(vec![
            Instruction::PushValue(Value::Numeric(-2)),
            Instruction::Move(Direction::Left),
        ]));
        assert_eq!(run(&mut interpreter, &mut cursor), 3);
        assert_eq!(cursor.read(), Ok('c'));
    }

    #[test]
    fn test_if_else_stack_is_balanced() {
        let tape = shared_tape("", '_');
        let mut cursor = Cursor::new(Rc::clone(&tape), 0);
        let mut interpreter = Interpreter::new(program(vec![
            Instruction::PushValue(Value::Boolean(false)),
            Instruction::StackDuplicate,
            Instruction::Compare(CompareOp::Not),
            Instruction::ConditionalJump(2),
            Instruction::PushValue(Value::Character('t')),
            Instruction::Write,
            Instruction::ConditionalJump(2),
            Instruction::PushValue(Value::Character('e')),
            Instruction::Write,
        ]));

        while interpreter.has_more_work() {
            interpreter.step(&mut cursor);
            if interpreter.instruction_pointer() == Some(7) {
                assert!(interpreter.stack().is_empty());
            }
        }
        assert_eq!(cursor.read(), Ok('e'));
        assert_eq!(interpreter.steps_taken(), 7);
    }

    #[test]
    fn test_if_else_true_branch_leaves_stack_empty() {
        let tape = shared_tape("", '_');
        let mut cursor = Cursor::new(Rc::clone(&tape), 0);
        let mut interpreter = Interpreter::new(program(vec![
            Instruction::PushValue(Value::Boolean(true)),
            Instruction::StackDuplicate,
            Instruction::Compare(CompareOp::Not),
            Instruction::ConditionalJump(2),
            Instruction::PushValue(Value::Character('t')),
            Instruction::Write,
            Instruction::ConditionalJump(2),
            Instruction::PushValue(Value::Character('e')),
            Instruction::Write,
        ]));

        while interpreter.has_more_work() {
            interpreter.step(&mut cursor);
            if interpreter.instruction_pointer() == Some(6) {
                assert_eq!(interpreter.stack(), &[Value::Boolean(true)]);
            }
        }
        assert!(interpreter.stack().is_empty());
        assert_eq!(cursor.read(), Ok('t'));
        assert_eq!(interpreter.steps_taken(), 7);
    }

    #[test]
    fn test_halt_clears_everything() {
        let tape = shared_tape("", '_');
        let mut cursor = Cursor::new(Rc::clone(&tape), 0);
        let mut interpreter = Interpreter::new(program(vec![
            Instruction::PushValue(Value::Numeric(1)),
            Instruction::Halt,
            Instruction::PushValue(Value::Character('x')),
            Instruction::Write,
        ]));

        interpreter.step(&mut cursor);
        assert_eq!(interpreter.stack(), &[Value::Numeric(1)]);
        interpreter.step(&mut cursor);
        assert!(!interpreter.has_more_work());
        assert!(interpreter.is_halted());
        assert!(interpreter.stack().is_empty());
        assert!(interpreter.instructions().is_empty());

        interpreter.step(&mut cursor);
        assert_eq!(interpreter.steps_taken(), 2);
        assert_eq!(cursor.read(), Ok('_'));
    }

    #[test]
    fn test_call_transfers_without_return() {
        let tape = shared_tape("", '_');
        let mut cursor = Cursor::new(Rc::clone(&tape), 0);
        let mut compiled = program(vec![
            Instruction::Call("mark".to_string()),
            Instruction::PushValue(Value::Character('n')),
            Instruction::Write,
        ]);
        compiled.labels.insert(
            "mark".to_string(),
            vec![
                Instruction::PushValue(Value::Character('y')),
                Instruction::Write,
            ]
            .into(),
        );
        let mut interpreter = Interpreter::new(compiled);

        interpreter.step(&mut cursor);
        assert_eq!(interpreter.routine(), &Routine::Label("mark".to_string()));
        assert_eq!(interpreter.instruction_pointer(), Some(0));
        assert_eq!(run(&mut interpreter, &mut cursor), 3);
        assert_eq!(cursor.read(), Ok('y'));
        assert!(!interpreter.is_halted());
    }

    #[test]
    #[should_panic(expected = "Stack underflow")]
    fn test_underflow_panics() {
        let tape = shared_tape("", '_');
        let mut cursor = Cursor::new(Rc::clone(&tape), 0);
        let mut interpreter = Interpreter::new(program(vec![Instruction::Write]));
        interpreter.step(&mut cursor);
    }

    #[test]
    #[should_panic(expected = "expected a boolean operand but found a number")]
    fn test_logical_op_on_number_panics() {
        let tape = shared_tape("", '_');
        let mut cursor = Cursor::new(Rc::clone(&tape), 0);
        let mut interpreter = Interpreter::new(program(vec![
            Instruction::PushValue(Value::Numeric(3)),
            Instruction::Compare(CompareOp::Not),
        ]));
        interpreter.step(&mut cursor);
        interpreter.step(&mut cursor);
    }

    #[test]
    fn test_current_instruction_follows_ip() {
        let tape = shared_tape("", '_');
        let mut cursor = Cursor::new(Rc::clone(&tape), 0);
        let mut interpreter = Interpreter::new(program(vec![
            Instruction::PushValue(Value::Numeric(2)),
            Instruction::Move(Direction::Right),
        ]));
        assert_eq!(
            interpreter.current_instruction(),
            Some(&Instruction::PushValue(Value::Numeric(2)))
        );
        interpreter.step(&mut cursor);
        assert_eq!(
            interpreter.current_instruction(),
            Some(&Instruction::Move(Direction::Right))
        );
        assert_eq!(run(&mut interpreter, &mut cursor), 3);
        assert_eq!(interpreter.current_instruction(), None);
    }

    #[test]
    #[should_panic(expected = "unknown label 'nowhere'")]
    fn test_unknown_label_panics() {
        let tape = shared_tape("", '_');
        let mut cursor = Cursor::new(Rc::clone(&tape), 0);
        let mut interpreter =
            Interpreter::new(program(vec![Instruction::Call("nowhere".to_string())]));
        interpreter.step(&mut cursor);
    }

    #[test]
    #[should_panic(expected = "has been unregistered")]
    fn test_dead_cursor_panics() {
        let tape = shared_tape("", '_');
        let mut cursor = Cursor::new(Rc::clone(&tape), 0);
        cursor.unregister();
        let mut interpreter = Interpreter::new(program(vec![Instruction::Read]));
        interpreter.step(&mut cursor);
    }

    #[test]
    fn test_capture() {
        let tape = shared_tape("q", '_');
        let mut cursor = Cursor::new(Rc::clone(&tape), 0);
        let mut interpreter = Interpreter::new(program(vec![
            Instruction::Read,
            Instruction::PushValue(Value::Numeric(1)),
        ]));
        interpreter.step(&mut cursor);
        let snapshot = interpreter.capture(&cursor);
        assert_eq!(snapshot.routine, Routine::Main);
        assert_eq!(snapshot.instruction_pointer, Some(1));
        assert_eq!(snapshot.stack, vec![Value::Character('q')]);
        assert_eq!(snapshot.view.tape.contents(), "q_");
    }
}
