use crate::compiler::instruction::{CompareOp, CompiledProgram, Instruction, Routine};
use crate::parser::ast::{Block, ExprKind, Expression, Item, Program, Statement, UnaryOp};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Compile a parsed program into its main sequence and label bodies
pub fn compile(program: &Program) -> CompiledProgram {
    Compiler::new().compile_program(program)
}

/// Instructions plus the source line each one came from
#[derive(Debug, Default)]
pub struct Code {
    pub ops: Vec<Instruction>,
    pub lines: Vec<usize>,
}

impl Code {
    fn push(&mut self, op: Instruction, line: usize) {
        self.ops.push(op);
        self.lines.push(line);
    }

    fn append(&mut self, other: Code) {
        self.ops.extend(other.ops);
        self.lines.extend(other.lines);
    }

    fn len(&self) -> usize {
        self.ops.len()
    }
}

pub struct Compiler {
    /// Compiled label bodies; a later definition replaces an earlier one
    labels: FxHashMap<String, Rc<[Instruction]>>,
    lines: FxHashMap<Routine, Rc<[usize]>>,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            labels: FxHashMap::default(),
            lines: FxHashMap::default(),
        }
    }

    pub fn compile_program(mut self, program: &Program) -> CompiledProgram {
        let mut main = Code::default();

        for item in &program.items {
            match item {
                Item::Statement(statement) => self.compile_statement(statement, &mut main),
                Item::Function(def) => {
                    let body = self.compile_block(&def.body);
                    self.labels.insert(def.name.clone(), body.ops.into());
                    self.lines
                        .insert(Routine::Label(def.name.clone()), body.lines.into());
                }
            }
        }

        self.lines.insert(Routine::Main, main.lines.into());
        CompiledProgram {
            main: main.ops.into(),
            labels: self.labels,
            lines: self.lines,
        }
    }

    pub fn compile_block(&mut self, block: &Block) -> Code {
        let mut code = Code::default();
        for statement in &block.statements {
            self.compile_statement(statement, &mut code);
        }
        code
    }

    fn compile_statement(&mut self, statement: &Statement, code: &mut Code) {
        let line = statement.line();
        match statement {
            Statement::Empty { .. } => {}

            Statement::Move {
                direction,
                distance,
                ..
            } => {
                compile_expression(distance, code);
                code.push(Instruction::Move(*direction), line);
            }

            Statement::Write { value, .. } => {
                compile_expression(value, code);
                code.push(Instruction::Write, line);
            }

            // Resolved by name when it runs, so labels may recurse
            Statement::Goto { label, .. } => code.push(Instruction::Call(label.clone()), line),

            Statement::Halt { .. } => code.push(Instruction::Halt, line),

            // cond NOT JUMP_IF(then) then
            Statement::If {
                condition,
                then_block,
                else_block: None,
                ..
            } => {
                let then_code = self.compile_block(then_block);
                compile_expression(condition, code);
                code.push(Instruction::Compare(CompareOp::Not), line);
                code.push(Instruction::ConditionalJump(then_code.len() as i32), line);
                code.append(then_code);
            }

            // cond DUP NOT JUMP_IF(then) then JUMP_IF(else) else
            //
            // The duplicated condition decides whether to skip the else branch
            // once the then branch is done.
            Statement::If {
                condition,
                then_block,
                else_block: Some(else_block),
                ..
            } => {
                let then_code = self.compile_block(then_block);
                let else_code = self.compile_block(else_block);
                compile_expression(condition, code);
                code.push(Instruction::StackDuplicate, line);
                code.push(Instruction::Compare(CompareOp::Not), line);
                code.push(Instruction::ConditionalJump(then_code.len() as i32), line);
                code.append(then_code);
                code.push(Instruction::ConditionalJump(else_code.len() as i32), else_block.line);
                code.append(else_code);
            }

            // cond NOT JUMP_IF(body + 1) body JUMP(back to cond)
            Statement::While {
                condition, body, ..
            } => {
                let start = code.len();
                let body_code = self.compile_block(body);
                compile_expression(condition, code);
                let cond_len = code.len() - start;
                code.push(Instruction::Compare(CompareOp::Not), line);
                code.push(Instruction::ConditionalJump(body_code.len() as i32 + 1), line);
                let body_len = body_code.len();
                code.append(body_code);
                code.push(
                    Instruction::Jump(-((body_len + 2 + cond_len) as i32)),
                    line,
                );
            }
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

fn compile_expression(expression: &Expression, code: &mut Code) {
    let line = expression.line();
    match expression.kind() {
        ExprKind::Binary { op, lhs, rhs } => {
            compile_expression(lhs, code);
            compile_expression(rhs, code);
            code.push(Instruction::Compare((*op).into()), line);
        }
        ExprKind::Unary {
            op: UnaryOp::Not,
            operand,
        } => {
            compile_expression(operand, code);
            code.push(Instruction::Compare(CompareOp::Not), line);
        }
        ExprKind::Nested(inner) => compile_expression(inner, code),
        ExprKind::Read => code.push(Instruction::Read, line),
        ExprKind::Literal(value) => code.push(Instruction::PushValue(*value), line),
    }
}
