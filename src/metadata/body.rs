//! Method body and instruction model.
//!
//! Bodies hold a flat instruction list with index-based branch targets rather
//! than byte offsets; [`MethodBody::insert`] keeps targets consistent when the
//! rewriting passes splice instructions in, so no offset fixup pass is needed.

use crate::metadata::signatures::{MemberRef, TypeSig};
use crate::Result;

/// CIL opcodes the rewriting passes read or emit.
///
/// This is not the full instruction set; it covers call and field access
/// shapes, object construction, the token loads, and enough control flow to
/// keep branch targets intact while splicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[allow(missing_docs)]
pub enum OpCode {
    #[strum(serialize = "nop")]
    Nop,
    #[strum(serialize = "dup")]
    Dup,
    #[strum(serialize = "pop")]
    Pop,
    #[strum(serialize = "ret")]
    Ret,
    #[strum(serialize = "ldnull")]
    Ldnull,
    #[strum(serialize = "throw")]
    Throw,
    #[strum(serialize = "ldstr")]
    Ldstr,
    #[strum(serialize = "ldc.i4")]
    LdcI4,
    #[strum(serialize = "ldarg")]
    Ldarg,
    #[strum(serialize = "ldloc")]
    Ldloc,
    #[strum(serialize = "stloc")]
    Stloc,
    #[strum(serialize = "ldloca")]
    Ldloca,
    #[strum(serialize = "call")]
    Call,
    #[strum(serialize = "callvirt")]
    Callvirt,
    #[strum(serialize = "newobj")]
    Newobj,
    #[strum(serialize = "ldfld")]
    Ldfld,
    #[strum(serialize = "ldsfld")]
    Ldsfld,
    #[strum(serialize = "stfld")]
    Stfld,
    #[strum(serialize = "stsfld")]
    Stsfld,
    #[strum(serialize = "ldflda")]
    Ldflda,
    #[strum(serialize = "ldsflda")]
    Ldsflda,
    #[strum(serialize = "ldtoken")]
    Ldtoken,
    #[strum(serialize = "box")]
    Box,
    #[strum(serialize = "unbox.any")]
    UnboxAny,
    #[strum(serialize = "castclass")]
    Castclass,
    #[strum(serialize = "isinst")]
    Isinst,
    #[strum(serialize = "br")]
    Br,
    #[strum(serialize = "brtrue")]
    Brtrue,
    #[strum(serialize = "brfalse")]
    Brfalse,
}

/// An instruction operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand
    None,
    /// Inline 32-bit integer
    Int32(i32),
    /// Inline string
    String(String),
    /// A member reference (call, field access, `ldtoken`)
    Member(MemberRef),
    /// A type signature (`box`, casts, `ldtoken`)
    Type(TypeSig),
    /// Argument slot index
    Arg(u16),
    /// Local variable slot index
    Local(u16),
    /// Branch target, as an instruction index into the owning body
    Target(usize),
}

/// A single instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The opcode
    pub opcode: OpCode,
    /// The operand, [`Operand::None`] for operand-less opcodes
    pub operand: Operand,
}

impl Instruction {
    /// An instruction with no operand.
    #[must_use]
    pub fn simple(opcode: OpCode) -> Self {
        Instruction {
            opcode,
            operand: Operand::None,
        }
    }

    /// An instruction with a member operand.
    #[must_use]
    pub fn member(opcode: OpCode, member: MemberRef) -> Self {
        Instruction {
            opcode,
            operand: Operand::Member(member),
        }
    }

    /// An instruction with a local slot operand.
    #[must_use]
    pub fn local(opcode: OpCode, slot: u16) -> Self {
        Instruction {
            opcode,
            operand: Operand::Local(slot),
        }
    }

    /// The member operand, if present.
    #[must_use]
    pub fn member_operand(&self) -> Option<&MemberRef> {
        match &self.operand {
            Operand::Member(member) => Some(member),
            _ => None,
        }
    }
}

/// An exception handler region. All ranges are half-open instruction index
/// ranges into the owning body.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionHandler {
    /// First protected instruction
    pub try_start: usize,
    /// Past the last protected instruction
    pub try_end: usize,
    /// First handler instruction
    pub handler_start: usize,
    /// Past the last handler instruction
    pub handler_end: usize,
    /// Catch type for typed handlers, `None` for finally and fault
    pub catch_type: Option<TypeSig>,
}

/// A method body: locals, exception handlers and the instruction stream.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodBody {
    /// Whether locals are zero-initialized
    pub init_locals: bool,
    /// Local variable types by slot
    pub locals: Vec<TypeSig>,
    /// Exception handler regions
    pub handlers: Vec<ExceptionHandler>,
    /// The instruction stream
    pub instructions: Vec<Instruction>,
}

impl MethodBody {
    /// Creates a body from an instruction list, no locals.
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        MethodBody {
            init_locals: true,
            locals: Vec::new(),
            handlers: Vec::new(),
            instructions,
        }
    }

    /// The canonical placeholder body emitted for cloned member shells:
    /// load a null reference and throw.
    #[must_use]
    pub fn throw_stub() -> Self {
        MethodBody::new(vec![
            Instruction::simple(OpCode::Ldnull),
            Instruction::simple(OpCode::Throw),
        ])
    }

    /// Appends a local variable and returns its slot index.
    ///
    /// # Errors
    /// Fails when all 65536 local slots are taken.
    pub fn add_local(&mut self, local_type: TypeSig) -> Result<u16> {
        let slot = u16::try_from(self.locals.len())
            .map_err(|_| invalid_error!("local variable slots exhausted"))?;
        self.locals.push(local_type);
        Ok(slot)
    }

    /// Splices instructions in at `at`, shifting branch targets and handler
    /// ranges that point at or beyond the insertion point.
    pub fn insert(&mut self, at: usize, instructions: Vec<Instruction>) {
        let shift = instructions.len();
        for instruction in &mut self.instructions {
            if let Operand::Target(target) = &mut instruction.operand {
                if *target >= at {
                    *target += shift;
                }
            }
        }
        for handler in &mut self.handlers {
            for edge in [
                &mut handler.try_start,
                &mut handler.try_end,
                &mut handler.handler_start,
                &mut handler.handler_end,
            ] {
                if *edge >= at {
                    *edge += shift;
                }
            }
        }
        self.instructions.splice(at..at, instructions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throw_stub_shape() {
        let body = MethodBody::throw_stub();
        assert_eq!(body.instructions.len(), 2);
        assert_eq!(body.instructions[0].opcode, OpCode::Ldnull);
        assert_eq!(body.instructions[1].opcode, OpCode::Throw);
    }

    #[test]
    fn test_insert_shifts_branch_targets() {
        let mut body = MethodBody::new(vec![
            Instruction {
                opcode: OpCode::Brtrue,
                operand: Operand::Target(2),
            },
            Instruction::simple(OpCode::Nop),
            Instruction::simple(OpCode::Ret),
        ]);

        body.insert(
            1,
            vec![
                Instruction::local(OpCode::Stloc, 0),
                Instruction::local(OpCode::Ldloca, 0),
            ],
        );

        assert_eq!(body.instructions.len(), 5);
        assert_eq!(body.instructions[0].operand, Operand::Target(4));
        assert_eq!(body.instructions[4].opcode, OpCode::Ret);
    }

    #[test]
    fn test_add_local_rejects_slot_overflow() {
        use crate::metadata::signatures::Primitive;

        let mut body = MethodBody::default();
        body.locals = vec![TypeSig::Primitive(Primitive::I4); usize::from(u16::MAX)];

        // slot 65535 is the last one available
        assert_eq!(
            body.add_local(TypeSig::Primitive(Primitive::I4)).unwrap(),
            u16::MAX
        );
        assert!(body.add_local(TypeSig::Primitive(Primitive::I4)).is_err());
    }

    #[test]
    fn test_insert_shifts_handler_ranges() {
        let mut body = MethodBody::new(vec![
            Instruction::simple(OpCode::Nop),
            Instruction::simple(OpCode::Nop),
            Instruction::simple(OpCode::Ret),
        ]);
        body.handlers.push(ExceptionHandler {
            try_start: 0,
            try_end: 1,
            handler_start: 1,
            handler_end: 2,
            catch_type: None,
        });

        body.insert(1, vec![Instruction::simple(OpCode::Nop)]);

        assert_eq!(body.handlers[0].try_start, 0);
        assert_eq!(body.handlers[0].try_end, 2);
        assert_eq!(body.handlers[0].handler_start, 2);
        assert_eq!(body.handlers[0].handler_end, 3);
    }

    #[test]
    fn test_opcode_display() {
        assert_eq!(OpCode::LdcI4.to_string(), "ldc.i4");
        assert_eq!(OpCode::UnboxAny.to_string(), "unbox.any");
    }
}
