//! Textual rendering
//!
//! Renders types, values, instructions and whole modules in an
//! assembly-flavored syntax for logs, tests and debugging. The output is
//! stable but not meant to be parsed back.
//!
//! Unnamed instruction results render as `%v<id>` from their arena id, so
//! two prints of the same module are identical.

use std::fmt;

use ember_common::{AtomicOrdering, CallConvention, InstrId};

use crate::instr::{InstrKind, Opcode};
use crate::module::{Function, Module};
use crate::value::Value;

impl Module {
    /// Bare rendering of a value, without its type
    pub fn value_to_string(&self, value: &Value) -> String {
        match value {
            Value::Constant(constant) => constant.to_string(),
            Value::Argument { index, .. } => format!("%{}", index),
            Value::Instr(id) => match self.instr(*id).name() {
                Some(name) => format!("%{}", name),
                None => format!("%v{}", id),
            },
            Value::Function(id) => format!("@{}", self.function(*id).name()),
            Value::BlockAddress { function, block } => format!(
                "blockaddress(@{}, %{})",
                self.function(*function).name(),
                self.block(*block).name()
            ),
        }
    }

    /// Value with its type prefix, as operands are rendered
    pub fn typed_value_to_string(&self, value: &Value) -> String {
        format!("{} {}", self.type_of(value), self.value_to_string(value))
    }

    fn label(&self, block: ember_common::BlockId) -> String {
        format!("label %{}", self.block(block).name())
    }

    /// One instruction in assembly-flavored text
    pub fn instr_to_string(&self, id: InstrId) -> String {
        let instr = self.instr(id);
        let mut out = String::new();
        if !instr.result_type().is_void() {
            out.push_str(&self.value_to_string(&Value::Instr(id)));
            out.push_str(" = ");
        }

        let operand = |i: usize| self.value_to_string(&instr.operands()[i]);
        let typed = |i: usize| self.typed_value_to_string(&instr.operands()[i]);

        match (instr.opcode(), &instr.kind) {
            (Opcode::Return, _) => {
                if instr.operand_count() == 0 {
                    out.push_str("ret void");
                } else {
                    out.push_str(&format!("ret {}", typed(0)));
                }
            }
            (Opcode::Branch, _) => {
                out.push_str(&format!("br {}", self.label(instr.successors()[0])));
            }
            (Opcode::CondBranch, _) => {
                out.push_str(&format!(
                    "br {}, {}, {}",
                    typed(0),
                    self.label(instr.successors()[0]),
                    self.label(instr.successors()[1])
                ));
            }
            (Opcode::Switch, InstrKind::Switch { cases }) => {
                out.push_str(&format!(
                    "switch {}, {} [",
                    typed(0),
                    self.label(instr.successors()[0])
                ));
                for (i, (value, dest)) in cases.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&format!(
                        " {}, {}",
                        value.to_typed_string(),
                        self.label(*dest)
                    ));
                }
                out.push_str(" ]");
            }
            (Opcode::IndirectBranch, _) => {
                let targets: Vec<String> = instr
                    .successors()
                    .iter()
                    .map(|dest| self.label(*dest))
                    .collect();
                out.push_str(&format!(
                    "indirectbr {}, [{}]",
                    typed(0),
                    targets.join(", ")
                ));
            }
            (Opcode::Unreachable, _) => out.push_str("unreachable"),
            (Opcode::FloatNeg, _) => out.push_str(&format!("fneg {}", typed(0))),
            (opcode, InstrKind::Binary { wrap, exact }) => {
                out.push_str(opcode.mnemonic());
                if !wrap.flag().is_empty() {
                    out.push(' ');
                    out.push_str(wrap.flag());
                }
                if *exact {
                    out.push_str(" exact");
                }
                out.push_str(&format!(" {}, {}", typed(0), operand(1)));
            }
            (
                Opcode::FloatAdd
                | Opcode::FloatSub
                | Opcode::FloatMul
                | Opcode::FloatDiv
                | Opcode::FloatRem,
                _,
            ) => {
                out.push_str(&format!(
                    "{} {}, {}",
                    instr.opcode().mnemonic(),
                    typed(0),
                    operand(1)
                ));
            }
            (Opcode::Alloca, InstrKind::Alloca { allocated }) => {
                out.push_str(&format!("alloca {}", allocated));
            }
            (Opcode::Load, InstrKind::Load { ordering, volatile }) => {
                out.push_str("load");
                if *ordering != AtomicOrdering::NotAtomic {
                    out.push_str(" atomic");
                }
                if *volatile {
                    out.push_str(" volatile");
                }
                out.push_str(&format!(" {}, {}", instr.result_type(), typed(0)));
                if *ordering != AtomicOrdering::NotAtomic {
                    out.push(' ');
                    out.push_str(ordering.flag());
                }
            }
            (Opcode::Store, InstrKind::Store { ordering, volatile }) => {
                out.push_str("store");
                if *ordering != AtomicOrdering::NotAtomic {
                    out.push_str(" atomic");
                }
                if *volatile {
                    out.push_str(" volatile");
                }
                out.push_str(&format!(" {}, {}", typed(0), typed(1)));
                if *ordering != AtomicOrdering::NotAtomic {
                    out.push(' ');
                    out.push_str(ordering.flag());
                }
            }
            (Opcode::GetElementPtr, InstrKind::GetElementPtr { in_bounds }) => {
                out.push_str("getelementptr ");
                if *in_bounds {
                    out.push_str("inbounds ");
                }
                let base = self.type_of(&instr.operands()[0]);
                let pointee = base.element_type().cloned().unwrap_or(crate::types::Type::Void);
                out.push_str(&format!("{}, {}", pointee, typed(0)));
                for i in 1..instr.operand_count() {
                    out.push_str(&format!(", {}", typed(i)));
                }
            }
            (Opcode::ExtractElement, _) => {
                out.push_str(&format!("extractelement {}, {}", typed(0), typed(1)));
            }
            (Opcode::InsertElement, _) => {
                out.push_str(&format!(
                    "insertelement {}, {}, {}",
                    typed(0),
                    typed(1),
                    typed(2)
                ));
            }
            (Opcode::ShuffleVector, InstrKind::ShuffleVector { mask }) => {
                out.push_str(&format!(
                    "shufflevector {}, {}, {}",
                    typed(0),
                    typed(1),
                    mask.to_typed_string()
                ));
            }
            (Opcode::ExtractValue, InstrKind::AggregateIndex { indices }) => {
                out.push_str(&format!("extractvalue {}", typed(0)));
                for index in indices {
                    out.push_str(&format!(", {}", index));
                }
            }
            (Opcode::InsertValue, InstrKind::AggregateIndex { indices }) => {
                out.push_str(&format!("insertvalue {}, {}", typed(0), typed(1)));
                for index in indices {
                    out.push_str(&format!(", {}", index));
                }
            }
            (Opcode::IntCompare, InstrKind::IntCompare { predicate }) => {
                out.push_str(&format!("icmp {} {}, {}", predicate, typed(0), operand(1)));
            }
            (Opcode::FloatCompare, InstrKind::FloatCompare { predicate }) => {
                out.push_str(&format!("fcmp {} {}, {}", predicate, typed(0), operand(1)));
            }
            (Opcode::Phi, InstrKind::Phi { incoming_blocks }) => {
                out.push_str(&format!("phi {} ", instr.result_type()));
                for (i, block) in incoming_blocks.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&format!(
                        "[ {}, %{} ]",
                        operand(i),
                        self.block(*block).name()
                    ));
                }
            }
            (Opcode::Select, _) => {
                out.push_str(&format!(
                    "select {}, {}, {}",
                    typed(0),
                    typed(1),
                    typed(2)
                ));
            }
            (
                Opcode::Call,
                InstrKind::Call {
                    convention,
                    tail_call,
                    ..
                },
            ) => {
                if *tail_call {
                    out.push_str("tail ");
                }
                out.push_str("call ");
                if *convention != CallConvention::C {
                    out.push_str(&format!("{} ", convention));
                }
                out.push_str(&format!("{} {}(", instr.result_type(), operand(0)));
                for i in 1..instr.operand_count() {
                    if i > 1 {
                        out.push_str(", ");
                    }
                    out.push_str(&typed(i));
                }
                out.push(')');
            }
            (opcode, InstrKind::Cast { to }) => {
                out.push_str(&format!("{} {} to {}", opcode.mnemonic(), typed(0), to));
            }
            // opcode/kind pairings are fixed by the builder
            (opcode, _) => out.push_str(opcode.mnemonic()),
        }
        out
    }

    fn fmt_function(&self, f: &mut fmt::Formatter<'_>, function: &Function) -> fmt::Result {
        let params = function.ty().param_types().unwrap_or(&[]);
        let keyword = if function.blocks().is_empty() {
            "declare"
        } else {
            "define"
        };
        write!(f, "{} {} @{}(", keyword, function.return_type(), function.name())?;
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} %{}", param, i)?;
        }
        if function.is_vararg() {
            if !params.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "...")?;
        }
        write!(f, ")")?;

        if function.blocks().is_empty() {
            return writeln!(f);
        }
        writeln!(f, " {{")?;
        for block_id in function.blocks() {
            let block = self.block(*block_id);
            writeln!(f, "{}:", block.name())?;
            for instr_id in block.instructions() {
                writeln!(f, "  {}", self.instr_to_string(*instr_id))?;
            }
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; module = '{}'", self.name())?;
        for function in self.functions() {
            writeln!(f)?;
            self.fmt_function(f, function)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IrBuilder;
    use crate::types::Type;
    use ember_common::{IntPredicate, WrapSemantics};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_terminator_text() {
        let mut module = Module::new("demo");
        let func = module
            .add_function("f", Type::function(Type::int32(), vec![], false))
            .unwrap();
        let entry = module.create_block("entry");
        let exit = module.create_block("exit");
        module.append_block(func, entry);
        module.append_block(func, exit);

        let mut builder = IrBuilder::new();
        builder.position_at_end(&module, entry);
        let br = builder.build_br(&mut module, exit).unwrap();
        assert_eq!(module.instr_to_string(br), "br label %exit");

        builder.position_at_end(&module, exit);
        let ret = builder
            .build_ret(&mut module, Type::int32().const_int(1).unwrap().into())
            .unwrap();
        assert_eq!(module.instr_to_string(ret), "ret i32 1");
    }

    #[test]
    fn test_arithmetic_text() {
        let mut module = Module::new("demo");
        let func = module
            .add_function(
                "f",
                Type::function(Type::int32(), vec![Type::int32(), Type::int32()], false),
            )
            .unwrap();
        let entry = module.create_block("entry");
        module.append_block(func, entry);
        let lhs = module.function(func).parameter(0).unwrap();
        let rhs = module.function(func).parameter(1).unwrap();

        let mut builder = IrBuilder::new();
        builder.position_at_end(&module, entry);

        let plain = builder
            .build_add(&mut module, lhs.clone(), rhs.clone(), WrapSemantics::None, None)
            .unwrap();
        assert_eq!(module.instr_to_string(plain), "%v0 = add i32 %0, %1");

        let nuw = builder
            .build_add(
                &mut module,
                lhs.clone(),
                rhs.clone(),
                WrapSemantics::NoUnsignedWrap,
                Some("sum"),
            )
            .unwrap();
        assert_eq!(module.instr_to_string(nuw), "%sum = add nuw i32 %0, %1");

        let exact = builder
            .build_sdiv(&mut module, lhs.clone(), rhs.clone(), true, None)
            .unwrap();
        assert_eq!(module.instr_to_string(exact), "%v2 = sdiv exact i32 %0, %1");

        let cmp = builder
            .build_icmp(&mut module, IntPredicate::SignedLessThan, lhs, rhs, None)
            .unwrap();
        assert_eq!(module.instr_to_string(cmp), "%v3 = icmp slt i32 %0, %1");
    }

    #[test]
    fn test_memory_text() {
        let mut module = Module::new("demo");
        let func = module
            .add_function("f", Type::function(Type::Void, vec![], false))
            .unwrap();
        let entry = module.create_block("entry");
        module.append_block(func, entry);

        let mut builder = IrBuilder::new();
        builder.position_at_end(&module, entry);

        let slot = builder
            .build_alloca(&mut module, Type::int32(), Some("slot"))
            .unwrap();
        assert_eq!(module.instr_to_string(slot), "%slot = alloca i32");

        let store = builder
            .build_store(
                &mut module,
                Type::int32().const_int(7).unwrap().into(),
                crate::value::Value::Instr(slot),
            )
            .unwrap();
        assert_eq!(module.instr_to_string(store), "store i32 7, i32* %slot");

        let load = builder
            .build_load(
                &mut module,
                Type::int32(),
                crate::value::Value::Instr(slot),
                None,
            )
            .unwrap();
        assert_eq!(module.instr_to_string(load), "%v2 = load i32, i32* %slot");

        module.instr_mut(load).set_volatile(true).unwrap();
        module
            .instr_mut(load)
            .set_ordering(ember_common::AtomicOrdering::Acquire)
            .unwrap();
        assert_eq!(
            module.instr_to_string(load),
            "%v2 = load atomic volatile i32, i32* %slot acquire"
        );
    }

    #[test]
    fn test_call_text() {
        let mut module = Module::new("demo");
        let callee = module
            .add_function(
                "add",
                Type::function(Type::int32(), vec![Type::int32(), Type::int32()], false),
            )
            .unwrap();
        let caller = module
            .add_function("caller", Type::function(Type::int32(), vec![], false))
            .unwrap();
        let entry = module.create_block("entry");
        module.append_block(caller, entry);

        let mut builder = IrBuilder::new();
        builder.position_at_end(&module, entry);
        let i32t = Type::int32();
        let call = builder
            .build_call(
                &mut module,
                crate::value::Value::Function(callee),
                vec![
                    i32t.const_int(1).unwrap().into(),
                    i32t.const_int(2).unwrap().into(),
                ],
                Some("r"),
            )
            .unwrap();
        assert_eq!(
            module.instr_to_string(call),
            "%r = call i32 @add(i32 1, i32 2)"
        );

        module.instr_mut(call).set_tail_call(true).unwrap();
        module
            .instr_mut(call)
            .set_call_convention(CallConvention::Fast)
            .unwrap();
        assert_eq!(
            module.instr_to_string(call),
            "%r = tail call fastcc i32 @add(i32 1, i32 2)"
        );
    }

    #[test]
    fn test_cast_and_phi_text() {
        let mut module = Module::new("demo");
        let func = module
            .add_function("f", Type::function(Type::int64(), vec![Type::int32()], false))
            .unwrap();
        let entry = module.create_block("entry");
        let left = module.create_block("left");
        let right = module.create_block("right");
        for bb in [entry, left, right] {
            module.append_block(func, bb);
        }
        let arg = module.function(func).parameter(0).unwrap();

        let mut builder = IrBuilder::new();
        builder.position_at_end(&module, entry);
        let ext = builder
            .build_sext(&mut module, arg, Type::int64(), Some("wide"))
            .unwrap();
        assert_eq!(
            module.instr_to_string(ext),
            "%wide = sext i32 %0 to i64"
        );

        let phi = builder
            .build_phi(&mut module, Type::int64(), Some("merged"))
            .unwrap();
        let i64t = Type::int64();
        module
            .instr_mut(phi)
            .add_incoming(left, i64t.const_int(1).unwrap().into())
            .unwrap();
        module
            .instr_mut(phi)
            .add_incoming(right, i64t.const_int(2).unwrap().into())
            .unwrap();
        assert_eq!(
            module.instr_to_string(phi),
            "%merged = phi i64 [ 1, %left ], [ 2, %right ]"
        );
    }

    #[test]
    fn test_module_display() {
        let mut module = Module::new("demo");
        module
            .add_function(
                "putchar",
                Type::function(Type::int32(), vec![Type::int32()], false),
            )
            .unwrap();
        let func = module
            .add_function(
                "double_it",
                Type::function(Type::int32(), vec![Type::int32()], false),
            )
            .unwrap();
        let entry = module.create_block("entry");
        module.append_block(func, entry);
        let arg = module.function(func).parameter(0).unwrap();

        let mut builder = IrBuilder::new();
        builder.position_at_end(&module, entry);
        let sum = builder
            .build_add(&mut module, arg.clone(), arg, WrapSemantics::None, Some("sum"))
            .unwrap();
        builder
            .build_ret(&mut module, crate::value::Value::Instr(sum))
            .unwrap();

        let expected = "\
; module = 'demo'

declare i32 @putchar(i32 %0)

define i32 @double_it(i32 %0) {
entry:
  %sum = add i32 %0, %0
  ret i32 %sum
}
";
        assert_eq!(module.to_string(), expected);
    }
}
