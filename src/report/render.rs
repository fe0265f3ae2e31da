//! Text renderers for solutions: mnemonic listing, infix expression and a
//! GCC inline-asm body for x86

use crate::error::RenderError;
use crate::ir::{argument_name, format_immediate, Operand};
use crate::isa::{Notation, Operation, ShiftMask};
use crate::report::{SlotView, SolutionView};

/// Result registers available to the asm renderer. `ecx` is kept free for
/// variable shift counts.
pub const ASM_REGISTERS: [&str; 4] = ["%%ebx", "%%edx", "%%esi", "%%edi"];

/// How solutions are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per instruction followed by the equivalent expression
    #[default]
    Mnemonic,
    /// The expression only
    Infix,
    /// GCC inline-asm block
    Asm,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mnemonic" | "list" => Ok(OutputFormat::Mnemonic),
            "infix" | "expr" => Ok(OutputFormat::Infix),
            "asm" | "x86" => Ok(OutputFormat::Asm),
            _ => Err(format!(
                "Unknown output format: '{}'. Valid options: mnemonic, infix, asm",
                s
            )),
        }
    }
}

/// Render `view` in `format`, one or more lines each ending in a newline.
pub fn render(view: &SolutionView, format: OutputFormat) -> String {
    match format {
        OutputFormat::Mnemonic => {
            format!("{}   Expr: {}\n", mnemonic(view), infix(view))
        }
        OutputFormat::Infix => format!("   {}\n", infix(view)),
        OutputFormat::Asm => match asm(view) {
            Ok(block) => block.to_string(),
            Err(err) => format!("   (no asm: {})\n", err),
        },
    }
}

/// Instruction listing, e.g. `   sub   r0,x,1`.
pub fn mnemonic(view: &SolutionView) -> String {
    let mut out = String::new();
    for (i, slot) in view.slots.iter().enumerate() {
        let operands: Vec<String> = slot.operands.iter().map(|op| op.to_string()).collect();
        out.push_str(&format!(
            "   {:<5} r{},{}\n",
            slot.name(),
            i,
            operands.join(",")
        ));
    }
    out
}

fn operand_expr(view: &SolutionView, operand: &Operand) -> String {
    match operand {
        Operand::Result(slot) => slot_expr(view, &view.slots[*slot]),
        other => other.to_string(),
    }
}

fn slot_expr(view: &SolutionView, slot: &SlotView) -> String {
    let args: Vec<String> = slot
        .operands
        .iter()
        .map(|op| operand_expr(view, op))
        .collect();
    match slot.operation.notation() {
        Notation::Prefix(symbol) => format!("{}{}", symbol, args[0]),
        Notation::Infix(symbol) => format!("({}{}{})", args[0], symbol, args[1]),
        Notation::Call(name) => format!("{}({})", name, args.join(", ")),
    }
}

/// The program as a single expression in the arguments.
pub fn infix(view: &SolutionView) -> String {
    match view.slots.last() {
        Some(last) => slot_expr(view, last),
        None => argument_name(view.num_args.saturating_sub(1)).to_string(),
    }
}

/// A rendered inline-asm block. Input is `%1`, output `%0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmBlock {
    /// Quoted instruction strings, e.g. `"negl %%ebx\n\t"`.
    pub instructions: Vec<String>,
    /// Registers the block writes, for the clobber list.
    pub clobbers: Vec<&'static str>,
}

impl std::fmt::Display for AsmBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "   asm(")?;
        for line in &self.instructions {
            writeln!(f, "   {}", line)?;
        }
        writeln!(f, "   {});", self.constraints())
    }
}

impl AsmBlock {
    /// Output, input and clobber sections.
    pub fn constraints(&self) -> String {
        let clobbers: Vec<String> = self.clobbers.iter().map(|c| format!("\"{}\"", c)).collect();
        format!(": \"=r\" (b) : \"r\" (a) : {}", clobbers.join(", "))
    }
}

fn asm_operand(operand: &Operand) -> String {
    match operand {
        Operand::Immediate(v) | Operand::ShiftImmediate(v) => format!("${}", format_immediate(*v)),
        Operand::Argument(_) => "%1".to_string(),
        Operand::Result(slot) => ASM_REGISTERS[*slot].to_string(),
    }
}

fn quoted(instruction: String) -> String {
    format!("\"{}\\n\\t\"", instruction)
}

/// Whether x86's mod-32 shift count agrees with `mask` for this slot.
///
/// Logical shifts under `Mod64` give 0 for counts 32..=63 where x86 would
/// shift by the count mod 32, so a count that is not a known constant below
/// 32 cannot be emitted.
fn shift_count_fits(slot: &SlotView, mask: ShiftMask) -> bool {
    if mask != ShiftMask::Mod64 || !matches!(slot.operation, Operation::Shl | Operation::Shr) {
        return true;
    }
    match slot.operands.get(1) {
        Some(Operand::Immediate(v)) | Some(Operand::ShiftImmediate(v)) => mask.apply(*v) < 32,
        _ => false,
    }
}

/// Render a single-argument program as x86 AT&T inline asm for GCC.
pub fn asm(view: &SolutionView) -> Result<AsmBlock, RenderError> {
    if view.num_args != 1 {
        return Err(RenderError::TooManyArguments);
    }
    if view.length() > ASM_REGISTERS.len() {
        return Err(RenderError::OutOfRegisters {
            needed: view.length(),
            available: ASM_REGISTERS.len(),
        });
    }

    let mut instructions = Vec::new();
    let mut uses_ecx = false;
    for (i, slot) in view.slots.iter().enumerate() {
        let op = slot
            .operation
            .x86_mnemonic()
            .ok_or(RenderError::Unsupported(slot.name()))?;
        let dst = ASM_REGISTERS[i];
        instructions.push(quoted(format!("movl {}, {}", asm_operand(&slot.operands[0]), dst)));

        if slot.operands.len() == 1 {
            instructions.push(quoted(format!("{} {}", op, dst)));
            continue;
        }

        let source = &slot.operands[1];
        let variable_count = !matches!(source, Operand::Immediate(_) | Operand::ShiftImmediate(_));
        if !shift_count_fits(slot, view.shift_mask) {
            return Err(RenderError::ShiftCount(slot.name()));
        }
        if slot.operation.is_shift() && variable_count {
            uses_ecx = true;
            instructions.push(quoted(format!("movl {}, %%ecx", asm_operand(source))));
            instructions.push(quoted(format!("{} %%cl, {}", op, dst)));
        } else {
            instructions.push(quoted(format!("{} {}, {}", op, asm_operand(source), dst)));
        }
    }

    let value = match view.length() {
        0 => "%1".to_string(),
        n => ASM_REGISTERS[n - 1].to_string(),
    };
    instructions.push(quoted(format!("movl {}, %0", value)));

    let mut clobbers: Vec<&'static str> = vec!["cc"];
    clobbers.extend(
        ASM_REGISTERS[..view.length()]
            .iter()
            .copied()
            .map(|reg| reg.trim_start_matches('%')),
    );
    if uses_ecx {
        clobbers.push("ecx");
    }

    Ok(AsmBlock {
        instructions,
        clobbers,
    })
}
