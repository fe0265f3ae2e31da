//! Emission of standalone C test programs
//!
//! Each single-argument solution becomes `testN.c`: the asm block wrapped in
//! a `main` that reads `a` from stdin and prints the result, so a solution
//! can be checked against the real hardware.

use crate::report::render::{self, AsmBlock};
use crate::report::SolutionView;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const INDENT: &str = "        ";

/// The C source for one solution.
pub fn c_program(block: &AsmBlock) -> String {
    let mut body = String::new();
    for line in &block.instructions {
        body.push_str(INDENT);
        body.push_str(line);
        body.push('\n');
    }
    format!(
        "#include <stdio.h>\n\
         \n\
         int main()\n\
         {{\n    \
             int a, b;\n    \
             scanf(\"%d\", &a);\n\
         \n    \
             asm(\n\
         {body}\
         {indent}: \"=r\" (b)\n\
         {indent}: \"r\" (a)\n\
         {indent}: {clobbers});\n\
         \n    \
             printf(\"%d\\n\", b);\n\
         }}\n",
        body = body,
        indent = INDENT,
        clobbers = block
            .clobbers
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Write `test0.c`, `test1.c`, ... into `dir`, one per renderable view.
///
/// Views that cannot be rendered as asm are skipped with a warning and do not
/// consume a file number. Returns the paths written.
pub fn emit_tests(dir: &Path, views: &[SolutionView]) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for (index, view) in views.iter().enumerate() {
        let block = match render::asm(view) {
            Ok(block) => block,
            Err(err) => {
                warn!(solution = index, error = %err, "skipping test emission");
                continue;
            }
        };
        let path = dir.join(format!("test{}.c", written.len()));
        fs::write(&path, c_program(&block))?;
        debug!(path = %path.display(), "wrote test program");
        written.push(path);
    }
    Ok(written)
}
