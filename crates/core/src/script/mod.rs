/// Section types produced by the splitter.
pub mod ast;
/// Code section rendering and `{{NAME}}` macro expansion.
pub mod code;
/// Commands section rendering.
pub mod commands;
pub mod dedent;
/// JSON serialization helpers for sections.
pub mod dump;
/// Stream assembler: sections in, canonical stream out.
pub mod emit;
/// Line-based section splitter.
pub mod splitter;
