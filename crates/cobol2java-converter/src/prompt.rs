//! Task prompt sent to the text generator

const INSTRUCTIONS: &str = "Convert this COBOL code to Java. Focus on data structures and business logic. \
Use proper Java syntax with classes, methods, and variables. \
Handle COPY statements, PIC clauses, and MOVE operations appropriately. \
Return only clean Java code without explanations.";

/// Embed the COBOL source in the conversion instructions
pub fn build_prompt(cobol_source: &str) -> String {
    format!("{}\n\nCOBOL:\n{}\n\nJava:", INSTRUCTIONS, cobol_source)
}
