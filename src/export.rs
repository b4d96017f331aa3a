//! `.cstruct` document export.
//!
//! The surrounding tooling persists catalog/locate results as a text
//! document: an identity head, one block per function with its flags and
//! a structure skeleton, and a `# `-prefixed documentation tail. The
//! `%s` placeholders in the structure block are printf templates consumed
//! downstream, not fields to fill here.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::schema::FieldSpec;

/// One function entry of the document.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub function: String,
    pub description: String,
    /// Flag values this function was observed with.
    pub flags: Vec<u32>,
    /// Structure fields, in decode order.
    pub fields: Vec<FieldSpec>,
}

/// The document head plus its function entries.
#[derive(Debug, Clone)]
pub struct CstructDoc {
    pub description: String,
    pub author: String,
    pub version: String,
    pub id: Uuid,
    pub code_file: String,
    pub functions: Vec<FunctionDef>,
    /// Freeform notes for the `# Documentation` tail.
    pub documentation: String,
}

impl CstructDoc {
    /// New document with a freshly generated id.
    pub fn new(
        description: impl Into<String>,
        author: impl Into<String>,
        version: impl Into<String>,
        code_file: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            author: author.into(),
            version: version.into(),
            id: Uuid::new_v4(),
            code_file: code_file.into(),
            functions: Vec::new(),
            documentation: "N/A".to_owned(),
        }
    }

    /// Render the literal document text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Description: {}", self.description);
        let _ = writeln!(out, "Author: {}", self.author);
        let _ = writeln!(out, "Version: {}", self.version);
        let _ = writeln!(out, "Id: {}", self.id);
        let _ = writeln!(out, "Code_File: {}", self.code_file);
        out.push('\n');
        out.push_str("Functions:\n");

        for func in &self.functions {
            out.push_str("    -\n");
            let _ = writeln!(out, "        Function: {}", func.function);
            let _ = writeln!(out, "        Description: {}", func.description);
            let flags: Vec<String> = func.flags.iter().map(u32::to_string).collect();
            let _ = writeln!(out, "        Flags: [{}]", flags.join(", "));
            out.push_str("        Structure: |\n");
            out.push_str("            #define %s_des \"%s\"\n");
            out.push_str("            struct %s {\n");
            for field in &func.fields {
                let _ = writeln!(out, "                {} {};", field.primitive, field.name);
            }
            out.push_str("            };\n");
        }

        let notes = self.documentation.replace('\n', "\n# ");
        let _ = write!(out, "\n# Documentation\n# {notes}\n");
        out
    }

    /// Write `<Code_File>.cstruct` under `dir`; returns the path written.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(format!("{}.cstruct", self.code_file));
        fs::write(&path, self.render())?;
        Ok(path)
    }
}
