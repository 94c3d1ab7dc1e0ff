use crate::error::CompileError;

/// Line-oriented source text with an indentation level.
///
/// ```
/// use brine_wire_compiler::formatter::Formatter;
///
/// let mut out = Formatter::new("  ");
/// out.braces("point {", "}", |out| {
///     out.line("x;");
///     Ok(())
/// }).unwrap();
/// assert_eq!(out.finish(), "point {\n  x;\n}\n");
/// ```
pub struct Formatter {
    lines:  Vec<String>,
    unit:   &'static str,
    indent: usize,
}

impl Formatter {
    pub fn new(unit: &'static str) -> Formatter {
        Formatter { lines: Vec::new(), unit, indent: 0 }
    }

    /// Appends one line at the current indentation. Empty text gives an empty line.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", self.unit.repeat(self.indent), text));
        }
    }

    /// Appends an empty line unless the output is empty or already ends with one.
    pub fn blank(&mut self) {
        if self.lines.last().map_or(false, |l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    /// Runs `body` one level deeper.
    pub fn indented<F>(&mut self, body: F) -> Result<(), CompileError>
    where
        F: FnOnce(&mut Formatter) -> Result<(), CompileError>,
    {
        self.indent += 1;
        let result = body(self);
        self.indent -= 1;
        result
    }

    /// `open`, then `body` indented, then `close`.
    pub fn braces<F>(&mut self, open: impl AsRef<str>, close: &str, body: F) -> Result<(), CompileError>
    where
        F: FnOnce(&mut Formatter) -> Result<(), CompileError>,
    {
        self.line(open);
        self.indented(body)?;
        self.line(close);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Moves every line of `other` to the end of this output, shifted to the
    /// current indentation.
    pub fn append(&mut self, other: Formatter) {
        for line in other.lines {
            self.line(line);
        }
    }

    pub fn finish(mut self) -> String {
        while self.lines.last().map_or(false, |l| l.is_empty()) {
            self.lines.pop();
        }
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}
