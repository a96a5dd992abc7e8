//! Colored terminal output for release operations
//!
//! Step announcements and results go to stdout, failures to stderr.

use std::io::{IsTerminal, Write};
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    stdout: BufferWriter,
    stderr: BufferWriter,
    quiet: bool,
}

impl OutputManager {
    /// Create a new output manager; `quiet` suppresses everything except errors
    pub fn new(quiet: bool) -> Self {
        Self {
            stdout: BufferWriter::stdout(color_choice(std::io::stdout().is_terminal())),
            stderr: BufferWriter::stderr(color_choice(std::io::stderr().is_terminal())),
            quiet,
        }
    }

    fn marked(&self, writer: &BufferWriter, marker: &str, color: Color, message: &str) -> Buffer {
        let mut buffer = writer.buffer();
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(&mut buffer, "{marker}");
        let _ = buffer.reset();
        let _ = writeln!(&mut buffer, " {message}");
        buffer
    }

    /// Announce a release step before it runs
    pub fn step(&self, message: &str, dry_run: bool) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.stdout.buffer();
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
        let _ = write!(&mut buffer, "→");
        let _ = buffer.reset();
        if dry_run {
            let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)));
            let _ = write!(&mut buffer, " [dry run]");
            let _ = buffer.reset();
        }
        let _ = writeln!(&mut buffer, " {message}");
        self.stdout.print(&buffer)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.stdout
            .print(&self.marked(&self.stdout, "✓", Color::Green, message))
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.stdout
            .print(&self.marked(&self.stdout, "⚠", Color::Yellow, message))
    }

    /// Print an error message (always shown)
    pub fn error(&self, message: &str) {
        let buffer = self.marked(&self.stderr, "✗", Color::Red, message);
        if self.stderr.print(&buffer).is_err() {
            // Stderr failed - fallback to stdout as last resort
            println!("[STDERR ERROR] ✗ {message}");
        }
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.stdout.buffer();
        let _ = writeln!(&mut buffer, "    {message}");
        self.stdout.print(&buffer)
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut buffer = self.stdout.buffer();
        let _ = writeln!(&mut buffer, "{message}");
        self.stdout.print(&buffer)
    }

    /// Print a question without a trailing newline and flush it
    pub fn prompt(&self, question: &str) -> std::io::Result<()> {
        let mut buffer = self.stdout.buffer();
        let _ = write!(&mut buffer, "{question}");
        self.stdout.print(&buffer)?;
        std::io::stdout().flush()
    }
}

fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}
