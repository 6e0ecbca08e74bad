//! Interactive prompts.
//!
//! The interactive session talks to the user only through the [`Prompter`]
//! trait. [`TerminalPrompter`] implements it over any line-based reader and
//! writer (stdin/stdout in the binary, in-memory buffers in tests). End of
//! input at any prompt cancels the session.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SlideCatError};
use crate::utils::display_name;

/// User interaction needed by the interactive session.
///
/// Every method returns [`SlideCatError::Cancelled`] when the user backs out.
pub trait Prompter {
    /// Ask for an existing directory.
    fn choose_directory(&mut self, message: &str, default: &Path) -> Result<PathBuf>;

    /// Let the user pick any subset of `items`, keeping their order.
    fn select_many(&mut self, message: &str, items: &[PathBuf]) -> Result<Vec<PathBuf>>;

    /// Let the user put `items` in merge order.
    fn choose_order(&mut self, items: &[PathBuf]) -> Result<Vec<PathBuf>>;

    /// Yes/no question.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Free text with a default and a validator returning an error message.
    fn input_text(
        &mut self,
        message: &str,
        default: &str,
        validate: &dyn Fn(&str) -> std::result::Result<String, String>,
    ) -> Result<String>;
}

/// Check a merge output file name: non-empty and ending in `.pdf`.
///
/// Returns the trimmed name.
pub fn validate_output_filename(name: &str) -> std::result::Result<String, String> {
    let name = name.trim();
    if name.is_empty() || !name.to_lowercase().ends_with(".pdf") {
        return Err("Filename cannot be empty and must end with .pdf".to_string());
    }
    Ok(name.to_string())
}

/// Parse a selection like `1,3-4`, `all` or an empty line (nothing).
///
/// Numbers are 1-based. The result is 0-based, ascending and de-duplicated.
pub fn parse_selection(input: &str, len: usize) -> std::result::Result<Vec<usize>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }
    if input.eq_ignore_ascii_case("all") {
        return Ok((0..len).collect());
    }

    let mut picked = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((a, b)) => (parse_position(a, len)?, parse_position(b, len)?),
            None => {
                let n = parse_position(part, len)?;
                (n, n)
            }
        };
        if start > end {
            return Err(format!("Invalid range '{part}'"));
        }
        picked.extend(start..=end);
    }

    picked.sort_unstable();
    picked.dedup();
    Ok(picked)
}

/// Reorder `items` by a comma-separated list of 1-based positions.
///
/// The list must name every item exactly once.
pub fn order_by_positions(
    items: &[PathBuf],
    input: &str,
) -> std::result::Result<Vec<PathBuf>, String> {
    let positions = input
        .split(',')
        .map(|p| parse_position(p, items.len()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if positions.len() != items.len() {
        return Err(format!(
            "Expected {} positions, got {}",
            items.len(),
            positions.len()
        ));
    }

    let mut seen = vec![false; items.len()];
    for &p in &positions {
        if std::mem::replace(&mut seen[p], true) {
            return Err(format!("Position {} used more than once", p + 1));
        }
    }

    Ok(positions.into_iter().map(|p| items[p].clone()).collect())
}

fn parse_position(raw: &str, len: usize) -> std::result::Result<usize, String> {
    let raw = raw.trim();
    match raw.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
        _ => Err(format!("'{raw}' is not a number between 1 and {len}")),
    }
}

/// Line-based prompter over a reader and a writer.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter on the process stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    /// Prompter over arbitrary streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the prompter, returning the writer.
    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(SlideCatError::Cancelled);
        }
        Ok(line.trim().to_string())
    }

    fn list(&mut self, items: &[PathBuf]) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            writeln!(self.output, "  {}. {}", i + 1, display_name(item))?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn choose_directory(&mut self, message: &str, default: &Path) -> Result<PathBuf> {
        loop {
            let answer = self.ask(&format!("{message} [{}]", default.display()))?;
            let path = if answer.is_empty() {
                default.to_path_buf()
            } else {
                PathBuf::from(answer)
            };

            if path.is_dir() {
                return Ok(path.canonicalize()?);
            }
            writeln!(self.output, "Please enter a valid directory.")?;
        }
    }

    fn select_many(&mut self, message: &str, items: &[PathBuf]) -> Result<Vec<PathBuf>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        writeln!(self.output, "{message}")?;
        self.list(items)?;
        loop {
            let answer = self.ask("Numbers to select (e.g. 1,3-4), 'all', or blank for none:")?;
            match parse_selection(&answer, items.len()) {
                Ok(picked) => return Ok(picked.into_iter().map(|i| items[i].clone()).collect()),
                Err(msg) => writeln!(self.output, "{msg}")?,
            }
        }
    }

    fn choose_order(&mut self, items: &[PathBuf]) -> Result<Vec<PathBuf>> {
        if items.len() < 2 {
            return Ok(items.to_vec());
        }

        writeln!(
            self.output,
            "You selected {} files to merge. Specify the order.",
            items.len()
        )?;

        let mut remaining: Vec<PathBuf> = items.to_vec();
        remaining.sort_by_key(|p| display_name(p));
        let mut ordered = Vec::with_capacity(items.len());

        while !remaining.is_empty() {
            let position = ordered.len() + 1;
            writeln!(self.output, "Select file for position #{position}:")?;
            self.list(&remaining)?;
            let answer = self.ask(">")?;

            // A complete order may be given in one line at the first position.
            if ordered.is_empty() && answer.contains(',') {
                match order_by_positions(&remaining, &answer) {
                    Ok(full) => return Ok(full),
                    Err(msg) => {
                        writeln!(self.output, "{msg}")?;
                        continue;
                    }
                }
            }

            match parse_position(&answer, remaining.len()) {
                Ok(i) => {
                    let picked = remaining.remove(i);
                    writeln!(
                        self.output,
                        "  ✓ Position {position}: {}",
                        display_name(&picked)
                    )?;
                    ordered.push(picked);
                }
                Err(msg) => writeln!(self.output, "{msg}")?,
            }
        }

        Ok(ordered)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = self.ask(&format!("{message} {hint}"))?;
            match answer.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer 'y' or 'n'.")?,
            }
        }
    }

    fn input_text(
        &mut self,
        message: &str,
        default: &str,
        validate: &dyn Fn(&str) -> std::result::Result<String, String>,
    ) -> Result<String> {
        loop {
            let answer = self.ask(&format!("{message} [{default}]"))?;
            let candidate = if answer.is_empty() { default } else { &answer };
            match validate(candidate) {
                Ok(value) => return Ok(value),
                Err(msg) => writeln!(self.output, "{msg}")?,
            }
        }
    }
}
