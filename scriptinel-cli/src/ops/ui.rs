//! Styled console output for reports.

use crossterm::style::Stylize;

const BANNER_WIDTH: usize = 58;

/// Terminal cells taken by `s`. Emoji and other non-ASCII glyphs count as two.
fn display_width(s: &str) -> usize {
    s.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}

/// Centered title inside a double-line frame.
pub fn print_banner(title: &str) {
    let gap = BANNER_WIDTH.saturating_sub(display_width(title));
    let (left, right) = (gap / 2, gap - gap / 2);
    let rule = "═".repeat(BANNER_WIDTH);

    println!();
    println!("{}", format!("╔{rule}╗").dark_cyan());
    println!(
        "{}",
        format!("║{:left$}{title}{:right$}║", "", "").dark_cyan()
    );
    println!("{}", format!("╚{rule}╝").dark_cyan());
    println!();
}

/// Section title with its entry count.
pub fn print_section(title: &str, count: usize) {
    println!();
    println!(
        "  {} {} {}",
        "▸".dark_cyan(),
        title.white().bold(),
        format!("({count})").dark_grey()
    );
    println!("  {}", "─".repeat(50).dark_grey());
}

pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

pub fn print_blocked(msg: &str) {
    println!("  {} {}", "⛔".red(), msg);
}

pub fn print_hint(msg: &str) {
    println!("  {} {}", "💡".yellow(), msg.dark_grey());
}

/// Clip `s` to `width` chars, marking the cut with `...`.
pub fn fit(s: &str, width: usize) -> String {
    match s.char_indices().nth(width) {
        None => s.to_string(),
        Some(_) => {
            let keep = width.saturating_sub(3);
            let end = s.char_indices().nth(keep).map_or(s.len(), |(i, _)| i);
            format!("{}...", &s[..end])
        }
    }
}
