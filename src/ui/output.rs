//! Status lines for the CLI.
//!
//! Progress and results go to stdout, warnings and errors to stderr. Each
//! stream gets its own palette so `investor-api load data.csv 2>errors.log`
//! keeps colours on the terminal and plain text in the log.

use crate::ui::table::format_amount;
use crate::ui::Icons;
use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

static STDOUT_PALETTE: OnceLock<Palette> = OnceLock::new();
static STDERR_PALETTE: OnceLock<Palette> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Palette {
    pub heading: Style,
    pub ok: Style,
    pub failure: Style,
    pub caution: Style,
    pub label: Style,
    pub money: Style,
}

impl Palette {
    /// Colours only if `term` is a colour-capable terminal (honours `NO_COLOR`)
    pub fn for_term(term: &console::Term) -> Self {
        if term.features().colors_supported() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            heading: Style::new().cyan().bold(),
            ok: Style::new().green().bold(),
            failure: Style::new().red().bold(),
            caution: Style::new().yellow().bold(),
            label: Style::new().white().dimmed(),
            money: Style::new().green(),
        }
    }

    pub fn plain() -> Self {
        Self {
            heading: Style::new(),
            ok: Style::new(),
            failure: Style::new(),
            caution: Style::new(),
            label: Style::new(),
            money: Style::new(),
        }
    }

    /// A commitment amount with thousands separators and an optional currency
    pub fn amount(&self, value: f64, currency: Option<&str>) -> String {
        let formatted = match currency {
            Some(code) if !code.is_empty() => format!("{} {}", format_amount(value), code),
            _ => format_amount(value),
        };
        formatted.style(self.money.clone()).to_string()
    }
}

fn out() -> &'static Palette {
    STDOUT_PALETTE.get_or_init(|| Palette::for_term(&console::Term::stdout()))
}

fn err() -> &'static Palette {
    STDERR_PALETTE.get_or_init(|| Palette::for_term(&console::Term::stderr()))
}

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(out().heading.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(out().ok.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(err().failure.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(err().caution.clone()));
}

pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", Icons::INFO, label.style(out().label.clone()), value);
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(out().heading.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(out().label.clone()).to_string()
}

/// Amount styled for stdout
pub fn amount(value: f64, currency: Option<&str>) -> String {
    out().amount(value, currency)
}

pub fn timing(elapsed: &str) {
    println!("{} {}", Icons::CLOCK, elapsed.style(out().label.clone()));
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(out().label.clone()), value);
}
