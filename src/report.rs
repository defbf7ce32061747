//! Human-readable rendering of dispatch results and status lines.

use std::env;
use std::io::IsTerminal;

use colored::{Color, Colorize};

use crate::domain::{DispatchReport, Provider, RecipientOutcome, SendOutcome};

const RULE: &str = "____________________________________________________";

pub const HEADER: &str = "\
MPS-SENDER - SMS Sender with Twilio, Nexmo, and MessageBird API

- EMAIL: your-email@example.com
- TELE: @yourTelegramHandle
- CONTACT: your-contact-number";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "always" => Some(Self::Always),
            "never" => Some(Self::Never),
            _ => None,
        }
    }

    pub fn should_use_color(&self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => detect_color_support(),
        }
    }
}

fn detect_color_support() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("TERM").is_ok_and(|term| term == "dumb") {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn paint(text: &str, color: Color, mode: ColorMode) -> String {
    if mode.should_use_color() {
        text.color(color).to_string()
    } else {
        text.to_owned()
    }
}

/// One recipient as a ruled block:
///
/// ```text
/// ____________________________________________________
/// [NOMOR]: 6281234567890 VALID
/// [INFO]: BERHASIL KIRIM !!
/// [KET]: SALDO CUKUP
/// ____________________________________________________
/// ```
pub fn render_outcome(outcome: &RecipientOutcome, mode: ColorMode) -> String {
    let (valid, info, ket) = match &outcome.outcome {
        SendOutcome::Sent(sent) => (
            paint("VALID", Color::Green, mode),
            paint("BERHASIL KIRIM !!", Color::Green, mode),
            match &sent.remaining_balance {
                Some(balance) => format!("SALDO CUKUP, SISA SALDO: {balance}"),
                None => "SALDO CUKUP".to_owned(),
            },
        ),
        SendOutcome::Failed { reason } => (
            paint("VALID", Color::Green, mode),
            paint("GAGAL KIRIM !!", Color::Red, mode),
            reason.clone(),
        ),
        SendOutcome::InvalidNumber => (
            paint("TIDAK VALID", Color::Red, mode),
            paint("GAGAL KIRIM !!", Color::Red, mode),
            "NOMOR TIDAK VALID".to_owned(),
        ),
    };

    format!(
        "{RULE}\n[NOMOR]: {} {valid}\n[INFO]: {info}\n[KET]: {ket}\n{RULE}",
        outcome.number.raw()
    )
}

pub fn render_summary(report: &DispatchReport) -> String {
    format!(
        "[TOTAL]: {} NOMOR, {} BERHASIL, {} GAGAL, {} TIDAK VALID",
        report.len(),
        report.sent(),
        report.failed(),
        report.invalid()
    )
}

pub fn render_header(mode: ColorMode) -> String {
    paint(HEADER, Color::Red, mode)
}

pub fn render_start(provider: Provider, mode: ColorMode) -> String {
    paint(
        &format!("MEMULAI SENDING SMS MENGGUNAKAN PROVIDER {provider}"),
        Color::Green,
        mode,
    )
}

pub fn render_success(message: &str, mode: ColorMode) -> String {
    format!("{}: {message}", paint("[SUKSES]", Color::Green, mode))
}

pub fn render_error(message: &str, mode: ColorMode) -> String {
    format!("{}: {message}", paint("[ERROR]", Color::Red, mode))
}
