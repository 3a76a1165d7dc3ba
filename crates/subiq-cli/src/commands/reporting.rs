use colored::Colorize;
use subiq_core::{ConfigError, ConvertError, ParseError, StageError, SynthesisConfig};

const RULE: &str = "======================================";

/// Print a cyan section banner.
pub(crate) fn print_banner(title: &str) {
    println!("{}", RULE.cyan());
    println!("{}", format!("  {}", title).cyan());
    println!("{}", RULE.cyan());
    println!();
}

/// Print a `label value` line with a bold label.
pub(crate) fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("{} {}", format!("{}:", label).blue().bold(), value);
}

/// Print non-fatal conditions, one per line.
pub(crate) fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("  {} {}", "!".yellow(), warning);
    }
}

/// Print the resolved synthesis parameters.
pub(crate) fn print_config(config: &SynthesisConfig) {
    print_field("Sample rate", format!("{} Hz", config.sample_rate_hz));
    print_field(
        "Intermediate frequency",
        format!("{} Hz", config.intermediate_freq_hz),
    );
    print_field("Amplitude", config.amplitude_fraction);
}

/// Stable error code of the core error behind `err`, if there is one.
pub(crate) fn error_code(err: &anyhow::Error) -> Option<&'static str> {
    if let Some(e) = err.downcast_ref::<ConvertError>() {
        Some(e.code())
    } else if let Some(e) = err.downcast_ref::<ParseError>() {
        Some(e.code())
    } else {
        err.downcast_ref::<ConfigError>().map(|e| e.code())
    }
}
