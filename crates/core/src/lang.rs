//! Rendering of the localized message templates.
//!
//! Templates use printf-style placeholders: `%s` and `%d` take the next
//! argument, `%1$s` takes an explicit one, `%%` is a literal percent sign
//! and `%n` a newline. A minimum width pads on the left (`%10s`), or on
//! the right with the `-` flag (`%-10s`). For `%d`, the `0` flag pads with
//! zeros after any sign and `+` forces a sign. Other flags are accepted and
//! ignored.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::warn;

use crate::config::LangConfig;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%(?:([1-9][0-9]*)\$)?([-#+ 0,(]*)([0-9]+)?([sdn%])")
        .expect("valid placeholder pattern")
});

/// Substitute `args` into `template`.
///
/// Placeholders without a matching argument are kept verbatim.
pub fn render(template: &str, args: &[&str]) -> String {
    let mut next = 0;
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let conversion = &caps[4];
            match conversion {
                "%" => return "%".to_string(),
                "n" => return "\n".to_string(),
                _ => {}
            }

            let index = match caps.get(1) {
                Some(explicit) => explicit.as_str().parse::<usize>().unwrap_or(0).saturating_sub(1),
                None => {
                    let index = next;
                    next += 1;
                    index
                }
            };

            match args.get(index) {
                Some(value) => {
                    let width = caps
                        .get(3)
                        .and_then(|width| width.as_str().parse::<usize>().ok())
                        .unwrap_or(0);
                    pad(value, &caps[2], width, conversion == "d")
                }
                None => {
                    warn!("template {template:?} has no argument for placeholder {}", &caps[0]);
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

fn pad(value: &str, flags: &str, width: usize, numeric: bool) -> String {
    let mut value = value.to_string();
    if numeric && flags.contains('+') && !value.starts_with('-') {
        value.insert(0, '+');
    }

    let len = value.chars().count();
    if len >= width {
        return value;
    }
    let fill = width - len;

    if flags.contains('-') {
        format!("{value}{}", " ".repeat(fill))
    } else if numeric && flags.contains('0') {
        let split = if value.starts_with(['+', '-']) { 1 } else { 0 };
        let (sign, digits) = value.split_at(split);
        format!("{sign}{}{digits}", "0".repeat(fill))
    } else {
        format!("{}{value}", " ".repeat(fill))
    }
}

/// Renders every message the command sends, each prefixed with `lang.prefix`.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    lang: LangConfig,
}

impl Messages {
    /// Wrap a set of templates.
    pub fn new(lang: LangConfig) -> Self {
        Self { lang }
    }

    fn prefixed(&self, body: String) -> String {
        format!("{}{}", self.lang.prefix, body)
    }

    /// Source lacks the permission.
    pub fn no_permission(&self) -> String {
        self.prefixed(render(&self.lang.no_permission, &[]))
    }

    /// Wrong argument count.
    pub fn usage(&self) -> String {
        self.prefixed(render(&self.lang.usage, &[]))
    }

    /// Destination did not resolve.
    pub fn no_server(&self) -> String {
        self.prefixed(render(&self.lang.no_server, &[]))
    }

    /// Singular player phrasing, unprefixed so it can be embedded in [`Self::success`].
    pub fn player_name(&self, name: &str) -> String {
        render(&self.lang.player_name, &[name])
    }

    /// Plural player phrasing, unprefixed so it can be embedded in [`Self::success`].
    pub fn player_num(&self, count: usize) -> String {
        render(&self.lang.player_num, &[&count.to_string()])
    }

    /// Summary for the source; `destination` is the token as typed.
    pub fn success(&self, players: &str, destination: &str) -> String {
        self.prefixed(render(&self.lang.success, &[players, destination]))
    }

    /// Notice for a player about to be moved to `backend`.
    pub fn notification(&self, backend: &str) -> String {
        self.prefixed(render(&self.lang.notification, &[backend]))
    }
}
