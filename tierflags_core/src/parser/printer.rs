use terminal_size::{terminal_size, Width};

use crate::constant::*;
use crate::flag::FlagValue;
use crate::model::Kind;
use crate::parser::{ColumnRenderer, LeftWidth, TotalWidth, UsageWidth, UserInterface};
use crate::registry::Registry;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

const MAIN_INDENT: usize = 2;

/// The program level text shown around the flag listing.
#[derive(Debug, Default)]
pub(crate) struct About {
    pub(crate) program: String,
    pub(crate) description: Option<String>,
    pub(crate) version: Option<String>,
}

pub(crate) struct Printer {
    terminal_width: Option<usize>,
}

impl Printer {
    pub(crate) fn terminal() -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self::new(terminal_width)
    }

    pub(crate) fn new(terminal_width: Option<usize>) -> Self {
        Self { terminal_width }
    }

    pub(crate) fn print_help(
        &self,
        about: &About,
        registry: &Registry,
        user_interface: &(impl UserInterface + ?Sized),
    ) {
        user_interface.print(self.render(about, registry));
    }

    pub(crate) fn render(&self, about: &About, registry: &Registry) -> String {
        let mut out: Vec<String> = Vec::default();

        if let Some(description) = &about.description {
            out.push(description.clone());
            out.push(String::default());
        }

        out.push(format!("Usage: {} [options]", about.program));
        out.push(String::default());

        if let Some(version) = &about.version {
            out.push(format!("Version: {version}"));
            out.push(String::default());
        }

        // Ungrouped flags first, then each group in order of first appearance.
        let mut sections: Vec<(Option<&str>, Vec<&FlagValue>)> = vec![(None, Vec::default())];

        for flag in registry.iter() {
            match sections.iter_mut().find(|(group, _)| *group == flag.group()) {
                Some((_, flags)) => flags.push(flag),
                None => sections.push((flag.group(), vec![flag])),
            }
        }

        let rows: Vec<(Option<&str>, Vec<(String, String)>)> = sections
            .into_iter()
            .filter(|(_, flags)| !flags.is_empty())
            .map(|(group, flags)| {
                (
                    group,
                    flags
                        .into_iter()
                        .map(|flag| (flag_column(flag), usage_column(flag)))
                        .collect(),
                )
            })
            .collect();

        let left_width = HELP_LEFT_WIDTH - MAIN_INDENT - 2;
        let column_renderer = match self.terminal_width {
            Some(tw) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Rendering help for a terminal of width {tw}.");
                }

                ColumnRenderer::guided(
                    LeftWidth(left_width),
                    TotalWidth(tw.saturating_sub(MAIN_INDENT)),
                )
            }
            // Nothing to fit into: keep each usage on one line.
            None => {
                let widest = rows
                    .iter()
                    .flat_map(|(_, rows)| rows.iter())
                    .map(|(_, usage)| usage.chars().count())
                    .max()
                    .unwrap_or_default();
                ColumnRenderer::new(LeftWidth(left_width), UsageWidth(widest.max(2)))
            }
        };

        for (group, rows) in rows {
            out.push(format!("{}:", group.unwrap_or("Options")));

            for (left, usage) in rows {
                out.extend(column_renderer.render(MAIN_INDENT, &left, &usage));
            }

            out.push(String::default());
        }

        out.join("\n")
    }
}

// Ex: "-p, --port INT", "    --verbose"
fn flag_column(flag: &FlagValue) -> String {
    let short = match flag.short_key() {
        Some(key) => format!("-{key}, "),
        None => "    ".to_string(),
    };

    match flag.kind() {
        Kind::Bool => format!("{short}--{}", flag.name()),
        kind => format!(
            "{short}--{} {}",
            flag.name(),
            kind.name().to_ascii_uppercase()
        ),
    }
}

fn usage_column(flag: &FlagValue) -> String {
    let mut usage = flag.usage().to_string();

    if flag.kind() != Kind::Bool {
        usage.push_str(&format!(" (default: {})", flag.default_value()));
    }

    if flag.required() {
        usage.push_str(" [REQUIRED]");
    }

    if !flag.dependencies().is_empty() {
        usage.push_str(&format!(
            " [depends on: {}]",
            flag.dependencies().join(", ")
        ));
    }

    usage.trim_start().to_string()
}
