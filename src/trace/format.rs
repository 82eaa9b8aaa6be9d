//! Trace rendering styles
//!
//! One structural event stream, six textual decorations. Every style
//! renders the same events at the same depths in the same order; only
//! the per-line dressing differs.

use std::fmt;

use colored::Colorize;

use super::TraceEvent;

/// Output style for rendered traces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceStyle {
    #[default]
    Default,
    Minimal,
    Detailed,
    Color,
    Markdown,
    Educational,
}

impl TraceStyle {
    /// All styles, for iteration in tests and help text
    pub const ALL: [TraceStyle; 6] = [
        Self::Default,
        Self::Minimal,
        Self::Detailed,
        Self::Color,
        Self::Markdown,
        Self::Educational,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::Default),
            "minimal" => Some(Self::Minimal),
            "detailed" => Some(Self::Detailed),
            "color" => Some(Self::Color),
            "markdown" => Some(Self::Markdown),
            "educational" => Some(Self::Educational),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Minimal => "minimal",
            Self::Detailed => "detailed",
            Self::Color => "color",
            Self::Markdown => "markdown",
            Self::Educational => "educational",
        }
    }
}

impl fmt::Display for TraceStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Renders a recorded event stream in a fixed style.
///
/// The only state is the current indentation depth: start events
/// render then descend, end events ascend and render nothing.
pub struct Formatter {
    style: TraceStyle,
    depth: usize,
}

impl Formatter {
    pub fn new(style: TraceStyle) -> Self {
        Self { style, depth: 0 }
    }

    /// Render a full event stream to text
    pub fn render(&mut self, events: &[TraceEvent]) -> String {
        self.depth = 0;
        let mut output = String::new();
        for event in events {
            if event.is_end() {
                self.depth = self.depth.saturating_sub(1);
                continue;
            }
            output.push_str(&self.render_event(event));
            if event.is_start() {
                self.depth += 1;
            }
        }
        output
    }

    /// Depth of each rendered (non-end) event, in stream order.
    /// Used to check structural equivalence across styles.
    pub fn depth_profile(events: &[TraceEvent]) -> Vec<usize> {
        let mut depth = 0usize;
        let mut profile = Vec::new();
        for event in events {
            if event.is_end() {
                depth = depth.saturating_sub(1);
                continue;
            }
            profile.push(depth);
            if event.is_start() {
                depth += 1;
            }
        }
        profile
    }

    fn render_event(&self, event: &TraceEvent) -> String {
        let indent = "  ".repeat(self.depth);
        let category = event.category();
        let message = event.message();

        match self.style {
            TraceStyle::Default => format!("{}[{}] {}\n", indent, category, message),

            TraceStyle::Minimal => format!("{}{}: {}\n", indent, category, message),

            TraceStyle::Detailed => {
                if matches!(event, TraceEvent::ProgramStart { .. }) {
                    let rule = "=".repeat(60);
                    format!("\n{}\nPROGRAM EXECUTION: {}\n{}\n", rule, message, rule)
                } else {
                    let rule = "─".repeat(40);
                    format!(
                        "\n{indent}{rule}\n{indent}{category}: {message}\n{indent}{rule}\n",
                        indent = indent,
                        rule = rule,
                        category = category,
                        message = message,
                    )
                }
            }

            TraceStyle::Color => {
                let tag = match event {
                    TraceEvent::ProgramStart { .. } => category.blue().bold(),
                    TraceEvent::TaskStart { .. } => category.blue().bold(),
                    TraceEvent::StepStart { .. } => category.yellow().bold(),
                    TraceEvent::SubtaskStart { .. } => category.green().bold(),
                    TraceEvent::VariableAssigned { .. } => category.red().bold(),
                    TraceEvent::Output { .. } => category.green().bold(),
                    _ => category.white().bold(),
                };
                format!("{}{}: {}\n", indent, tag, message)
            }

            TraceStyle::Markdown => {
                let prefix = match event {
                    TraceEvent::ProgramStart { .. } => "#",
                    TraceEvent::TaskStart { .. } => "##",
                    TraceEvent::SubtaskStart { .. } => "###",
                    TraceEvent::StepStart { .. } => "####",
                    TraceEvent::VariableAssigned { .. } => "*",
                    TraceEvent::Output { .. } => ">",
                    _ => "-",
                };
                format!("{}{} {}\n", indent, prefix, message)
            }

            TraceStyle::Educational => {
                let icon = match event {
                    TraceEvent::VariableAssigned { .. } => "📝",
                    TraceEvent::Output { .. } => "📤",
                    _ => "•",
                };
                format!("{}{} {}\n", indent, icon, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_events() -> Vec<TraceEvent> {
        vec![
            TraceEvent::ProgramStart {
                objective: "Calculate student grades".to_string(),
            },
            TraceEvent::TaskStart {
                name: "Process Grades".to_string(),
            },
            TraceEvent::StepStart {
                name: "Collect".to_string(),
            },
            TraceEvent::VariableAssigned {
                name: "scores".to_string(),
                value: "[85, 92, 78]".to_string(),
            },
            TraceEvent::StepEnd {
                name: "Collect".to_string(),
            },
            TraceEvent::StepStart {
                name: "Report".to_string(),
            },
            TraceEvent::SubtaskStart {
                name: "Calculate Average".to_string(),
            },
            TraceEvent::SubtaskEnd {
                name: "Calculate Average".to_string(),
            },
            TraceEvent::Output {
                text: "85.0".to_string(),
            },
            TraceEvent::StepEnd {
                name: "Report".to_string(),
            },
            TraceEvent::TaskEnd {
                name: "Process Grades".to_string(),
            },
        ]
    }

    #[test]
    fn test_default_style() {
        let rendered = Formatter::new(TraceStyle::Default).render(&sample_events());
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "[PROGRAM] Calculate student grades");
        assert_eq!(lines[1], "  [TASK] Executing Process Grades");
        assert_eq!(lines[2], "    [STEP] Executing Collect");
        assert_eq!(lines[3], "      [VARIABLE] Assigned [85, 92, 78] to scores");
        assert_eq!(lines[4], "    [STEP] Executing Report");
        assert_eq!(lines[5], "      [SUBTASK] Executing Calculate Average");
        assert_eq!(lines[6], "      [OUTPUT] 85.0");
    }

    #[test]
    fn test_minimal_style() {
        let rendered = Formatter::new(TraceStyle::Minimal).render(&sample_events());
        assert!(rendered.contains("PROGRAM: Calculate student grades"));
        assert!(rendered.contains("  TASK: Executing Process Grades"));
        assert!(rendered.contains("      VARIABLE: Assigned [85, 92, 78] to scores"));
    }

    #[test]
    fn test_detailed_style_has_separators() {
        let rendered = Formatter::new(TraceStyle::Detailed).render(&sample_events());
        assert!(rendered.contains(&"=".repeat(60)));
        assert!(rendered.contains("PROGRAM EXECUTION: Calculate student grades"));
        assert!(rendered.contains(&"─".repeat(40)));
        assert!(rendered.contains("OUTPUT: 85.0"));
    }

    #[test]
    fn test_markdown_style() {
        let rendered = Formatter::new(TraceStyle::Markdown).render(&sample_events());
        assert!(rendered.contains("# Calculate student grades"));
        assert!(rendered.contains("  ## Executing Process Grades"));
        assert!(rendered.contains("    #### Executing Collect"));
        assert!(rendered.contains("      ### Executing Calculate Average"));
        assert!(rendered.contains("      * Assigned [85, 92, 78] to scores"));
        assert!(rendered.contains("      > 85.0"));
    }

    #[test]
    fn test_educational_style() {
        let rendered = Formatter::new(TraceStyle::Educational).render(&sample_events());
        assert!(rendered.contains("📝 Assigned [85, 92, 78] to scores"));
        assert!(rendered.contains("📤 85.0"));
        assert!(rendered.contains("• Executing Process Grades"));
    }

    #[test]
    fn test_depth_mirrors_nesting() {
        let profile = Formatter::depth_profile(&sample_events());
        // Program(0), Task(1), Step(2), Variable(3), Step(2), Subtask(3), Output(3)
        assert_eq!(profile, vec![0, 1, 2, 3, 2, 3, 3]);
    }

    #[test]
    fn test_styles_are_structurally_equivalent() {
        let events = sample_events();
        let profile = Formatter::depth_profile(&events);

        // Single-line styles render one line per event, indented two
        // spaces per depth level, in identical order
        for style in [
            TraceStyle::Default,
            TraceStyle::Minimal,
            TraceStyle::Color,
            TraceStyle::Markdown,
            TraceStyle::Educational,
        ] {
            let rendered = Formatter::new(style).render(&events);
            let lines: Vec<&str> = rendered.lines().collect();
            assert_eq!(lines.len(), profile.len(), "style {}", style);
            for (line, depth) in lines.iter().zip(&profile) {
                let indent = line.len() - line.trim_start().len();
                assert_eq!(indent, depth * 2, "style {}: line {:?}", style, line);
            }
        }

        // The detailed style adds rule lines but keeps every message,
        // each appearing in stream order
        let rendered = Formatter::new(TraceStyle::Detailed).render(&events);
        let mut cursor = 0;
        for event in events.iter().filter(|e| !e.is_end()) {
            let position = rendered[cursor..]
                .find(&event.message())
                .unwrap_or_else(|| panic!("detailed style lost or reordered {:?}", event));
            cursor += position;
        }
    }

    #[test]
    fn test_style_from_name() {
        assert_eq!(TraceStyle::from_name("default"), Some(TraceStyle::Default));
        assert_eq!(TraceStyle::from_name("markdown"), Some(TraceStyle::Markdown));
        assert_eq!(TraceStyle::from_name("fancy"), None);
        for style in TraceStyle::ALL {
            assert_eq!(TraceStyle::from_name(style.name()), Some(style));
        }
    }

    #[test]
    fn test_formatter_resets_depth_between_renders() {
        let events = sample_events();
        let mut formatter = Formatter::new(TraceStyle::Default);
        let first = formatter.render(&events);
        let second = formatter.render(&events);
        assert_eq!(first, second);
    }
}
